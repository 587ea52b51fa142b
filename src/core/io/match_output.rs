//! Tab-separated match output.
//!
//! One line per verified match:
//!
//! ```text
//! alen  aseq  astart  strand  blen  bseq  bstart  score  editdist  identity
//! ```
//!
//! Sequence numbers are 0-based positions in their input file, `strand` is
//! `F` (forward) or `P` (reverse complement), `identity` is a percentage with
//! two decimals.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::core::alignment::types::VerifiedMatch;

pub const HEADER: &str =
    "# Fields: alen, aseq, astart, strand, blen, bseq, bstart, score, editdist, identity";

pub struct MatchWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> MatchWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", HEADER)
    }

    pub fn write_match(&mut self, m: &VerifiedMatch) -> io::Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}",
            m.a_len(),
            m.aseqnum,
            m.a_start,
            m.strand,
            m.b_len(),
            m.bseqnum,
            m.b_start,
            m.score(),
            m.distance,
            m.identity()
        )?;
        self.written += 1;
        Ok(())
    }

    /// Matches written so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Buffered writer for `path`, or stdout when absent.
pub fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}
