//! Text dump of the k-mer lists and seed pairs of a run.
//!
//! ```text
//! # Kmer A (code,endpos,seqnum)
//! # SeedPair F (aseqnum,bseqnum,apos,bpos)
//! ```
//!
//! Codes are hexadecimal. K-mer lists are labelled `A`, `BF` or `BP` (B on
//! the forward strand or reverse complemented), seed pairs by strand.

use std::io::{self, Write};

use super::pipeline::{DebugLists, KmerListOrigin};
use super::seeding::{KmerPos, SeedPair};
use crate::core::alignment::types::Strand;

pub struct DebugWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> DebugWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write_kmer(&mut self, origin: KmerListOrigin, kmer: &KmerPos) -> io::Result<()> {
        writeln!(
            self.out,
            "# Kmer {} ({:x},{},{})",
            origin, kmer.code, kmer.endpos, kmer.seqnum
        )?;
        self.written += 1;
        Ok(())
    }

    pub fn write_seed_pair(&mut self, strand: Strand, sp: &SeedPair) -> io::Result<()> {
        writeln!(
            self.out,
            "# SeedPair {} ({},{},{},{})",
            strand, sp.aseqnum, sp.bseqnum, sp.apos, sp.bpos
        )?;
        self.written += 1;
        Ok(())
    }

    /// All k-mer lists, then all seed-pair lists.
    pub fn write_lists(&mut self, lists: &DebugLists) -> io::Result<()> {
        for (origin, kmers) in &lists.kmers {
            for kmer in kmers {
                self.write_kmer(*origin, kmer)?;
            }
        }
        for (strand, pairs) in &lists.seed_pairs {
            for sp in pairs {
                self.write_seed_pair(*strand, sp)?;
            }
        }
        Ok(())
    }

    /// Lines written so far.
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
