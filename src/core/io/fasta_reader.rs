// FASTA reader module using bio::io::fasta
//
// Compressed input is recognized by its magic bytes rather than its name:
// - BGZF (gzip with a 'BC' extra subfield) is decompressed block-parallel
// - plain gzip falls back to a single-threaded flate2 decoder
// - anything else is read as uncompressed text

use bio::io::fasta;
use flate2::read::GzDecoder;
use noodles_bgzf as bgzf;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 4 * 1024 * 1024; // 4MB buffer

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Bgzf,
}

/// Classify a file by its first bytes.
fn detect_compression(path: &Path) -> io::Result<Compression> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 18]; // BGZF header is at least 18 bytes
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled < 2 || header[0] != 0x1f || header[1] != 0x8b {
        return Ok(Compression::None);
    }
    // FEXTRA flag plus the 'BC' subfield identify BGZF
    if filled >= 14 && header[3] & 0x04 != 0 && header[12] == b'B' && header[13] == b'C' {
        return Ok(Compression::Bgzf);
    }
    Ok(Compression::Gzip)
}

/// FASTA reader with automatic gzip/BGZF detection
pub struct FastaReader {
    records: fasta::Records<BufReader<Box<dyn Read>>>,
}

impl FastaReader {
    /// Open a FASTA file, plain or compressed.
    pub fn new(path: &Path) -> io::Result<Self> {
        let compression = detect_compression(path)?;
        let file = File::open(path)?;
        let reader: Box<dyn Read> = match compression {
            Compression::Bgzf => {
                log::debug!("{}: BGZF input, using parallel decompression", path.display());
                Box::new(bgzf::MultithreadedReader::new(file))
            }
            Compression::Gzip => {
                log::debug!("{}: gzip input, using single-threaded decompression", path.display());
                Box::new(GzDecoder::new(file))
            }
            Compression::None => Box::new(file),
        };

        let fasta_reader = fasta::Reader::with_capacity(BUFFER_SIZE, reader);
        Ok(Self {
            records: fasta_reader.records(),
        })
    }

    /// Read the next FASTA record
    ///
    /// Returns `Ok(Some(record))` if a record is found, `Ok(None)` at EOF,
    /// and `Err(e)` on a parse error.
    pub fn read_record(&mut self) -> io::Result<Option<fasta::Record>> {
        match self.records.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            None => Ok(None),
        }
    }
}
