//! Encoded sequence collections.

use std::path::Path;

use crate::core::compute::encoding::{encode_sequence, reverse_complement};
use crate::core::io::fasta_reader::FastaReader;
use crate::error::{Result, SeedError};

/// Named, 2-bit encoded sequences loaded from one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceSet {
    names: Vec<String>,
    seqs: Vec<Vec<u8>>,
}

impl SequenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every record of a FASTA file.
    pub fn from_fasta(path: &Path) -> Result<Self> {
        let fasta_err = |source| SeedError::Fasta {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = FastaReader::new(path).map_err(fasta_err)?;
        let mut set = Self::new();
        while let Some(record) = reader.read_record().map_err(fasta_err)? {
            if record.seq().len() > u32::MAX as usize {
                return Err(SeedError::InvalidOption(format!(
                    "sequence {} in {} exceeds {} symbols",
                    record.id(),
                    path.display(),
                    u32::MAX
                )));
            }
            set.push_ascii(record.id(), record.seq());
        }

        if set.is_empty() {
            return Err(SeedError::EmptyInput(path.to_path_buf()));
        }
        log::info!(
            "Loaded {} sequences ({} symbols) from {}",
            set.len(),
            set.total_len(),
            path.display()
        );
        Ok(set)
    }

    /// Append an already encoded sequence.
    pub fn push(&mut self, name: impl Into<String>, encoded: Vec<u8>) {
        self.names.push(name.into());
        self.seqs.push(encoded);
    }

    /// Encode and append an ASCII sequence.
    pub fn push_ascii(&mut self, name: impl Into<String>, seq: &[u8]) {
        self.push(name, encode_sequence(seq));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    #[inline]
    pub fn name(&self, seqnum: usize) -> &str {
        &self.names[seqnum]
    }

    #[inline]
    pub fn seq(&self, seqnum: usize) -> &[u8] {
        &self.seqs[seqnum]
    }

    #[inline]
    pub fn seqs(&self) -> &[Vec<u8>] {
        &self.seqs
    }

    pub fn max_len(&self) -> usize {
        self.seqs.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn total_len(&self) -> usize {
        self.seqs.iter().map(Vec::len).sum()
    }

    /// The same set with every sequence reverse complemented.
    pub fn reverse_complemented(&self) -> Self {
        Self {
            names: self.names.clone(),
            seqs: self.seqs.iter().map(|s| reverse_complement(s)).collect(),
        }
    }
}
