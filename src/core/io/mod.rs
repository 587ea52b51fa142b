//! Input and output: FASTA loading and match records.

pub mod fasta_reader;
pub mod match_output;
pub mod sequence_set;

pub use match_output::MatchWriter;
pub use sequence_set::SequenceSet;
