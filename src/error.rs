//! Error type shared by the library.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SeedError>;

#[derive(thiserror::Error, Debug)]
pub enum SeedError {
    #[error("seed span {span} is not supported (valid spans are 1..={max})")]
    UnsupportedSpan { span: usize, max: usize },

    #[error("seed weight {weight} out of range [{min}, {max}] for span {span}")]
    WeightOutOfRange {
        span: usize,
        weight: usize,
        min: usize,
        max: usize,
    },

    #[error("invalid seed pattern: {0}")]
    InvalidPattern(String),

    #[error("pattern of length {len} exceeds the machine word width ({max} symbols)")]
    PatternTooLong { len: usize, max: usize },

    #[error("empty pattern")]
    EmptyPattern,

    #[error("diagonal band log-width {0} out of range [0, 10]")]
    InvalidBandWidth(u32),

    #[error(
        "option --memlimit is too strict: need at least {required_mb}MB"
    )]
    MemLimitTooStrict { required_mb: u64 },

    #[error("seed pair ({aseq}, {apos}) / ({bseq}, {bpos}) does not match on its care positions")]
    SeedMismatch {
        aseq: u32,
        apos: u32,
        bseq: u32,
        bpos: u32,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("sequence file {} contains no sequences", .0.display())]
    EmptyInput(PathBuf),

    #[error("error reading {}: {source}", path.display())]
    Fasta {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
