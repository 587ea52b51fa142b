//! Seeding module for spaced-seed pairs.
//!
//! Every wildcard-free window of both sequence sets is reduced to its spaced
//! seed code. The two sorted k-mer lists are merged into seed pairs: windows
//! of A and B with equal codes.
//!
//! # Module Organization
//!
//! - `types` - Core data structures (`KmerPos`, `SeedPair`)
//! - `collection` - K-mer list collection and seed-pair merging
//! - `histogram` - Maximum k-mer frequency derived from a memory limit
//!
//! # Algorithm Overview
//!
//! 1. **K-mer collection**: a rolling 2-bit window code per sequence, reduced
//!    to its care positions and sorted by `(code, seqnum, endpos)`
//!
//! 2. **Frequency limit** (optional): a histogram of seed pairs per k-mer
//!    frequency caps the frequency so all seed pairs fit into the memory limit
//!
//! 3. **Merge**: equal-code runs are expanded into seed pairs, sorted so that
//!    each sequence pair forms one contiguous segment ascending in `bpos`

mod collection;
mod histogram;
mod types;

pub use types::{KmerPos, SeedPair};

pub use collection::{collect_kmers, merge_seed_pairs, segments, verify_seed_pairs};

pub use histogram::{
    frequency_histogram, maxfreq_for_memlimit, FrequencyLimit, HistogramParams,
    MAX_HISTOGRAM_FREQUENCY,
};
