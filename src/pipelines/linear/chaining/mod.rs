//! Weighted chaining of candidate links.
//!
//! # Module Organization
//!
//! - `types` - Core data structures (`AlignmentLink`, `Chain`, `ChainStats`)
//! - `filter` - `WeightedChainFilter`, the O(n²) chaining DP
//!
//! # Algorithm Overview
//!
//! 1. Collect the candidate links of one sequence pair (`add`)
//! 2. Order them by axis-1 start (mirrored for the reverse strand)
//! 3. For each link, pick the predecessor maximizing the cumulative score,
//!    preferring the smaller cumulative gap on ties
//! 4. Backtrack from the best-scoring link

mod filter;
mod types;

pub use filter::WeightedChainFilter;
pub use types::{AlignmentLink, Chain, ChainStats};
