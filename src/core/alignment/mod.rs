//! Reusable verification components.
//!
//! - `myers` - Bit-parallel bounded edit distance (forward/backward trimming)
//! - `types` - Match records (`VerifiedMatch`, `Strand`)

pub mod myers;
pub mod types;

pub use myers::{whole_string_distance, BitParallelMatcher, DistanceState, EqualsVector, TrimResult};
pub use types::{Strand, VerifiedMatch};
