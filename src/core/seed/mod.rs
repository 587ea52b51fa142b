//! Seed codec: spaced seed patterns and k-mer code reduction.

pub mod pattern;

pub use pattern::{pattern_span, pattern_weight, weight_range, SeedPattern, MAX_SPAN};
