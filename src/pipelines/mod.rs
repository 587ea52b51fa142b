//! Comparison pipelines.
//!
//! - `linear`: seed-extend comparison of linear sequence sets

pub mod linear;
