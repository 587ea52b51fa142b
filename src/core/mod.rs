//! Core reusable components of the seed-extend engine.
//!
//! These components do not depend on how candidate matches are found and can
//! be reused by other pipelines.

pub mod alignment;
pub mod compute;
pub mod io;
pub mod seed;
