pub mod core; // Reusable components: seed codec, distance engine, I/O
pub mod defaults;
pub mod error;
pub mod pipelines; // Seed-extend pipeline
pub mod seed_opt;

pub use error::{Result, SeedError};
