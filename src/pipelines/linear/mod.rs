//! Linear seed-extend pipeline.
//!
//! This pipeline finds local similarities between two sets of nucleotide
//! sequences: spaced seeds, diagonal band filtering, weighted chaining and
//! bit-parallel verification.
//!
//! # Module Organization
//!
//! - `seeding/` - K-mer lists, seed pairs, memory-limit frequency cap
//! - `diagband` - Diagonal band coverage table
//! - `chaining/` - Weighted chaining filter over candidate links
//! - `verify` - Chunked extension with the bit-parallel distance engine
//! - `workspace` - Per-thread reusable buffers
//! - `pipeline` - Driver tying the stages together
//! - `debug_output` - Text dump of k-mer lists and seed pairs
//!
//! # Entry Point
//!
//! The main entry point is `pipeline::run_seed_extend()`.

// === Core algorithm modules ===
pub mod chaining; // Weighted chaining filter
pub mod diagband; // Diagonal band coverage table
pub mod seeding; // K-mer lists and seed pairs
pub mod verify; // Link verification

// === Driver ===
pub mod debug_output; // K-mer and seed-pair dumps
pub mod pipeline; // Seed-extend driver
pub mod workspace; // Thread-local buffers

pub use debug_output::DebugWriter;
pub use pipeline::{run_seed_extend, DebugLists, KmerListOrigin, SeedExtendRun, SeedExtendStats};
