//! Symbol-level compute primitives shared by the seeding and verification stages.

pub mod encoding;

pub use encoding::{ALPHABET_SIZE, SEPARATOR, WILDCARD};
