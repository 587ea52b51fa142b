// src/defaults.rs

// Seeding Constants
pub const MIN_SEED_LENGTH: usize = 2;
pub const MAX_SEED_LENGTH: usize = 32;
pub const LOG_DIAGBAND_WIDTH: u32 = 6;
pub const MAX_LOG_DIAGBAND_WIDTH: u32 = 10;
pub const MIN_COVERAGE_FACTOR: f64 = 2.5;
pub const MAX_FREQUENCY: usize = usize::MAX;

// Verification Constants
pub const MIN_IDENTITY: u32 = 80;
pub const MIN_IDENTITY_LOWER: u32 = 70;
pub const MIN_IDENTITY_UPPER: u32 = 99;

// Other Constants
pub const VERBOSITY: u8 = 3;
