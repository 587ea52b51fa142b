//! Core data types for seeding.
//!
//! Contains `KmerPos` and `SeedPair`.

/// A spaced-seed code with the position of its window.
///
/// Ordering is `(code, seqnum, endpos)`, the order k-mer lists are merged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KmerPos {
    /// Seed code of the window (care positions only)
    pub code: u64,
    /// Sequence number within its set
    pub seqnum: u32,
    /// Last position of the window, relative to the sequence start
    pub endpos: u32,
}

/// Two windows with equal seed codes.
///
/// Ordering is `(aseqnum, bseqnum, bpos, apos)`: seed pairs of one sequence
/// pair are contiguous and ascending in `bpos`, as the band table requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeedPair {
    pub aseqnum: u32,
    pub bseqnum: u32,
    /// Window end in sequence B (strand coordinates)
    pub bpos: u32,
    /// Window end in sequence A
    pub apos: u32,
}

impl SeedPair {
    #[inline]
    pub fn new(aseqnum: u32, apos: u32, bseqnum: u32, bpos: u32) -> Self {
        Self {
            aseqnum,
            bseqnum,
            bpos,
            apos,
        }
    }

    /// Same sequence pair as `other`.
    #[inline]
    pub fn same_segment(&self, other: &SeedPair) -> bool {
        self.aseqnum == other.aseqnum && self.bseqnum == other.bseqnum
    }
}
