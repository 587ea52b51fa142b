//! Match records shared by the verification stage and the output layer.

use std::fmt;

/// Strand of sequence B a match was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    /// Reverse complement ("palindromic" in match output)
    Reverse,
}

impl Strand {
    #[inline]
    pub fn is_forward(self) -> bool {
        self == Strand::Forward
    }

    /// Single-letter code used in match output.
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => 'F',
            Strand::Reverse => 'P',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A candidate match confirmed by the bit-parallel distance engine.
///
/// Both ranges are half-open and given in forward coordinates of their
/// sequences, also for reverse-strand matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedMatch {
    pub aseqnum: u32,
    pub a_start: u32,
    pub a_end: u32,
    pub bseqnum: u32,
    pub b_start: u32,
    pub b_end: u32,
    pub strand: Strand,
    /// Edit distance over the verified ranges
    pub distance: u32,
}

impl VerifiedMatch {
    #[inline]
    pub fn a_len(&self) -> u32 {
        self.a_end - self.a_start
    }

    #[inline]
    pub fn b_len(&self) -> u32 {
        self.b_end - self.b_start
    }

    /// Sum of both range lengths.
    #[inline]
    pub fn aligned_len(&self) -> u64 {
        self.a_len() as u64 + self.b_len() as u64
    }

    /// Unit-cost alignment score, `aligned_len − 2 × distance`.
    #[inline]
    pub fn score(&self) -> i64 {
        self.aligned_len() as i64 - 2 * self.distance as i64
    }

    /// Percent identity, `100 × score / aligned_len`.
    pub fn identity(&self) -> f64 {
        let aligned = self.aligned_len();
        if aligned == 0 {
            return 0.0;
        }
        100.0 * self.score() as f64 / aligned as f64
    }

    /// True if `other` lies inside this match on both sequences.
    pub fn contains(&self, other: &VerifiedMatch) -> bool {
        self.aseqnum == other.aseqnum
            && self.bseqnum == other.bseqnum
            && self.strand == other.strand
            && self.a_start <= other.a_start
            && other.a_end <= self.a_end
            && self.b_start <= other.b_start
            && other.b_end <= self.b_end
    }

    /// True if the position pair `(apos, bpos)` lies inside both ranges.
    #[inline]
    pub fn covers(&self, apos: u32, bpos: u32) -> bool {
        (self.a_start..self.a_end).contains(&apos) && (self.b_start..self.b_end).contains(&bpos)
    }
}
