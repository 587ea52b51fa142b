//! Bit-parallel edit distance (Myers, 1999).
//!
//! The pattern (at most 64 symbols) is encoded as one bitmask per alphabet
//! symbol. Each text symbol then costs a constant number of word operations
//! to advance the last column of the DP matrix, represented by the vertical
//! positive/negative delta vectors `Pv` and `Mv` and the running distance of
//! the full pattern against the text consumed so far.
//!
//! The horizontal delta is seeded with `| 1` on every step, so the first DP
//! row is `D[0][j] = j`: distances are global on the pattern and anchored on
//! the first text symbol fed in. This is the form needed to trim a candidate
//! match from one end.
//!
//! Wildcards never set a bit in the equals vector and read as `Eq = 0` in the
//! text, so they mismatch everything, including other wildcards. A separator
//! in the text resets the state.

use crate::core::compute::encoding::{SEPARATOR, WILDCARD};
use crate::error::{Result, SeedError};

/// Longest pattern the engine accepts (machine word width).
pub const MAX_PATTERN_LEN: usize = u64::BITS as usize;

#[inline(always)]
fn ones(len: usize) -> u64 {
    if len >= MAX_PATTERN_LEN {
        u64::MAX
    } else {
        (1u64 << len) - 1
    }
}

/// Per-symbol match masks of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualsVector {
    peq: Vec<u64>,
    len: usize,
}

impl EqualsVector {
    /// Bit `i` of `peq[c]` is set iff `pattern[i] == c` (or
    /// `pattern[len-1-i] == c` when `reverse`). Symbols outside the alphabet
    /// never set a bit.
    pub fn build(pattern: &[u8], alphabet_size: usize, reverse: bool) -> Result<Self> {
        if pattern.is_empty() {
            return Err(SeedError::EmptyPattern);
        }
        if pattern.len() > MAX_PATTERN_LEN {
            return Err(SeedError::PatternTooLong {
                len: pattern.len(),
                max: MAX_PATTERN_LEN,
            });
        }

        let len = pattern.len();
        let mut peq = vec![0u64; alphabet_size];
        for i in 0..len {
            let c = if reverse {
                pattern[len - 1 - i]
            } else {
                pattern[i]
            } as usize;
            if c < alphabet_size {
                peq[c] |= 1u64 << i;
            }
        }
        Ok(Self { peq, len })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    fn mask(&self, symbol: u8) -> u64 {
        self.peq.get(symbol as usize).copied().unwrap_or(0)
    }
}

/// Running column state of one distance computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceState {
    pub pv: u64,
    pub mv: u64,
    pub score: usize,
    len: usize,
}

impl DistanceState {
    /// Initial state: the first DP column (`D[i][0] = i`).
    ///
    /// `pattern_len` must lie in `1..=MAX_PATTERN_LEN`.
    pub fn new(pattern_len: usize) -> Self {
        debug_assert!(
            pattern_len > 0 && pattern_len <= MAX_PATTERN_LEN,
            "pattern length {} outside 1..={}",
            pattern_len,
            MAX_PATTERN_LEN
        );
        Self {
            pv: ones(pattern_len),
            mv: 0,
            score: pattern_len,
            len: pattern_len,
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new(self.len);
    }

    /// Consume one text symbol.
    #[inline]
    pub fn step(&mut self, eqv: &EqualsVector, symbol: u8) {
        if symbol == SEPARATOR {
            self.reset();
            return;
        }
        let high = 1u64 << (self.len - 1);
        let eq = eqv.mask(symbol);
        let xv = eq | self.mv;
        let xh = ((eq & self.pv).wrapping_add(self.pv) ^ self.pv) | eq;
        let mut ph = self.mv | !(xh | self.pv);
        let mh = self.pv & xh;
        if ph & high != 0 {
            self.score += 1;
        } else if mh & high != 0 {
            self.score -= 1;
        }
        ph = (ph << 1) | 1;
        self.pv = (mh << 1) | !(xv | ph);
        self.mv = ph & xv;
    }
}

/// Outcome of a trim scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimResult {
    /// The distance bound was met after consuming `length` text symbols.
    Reached { length: usize, distance: usize },
    /// The text ended first; `distance` is the final distance.
    Exhausted { length: usize, distance: usize },
    /// A wildcard was met while wildcards were disallowed.
    Undefined,
}

impl TrimResult {
    /// `(length, distance)` when the bound was reached.
    pub fn reached(&self) -> Option<(usize, usize)> {
        match *self {
            TrimResult::Reached { length, distance } => Some((length, distance)),
            _ => None,
        }
    }
}

/// A pattern prepared for forward and backward scans.
#[derive(Debug, Clone)]
pub struct BitParallelMatcher {
    forward: EqualsVector,
    backward: EqualsVector,
}

impl BitParallelMatcher {
    pub fn new(pattern: &[u8], alphabet_size: usize) -> Result<Self> {
        Ok(Self {
            forward: EqualsVector::build(pattern, alphabet_size, false)?,
            backward: EqualsVector::build(pattern, alphabet_size, true)?,
        })
    }

    #[inline]
    pub fn pattern_len(&self) -> usize {
        self.forward.len()
    }

    /// Edit distance between the whole pattern and the whole `text`.
    pub fn distance_to(&self, text: &[u8]) -> usize {
        let mut state = DistanceState::new(self.forward.len());
        for &c in text {
            state.step(&self.forward, c);
        }
        state.score
    }

    /// Feed `text[start..]` left to right until the distance of the pattern
    /// against the consumed prefix drops to `max_distance`.
    pub fn forward_trim(
        &self,
        text: &[u8],
        start: usize,
        max_distance: usize,
        no_wildcards: bool,
    ) -> TrimResult {
        let suffix = text.get(start..).unwrap_or(&[]);
        scan(&self.forward, suffix.iter().copied(), max_distance, no_wildcards)
    }

    /// Feed `text[..end]` right to left with the reversed pattern until the
    /// distance drops to `max_distance`.
    pub fn backward_trim(
        &self,
        text: &[u8],
        end: usize,
        max_distance: usize,
        no_wildcards: bool,
    ) -> TrimResult {
        let prefix = &text[..end.min(text.len())];
        scan(
            &self.backward,
            prefix.iter().rev().copied(),
            max_distance,
            no_wildcards,
        )
    }
}

fn scan(
    eqv: &EqualsVector,
    symbols: impl Iterator<Item = u8>,
    max_distance: usize,
    no_wildcards: bool,
) -> TrimResult {
    let mut state = DistanceState::new(eqv.len());
    if state.score <= max_distance {
        return TrimResult::Reached {
            length: 0,
            distance: state.score,
        };
    }
    let mut length = 0;
    for c in symbols {
        if no_wildcards && c == WILDCARD {
            return TrimResult::Undefined;
        }
        state.step(eqv, c);
        length += 1;
        if state.score <= max_distance {
            return TrimResult::Reached {
                length,
                distance: state.score,
            };
        }
    }
    TrimResult::Exhausted {
        length,
        distance: state.score,
    }
}

/// Edit distance between `u` and `v`; the shorter one (at most 64 symbols)
/// becomes the pattern.
pub fn whole_string_distance(u: &[u8], v: &[u8], alphabet_size: usize) -> Result<usize> {
    let (pattern, text) = if u.len() <= v.len() { (u, v) } else { (v, u) };
    if pattern.is_empty() {
        return Ok(text.len());
    }
    Ok(BitParallelMatcher::new(pattern, alphabet_size)?.distance_to(text))
}
