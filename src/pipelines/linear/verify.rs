//! Verification of chained links with the bit-parallel distance engine.
//!
//! A link is extended greedily in chunks of at most 64 symbols of sequence A.
//! Each chunk is aligned against the best-scoring prefix of the remaining B
//! text; a chunk passes when that distance stays within
//! `chunk_len × error_percentage / 100`. A failing chunk is halved; the
//! extension stops when a single symbol fails. After a passing chunk the
//! next one starts again at full width.
//!
//! The forward pass from the link start fixes the end of the match. The
//! backward pass from that end (reversed equals vectors over the reversed
//! text) fixes the start and the edit distance reported for the match.

use crate::core::alignment::myers::{DistanceState, EqualsVector, MAX_PATTERN_LEN};
use crate::core::compute::encoding::is_special;
use crate::core::compute::ALPHABET_SIZE;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyParams {
    /// Differences allowed per 100 symbols of a chunk
    pub error_percentage: u32,
    /// Minimum percent identity of a reported match
    pub min_identity: f64,
    /// Minimum of `max(a_len, b_len)` of a reported match
    pub min_length: u32,
}

/// A verified extension in the coordinates of the scanned strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension {
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
    pub distance: usize,
}

impl Extension {
    pub fn identity(&self) -> f64 {
        let aligned = (self.a_end - self.a_start) + (self.b_end - self.b_start);
        if aligned == 0 {
            return 0.0;
        }
        100.0 * (aligned as f64 - 2.0 * self.distance as f64) / aligned as f64
    }

    #[inline]
    pub fn max_len(&self) -> usize {
        (self.a_end - self.a_start).max(self.b_end - self.b_start)
    }
}

#[inline(always)]
fn chunk_budget(chunk_len: usize, error_percentage: u32) -> usize {
    chunk_len * error_percentage as usize / 100
}

/// `(prefix_len, distance)` of the text prefix closest to the pattern of
/// `eqv`; ties go to the prefix length nearest the pattern length. `None`
/// if no prefix is within `budget`. Sentinels end the text.
fn best_prefix(
    eqv: &EqualsVector,
    text: impl Iterator<Item = u8>,
    budget: usize,
) -> Option<(usize, usize)> {
    let len = eqv.len();
    let mut state = DistanceState::new(len);
    let mut best: Option<(usize, usize)> = None;
    for (i, c) in text.take(len + budget).enumerate() {
        if is_special(c) {
            break;
        }
        state.step(eqv, c);
        let prefix = i + 1;
        if state.score > budget {
            continue;
        }
        let better = match best {
            None => true,
            Some((bl, bd)) => {
                state.score < bd
                    || (state.score == bd && prefix.abs_diff(len) < bl.abs_diff(len))
            }
        };
        if better {
            best = Some((prefix, state.score));
        }
    }
    best
}

/// Extend to the right from `(apos, bpos)`; returns `(a_end, b_end, distance)`.
pub fn extend_right(
    a: &[u8],
    b: &[u8],
    mut apos: usize,
    mut bpos: usize,
    error_percentage: u32,
) -> Result<(usize, usize, usize)> {
    let mut chunk = MAX_PATTERN_LEN;
    let mut distance = 0;
    while apos < a.len() && bpos < b.len() {
        let len = chunk.min(a.len() - apos);
        let eqv = EqualsVector::build(&a[apos..apos + len], ALPHABET_SIZE, false)?;
        let text = b[bpos..].iter().copied();
        match best_prefix(&eqv, text, chunk_budget(len, error_percentage)) {
            Some((blen, d)) => {
                apos += len;
                bpos += blen;
                distance += d;
                chunk = MAX_PATTERN_LEN;
            }
            None if len > 1 => chunk = len / 2,
            None => break,
        }
    }
    Ok((apos, bpos, distance))
}

/// Extend to the left from `(apos, bpos)` (exclusive ends); returns
/// `(a_start, b_start, distance)`.
pub fn extend_left(
    a: &[u8],
    b: &[u8],
    mut apos: usize,
    mut bpos: usize,
    error_percentage: u32,
) -> Result<(usize, usize, usize)> {
    let mut chunk = MAX_PATTERN_LEN;
    let mut distance = 0;
    while apos > 0 && bpos > 0 {
        let len = chunk.min(apos);
        let eqv = EqualsVector::build(&a[apos - len..apos], ALPHABET_SIZE, true)?;
        let text = b[..bpos].iter().rev().copied();
        match best_prefix(&eqv, text, chunk_budget(len, error_percentage)) {
            Some((blen, d)) => {
                apos -= len;
                bpos -= blen;
                distance += d;
                chunk = MAX_PATTERN_LEN;
            }
            None if len > 1 => chunk = len / 2,
            None => break,
        }
    }
    Ok((apos, bpos, distance))
}

/// Verify a link starting at `(a_start, b_start)`.
///
/// Returns the extension if it satisfies the identity and length thresholds.
pub fn verify_link(
    a: &[u8],
    b: &[u8],
    a_start: usize,
    b_start: usize,
    params: &VerifyParams,
) -> Result<Option<Extension>> {
    let (a_end, b_end, _) = extend_right(a, b, a_start, b_start, params.error_percentage)?;
    if a_end == a_start {
        return Ok(None);
    }
    let (a_start, b_start, distance) = extend_left(a, b, a_end, b_end, params.error_percentage)?;
    let ext = Extension {
        a_start,
        a_end,
        b_start,
        b_end,
        distance,
    };
    if ext.max_len() < params.min_length as usize || ext.identity() < params.min_identity {
        log::trace!(
            "verify_link: rejected a[{}..{}) b[{}..{}) d={} identity {:.2}",
            ext.a_start,
            ext.a_end,
            ext.b_start,
            ext.b_end,
            ext.distance,
            ext.identity()
        );
        return Ok(None);
    }
    Ok(Some(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_core(len: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(0..4u8)).collect()
    }

    /// `a = A^20 core A^20`, `b = C^50 core' C^50`.
    fn planted(core_a: &[u8], core_b: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut a = vec![0u8; 20];
        a.extend_from_slice(core_a);
        a.extend(std::iter::repeat(0u8).take(20));
        let mut b = vec![1u8; 50];
        b.extend_from_slice(core_b);
        b.extend(std::iter::repeat(1u8).take(50));
        (a, b)
    }

    fn params(error_percentage: u32, min_identity: f64, min_length: u32) -> VerifyParams {
        VerifyParams {
            error_percentage,
            min_identity,
            min_length,
        }
    }

    #[test]
    fn test_best_prefix_exact() {
        let eqv = EqualsVector::build(&[0, 1, 2, 3, 0, 1, 2, 3], ALPHABET_SIZE, false).unwrap();
        let text = [0u8, 1, 2, 3, 0, 1, 2, 3, 0, 0];
        assert_eq!(best_prefix(&eqv, text.iter().copied(), 1), Some((8, 0)));
    }

    #[test]
    fn test_best_prefix_deletion_in_text() {
        let eqv = EqualsVector::build(&[0, 1, 2, 3, 3, 2, 1, 0], ALPHABET_SIZE, false).unwrap();
        // pattern symbol 4 missing in the text
        let text = [0u8, 1, 2, 3, 2, 1, 0, 2, 2];
        assert_eq!(best_prefix(&eqv, text.iter().copied(), 1), Some((7, 1)));
        assert_eq!(best_prefix(&eqv, text.iter().copied(), 0), None);
    }

    #[test]
    fn test_best_prefix_stops_at_wildcard() {
        let eqv = EqualsVector::build(&[0, 1, 2, 3], ALPHABET_SIZE, false).unwrap();
        let text = [0u8, 1, crate::core::compute::WILDCARD, 3];
        assert_eq!(best_prefix(&eqv, text.iter().copied(), 1), None);
    }

    #[test]
    fn test_exact_core_is_recovered() {
        let core = random_core(128, 7);
        let (a, b) = planted(&core, &core);
        let ext = verify_link(&a, &b, 20, 50, &params(0, 99.0, 50))
            .unwrap()
            .unwrap();
        assert_eq!(
            ext,
            Extension {
                a_start: 20,
                a_end: 148,
                b_start: 50,
                b_end: 178,
                distance: 0,
            }
        );
        assert_eq!(ext.identity(), 100.0);
    }

    #[test]
    fn test_link_inside_core_extends_left() {
        let core = random_core(128, 11);
        let (a, b) = planted(&core, &core);
        // link starts a chunk into the core: the backward pass recovers the start
        let ext = verify_link(&a, &b, 84, 114, &params(0, 99.0, 50))
            .unwrap()
            .unwrap();
        assert_eq!((ext.a_start, ext.a_end), (20, 148));
        assert_eq!((ext.b_start, ext.b_end), (50, 178));
    }

    #[test]
    fn test_substitutions_counted() {
        let core = random_core(128, 3);
        let mut mutated = core.clone();
        mutated[30] = (mutated[30] + 1) % 4;
        mutated[90] = (mutated[90] + 2) % 4;
        let (a, b) = planted(&core, &mutated);
        let ext = verify_link(&a, &b, 20, 50, &params(10, 90.0, 50))
            .unwrap()
            .unwrap();
        assert_eq!((ext.a_start, ext.a_end), (20, 148));
        assert_eq!(ext.distance, 2);
        assert!((ext.identity() - 100.0 * 252.0 / 256.0).abs() < 1e-9);
    }

    #[test]
    fn test_chunk_width_restored_after_failure() {
        let a = random_core(256, 19);
        let mut b = a.clone();
        // 18 substitutions in the first 64 symbols fail a full chunk; the
        // dense second half only fits the budget of a full-width chunk
        for pos in [3, 8, 13, 18, 23, 28] {
            b[pos] = (b[pos] + 2) % 4;
        }
        for pos in [34, 36, 39, 41, 44, 46, 49, 51, 54, 56, 59, 61] {
            b[pos] = (b[pos] + 2) % 4;
        }
        let (a_end, b_end, distance) = extend_right(&a, &b, 0, 0, 20).unwrap();
        assert_eq!((a_end, b_end), (256, 256));
        assert!(distance <= 18, "distance {}", distance);
    }

    #[test]
    fn test_thresholds_reject() {
        let core = random_core(128, 3);
        let mut mutated = core.clone();
        mutated[30] = (mutated[30] + 1) % 4;
        mutated[90] = (mutated[90] + 2) % 4;
        let (a, b) = planted(&core, &mutated);
        assert!(verify_link(&a, &b, 20, 50, &params(10, 99.5, 50))
            .unwrap()
            .is_none());
        assert!(verify_link(&a, &b, 20, 50, &params(10, 90.0, 200))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unrelated_sequences_do_not_verify() {
        let a = vec![0u8; 100];
        let b = vec![1u8; 100];
        assert!(verify_link(&a, &b, 0, 0, &params(20, 80.0, 10))
            .unwrap()
            .is_none());
    }
}
