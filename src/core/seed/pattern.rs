//! Spaced seed patterns.
//!
//! A pattern selects `weight` care positions out of a window of `span`
//! symbols. Bit `i` of the pattern addresses the symbol whose 2-bit code sits
//! at bits `[2i, 2i+2)` of a k-mer code built by shifting left, so bit 0 is the
//! last symbol of the window and is always a care position (the anchor).
//!
//! The pattern is stored as alternating care / don't-care blocks, always
//! starting and ending with a care block. Each care block contributes one
//! `(mask, shift)` step to the extraction table, so reducing a k-mer code to
//! its `2 × weight` bit seed code costs one AND, one shift and one OR per care
//! block.
//!
//! ```text
//! pattern 1101011 (span 7, weight 5)
//!   blocks: [care 0..2) [dc 2..3) [care 3..4) [dc 4..5) [care 5..7)
//!   k-mer   s6 s5 s4 s3 s2 s1 s0
//!   seed    s6 s5    s3    s1 s0
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SeedError};

/// Largest span a 2-bit-per-symbol window can have in a 64-bit code.
pub const MAX_SPAN: usize = 32;

/// A pattern with span `s` has at most `ceil(s/2)` care blocks.
const MAX_CARE_BLOCKS: usize = MAX_SPAN.div_ceil(2);

/// Smallest supported weight for a span.
#[inline]
pub const fn min_weight(span: usize) -> usize {
    let floor = if span < 2 { span } else { 2 };
    let half = span.div_ceil(2);
    if floor > half {
        floor
    } else {
        half
    }
}

/// Pre-tuned pattern for `(span, weight)`.
///
/// The `d = span − weight` don't-care positions are spread evenly over the
/// interior of the window, so the first and last position are always care
/// positions.
const fn tuned_pattern(span: usize, weight: usize) -> u64 {
    let mut bits = (1u64 << span) - 1;
    let d = span - weight;
    let mut j = 0;
    while j < d {
        let pos = ((j + 1) * (span - 1)) / (d + 1);
        bits &= !(1u64 << pos);
        j += 1;
    }
    bits
}

const fn build_pattern_table() -> [[u64; MAX_SPAN + 1]; MAX_SPAN + 1] {
    let mut table = [[0u64; MAX_SPAN + 1]; MAX_SPAN + 1];
    let mut span = 1;
    while span <= MAX_SPAN {
        let mut weight = min_weight(span);
        while weight <= span {
            table[span][weight - min_weight(span)] = tuned_pattern(span, weight);
            weight += 1;
        }
        span += 1;
    }
    table
}

/// Pattern lookup indexed by `[span][weight − min_weight(span)]`.
static PATTERN_TABLE: [[u64; MAX_SPAN + 1]; MAX_SPAN + 1] = build_pattern_table();

/// `(min, max)` weight supported for `span`.
pub fn weight_range(span: usize) -> Result<(usize, usize)> {
    if span == 0 || span > MAX_SPAN {
        return Err(SeedError::UnsupportedSpan {
            span,
            max: MAX_SPAN,
        });
    }
    Ok((min_weight(span), span))
}

/// Span of a raw pattern: index of its highest set bit plus one.
#[inline]
pub fn pattern_span(bits: u64) -> usize {
    (u64::BITS - bits.leading_zeros()) as usize
}

/// Weight of a raw pattern: number of care positions.
#[inline]
pub fn pattern_weight(bits: u64) -> usize {
    bits.count_ones() as usize
}

#[inline(always)]
fn low_bits(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ExtractionStep {
    mask: u64,
    shift: u32,
}

/// An immutable spaced seed pattern with its extraction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPattern {
    bits: u64,
    span: usize,
    weight: usize,
    steps: [ExtractionStep; MAX_CARE_BLOCKS],
    num_steps: usize,
}

impl SeedPattern {
    /// Build a pattern from its raw bitmask.
    pub fn from_bits(bits: u64) -> Result<Self> {
        if bits == 0 {
            return Err(SeedError::InvalidPattern(
                "pattern has no care positions".to_string(),
            ));
        }
        if bits & 1 == 0 {
            return Err(SeedError::InvalidPattern(format!(
                "anchor position of pattern {:#b} is not a care position",
                bits
            )));
        }
        let span = pattern_span(bits);
        if span > MAX_SPAN {
            return Err(SeedError::UnsupportedSpan {
                span,
                max: MAX_SPAN,
            });
        }

        let mut steps = [ExtractionStep::default(); MAX_CARE_BLOCKS];
        let mut num_steps = 0;
        let mut care_below = 0usize;
        let mut pos = 0usize;
        while pos < span {
            if (bits >> pos) & 1 == 0 {
                pos += 1;
                continue;
            }
            let start = pos;
            while pos < span && (bits >> pos) & 1 == 1 {
                pos += 1;
            }
            let len = pos - start;
            steps[num_steps] = ExtractionStep {
                mask: low_bits(2 * len) << (2 * start),
                shift: (2 * (start - care_below)) as u32,
            };
            num_steps += 1;
            care_below += len;
        }

        Ok(Self {
            bits,
            span,
            weight: care_below,
            steps,
            num_steps,
        })
    }

    /// Look up the pre-tuned pattern for `(span, weight)`.
    pub fn from_span_weight(span: usize, weight: usize) -> Result<Self> {
        let (min, max) = weight_range(span)?;
        if weight < min || weight > max {
            return Err(SeedError::WeightOutOfRange {
                span,
                weight,
                min,
                max,
            });
        }
        Self::from_bits(PATTERN_TABLE[span][weight - min])
    }

    /// Contiguous pattern: every position is a care position.
    pub fn contiguous(span: usize) -> Result<Self> {
        Self::from_span_weight(span, span)
    }

    #[inline]
    pub fn bits(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub fn span(&self) -> usize {
        self.span
    }

    #[inline]
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Number of care blocks (equals the extraction table length).
    #[inline]
    pub fn care_blocks(&self) -> usize {
        self.num_steps
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.weight == self.span
    }

    /// Reduce a full k-mer code (2 bits per symbol, last symbol lowest) to
    /// the packed seed code of its care positions.
    #[inline]
    pub fn extract(&self, kmer_code: u64) -> u64 {
        self.steps[..self.num_steps]
            .iter()
            .fold(0u64, |code, step| code | ((kmer_code & step.mask) >> step.shift))
    }

    /// Window offsets (0 = first symbol) of the care positions.
    pub fn care_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.span)
            .filter(move |&i| (self.bits >> i) & 1 == 1)
            .map(move |i| self.span - 1 - i)
    }

    /// Mask selecting the full window in a rolling k-mer code.
    #[inline]
    pub fn window_mask(&self) -> u64 {
        low_bits(2 * self.span)
    }
}

impl fmt::Display for SeedPattern {
    /// Most significant position first, e.g. `1101011`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.span).rev() {
            let c = if (self.bits >> i) & 1 == 1 { '1' } else { '0' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl FromStr for SeedPattern {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(SeedError::InvalidPattern("empty pattern string".to_string()));
        }
        if s.len() > MAX_SPAN {
            return Err(SeedError::UnsupportedSpan {
                span: s.len(),
                max: MAX_SPAN,
            });
        }
        if !s.starts_with('1') || !s.ends_with('1') {
            return Err(SeedError::InvalidPattern(format!(
                "pattern {} must start and end with a care position",
                s
            )));
        }
        let mut bits = 0u64;
        for c in s.chars() {
            bits <<= 1;
            match c {
                '1' => bits |= 1,
                '0' => {}
                _ => {
                    return Err(SeedError::InvalidPattern(format!(
                        "unexpected character '{}' in pattern {}",
                        c, s
                    )))
                }
            }
        }
        Self::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack symbols (first symbol highest) the way a rolling k-mer code does.
    fn kmer_code(symbols: &[u8]) -> u64 {
        symbols.iter().fold(0u64, |code, &s| (code << 2) | s as u64)
    }

    #[test]
    fn test_weight_range() {
        assert_eq!(weight_range(1).unwrap(), (1, 1));
        assert_eq!(weight_range(2).unwrap(), (2, 2));
        assert_eq!(weight_range(3).unwrap(), (2, 3));
        assert_eq!(weight_range(7).unwrap(), (4, 7));
        assert_eq!(weight_range(32).unwrap(), (16, 32));
        assert!(matches!(
            weight_range(0),
            Err(SeedError::UnsupportedSpan { .. })
        ));
        assert!(matches!(
            weight_range(33),
            Err(SeedError::UnsupportedSpan { .. })
        ));
    }

    #[test]
    fn test_span_weight_of_raw_bits() {
        assert_eq!(pattern_span(0b1101011), 7);
        assert_eq!(pattern_weight(0b1101011), 5);
        assert_eq!(pattern_span(1), 1);
    }

    #[test]
    fn test_table_patterns_are_valid_for_every_span_and_weight() {
        for span in 1..=MAX_SPAN {
            let (min, max) = weight_range(span).unwrap();
            for weight in min..=max {
                let p = SeedPattern::from_span_weight(span, weight).unwrap();
                assert_eq!(p.span(), span, "span mismatch for ({}, {})", span, weight);
                assert_eq!(p.weight(), weight, "weight mismatch for ({}, {})", span, weight);
                assert_eq!(p.bits() & 1, 1);
                // odd number of blocks: care blocks = dont-care blocks + 1
                let dc_blocks = p.to_string().split('1').filter(|s| !s.is_empty()).count();
                assert_eq!(p.care_blocks(), dc_blocks + 1);
            }
        }
    }

    #[test]
    fn test_weight_out_of_range() {
        assert!(matches!(
            SeedPattern::from_span_weight(7, 3),
            Err(SeedError::WeightOutOfRange { min: 4, max: 7, .. })
        ));
        assert!(matches!(
            SeedPattern::from_span_weight(7, 8),
            Err(SeedError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn test_invalid_raw_patterns() {
        assert!(SeedPattern::from_bits(0).is_err());
        assert!(SeedPattern::from_bits(0b110).is_err());
        assert!(matches!(
            SeedPattern::from_bits(1u64 << 40 | 1),
            Err(SeedError::UnsupportedSpan { span: 41, .. })
        ));
    }

    #[test]
    fn test_extraction_table_layout() {
        // blocks: [care 0..2) [dc 2..3) [care 3..4)
        let p = SeedPattern::from_bits(0b1011).unwrap();
        assert_eq!(p.care_blocks(), 2);
        assert_eq!(p.steps[0], ExtractionStep { mask: 0b1111, shift: 0 });
        assert_eq!(p.steps[1], ExtractionStep { mask: 0b11 << 6, shift: 2 });
    }

    #[test]
    fn test_extract_drops_dont_care_symbols() {
        let p: SeedPattern = "1101011".parse().unwrap();
        let code = kmer_code(&[0, 1, 2, 3, 0, 1, 2]);
        // care symbols in window order: 0, 1, 3, 1, 2
        assert_eq!(p.extract(code), kmer_code(&[0, 1, 3, 1, 2]));

        // symbols under don't-care positions do not change the seed code
        let other = kmer_code(&[0, 1, 0, 3, 3, 1, 2]);
        assert_eq!(p.extract(code), p.extract(other));
    }

    #[test]
    fn test_extract_contiguous_is_identity() {
        let p = SeedPattern::contiguous(32).unwrap();
        let code = 0xDEAD_BEEF_1234_5678u64;
        assert_eq!(p.extract(code), code);
        let p = SeedPattern::contiguous(5).unwrap();
        assert_eq!(p.extract(0b11_10_01_00_11), 0b11_10_01_00_11);
    }

    #[test]
    fn test_care_offsets() {
        let p: SeedPattern = "1101011".parse().unwrap();
        let mut offsets: Vec<usize> = p.care_offsets().collect();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![0, 1, 3, 5, 6]);
    }

    #[test]
    fn test_string_round_trip_and_rejection() {
        let p: SeedPattern = "1101011".parse().unwrap();
        assert_eq!(p.to_string(), "1101011");
        assert_eq!(p.bits(), 0b1101011);
        assert!("".parse::<SeedPattern>().is_err());
        assert!("0110".parse::<SeedPattern>().is_err());
        assert!("1120".parse::<SeedPattern>().is_err());
        assert!("1".repeat(33).parse::<SeedPattern>().is_err());
    }
}
