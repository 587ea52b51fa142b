//! Core data types for weighted chaining.

/// A candidate local match between axis 0 (sequence A) and axis 1
/// (sequence B), with the chaining state attached during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentLink {
    /// Axis-0 range, half-open
    pub a_start: u32,
    pub a_end: u32,
    /// Axis-1 range, half-open
    pub b_start: u32,
    pub b_end: u32,
    /// Estimated number of differences
    pub distance: u32,
    /// `10000 × identity²`
    pub weight: f64,
    pub(crate) score: f64,
    pub(crate) gap: u64,
    /// Predecessor in the best chain ending here (insertion index)
    pub(crate) prev: Option<usize>,
}

impl AlignmentLink {
    pub fn new(a_start: u32, a_end: u32, b_start: u32, b_end: u32, distance: u32) -> Self {
        debug_assert!(a_start <= a_end && b_start <= b_end);
        let mut link = Self {
            a_start,
            a_end,
            b_start,
            b_end,
            distance,
            weight: 0.0,
            score: 0.0,
            gap: 0,
            prev: None,
        };
        link.weight = link_weight(link.aligned_len(), distance);
        link
    }

    #[inline]
    pub fn len0(&self) -> u32 {
        self.a_end - self.a_start
    }

    #[inline]
    pub fn len1(&self) -> u32 {
        self.b_end - self.b_start
    }

    /// Sum of both axis lengths.
    #[inline]
    pub fn aligned_len(&self) -> u64 {
        self.len0() as u64 + self.len1() as u64
    }

    #[inline]
    pub fn min_len(&self) -> u32 {
        self.len0().min(self.len1())
    }

    /// `(aligned_len − 2 × distance) / aligned_len`
    pub fn identity(&self) -> f64 {
        link_identity(self.aligned_len(), self.distance)
    }
}

#[inline]
fn link_identity(aligned_len: u64, distance: u32) -> f64 {
    if aligned_len == 0 {
        return 0.0;
    }
    (aligned_len as f64 - 2.0 * distance as f64) / aligned_len as f64
}

#[inline]
fn link_weight(aligned_len: u64, distance: u32) -> f64 {
    let identity = link_identity(aligned_len, distance);
    10000.0 * identity * identity
}

/// Best chain of one sequence pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    /// Insertion indices of the chained links, start to end
    pub indices: Vec<usize>,
    pub score: f64,
    pub gap: u64,
}

impl Chain {
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Totals along the best chain, without the index list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChainStats {
    pub links: usize,
    pub distance: u64,
    pub aligned_len: u64,
    pub score: f64,
}

impl ChainStats {
    /// Identity implied by the summed distance and aligned length.
    pub fn identity(&self) -> f64 {
        if self.aligned_len == 0 {
            return 0.0;
        }
        (self.aligned_len as f64 - 2.0 * self.distance as f64) / self.aligned_len as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_weight_from_identity() {
        let exact = AlignmentLink::new(0, 100, 10, 110, 0);
        assert_eq!(exact.aligned_len(), 200);
        assert_eq!(exact.identity(), 1.0);
        assert_eq!(exact.weight, 10000.0);

        let noisy = AlignmentLink::new(0, 50, 0, 50, 5);
        assert!((noisy.identity() - 0.9).abs() < 1e-12);
        assert!((noisy.weight - 8100.0).abs() < 1e-6);
    }

    #[test]
    fn test_link_lengths() {
        let link = AlignmentLink::new(10, 40, 100, 120, 3);
        assert_eq!(link.len0(), 30);
        assert_eq!(link.len1(), 20);
        assert_eq!(link.min_len(), 20);
        assert_eq!(link.prev, None);
    }

    #[test]
    fn test_chain_stats_identity() {
        let stats = ChainStats {
            links: 2,
            distance: 10,
            aligned_len: 400,
            score: 0.0,
        };
        assert!((stats.identity() - 0.95).abs() < 1e-12);
        assert_eq!(ChainStats::default().identity(), 0.0);
    }
}
