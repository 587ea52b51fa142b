//! Diagonal band coverage table.
//!
//! Filters seed pairs of one sequence pair down to the ones lying in densely
//! seeded regions. The diagonal space of an `amaxlen × bmaxlen` comparison is
//! cut into bands of `2^logwidth` diagonals; every seed adds the number of
//! B-axis positions it newly covers to its band. A seed is promising when the
//! coverage of its band plus the better of the two neighbouring bands reaches
//! the minimum coverage.
//!
//! ```text
//!  index:  0 | 1 .. numbands | numbands+1
//!          ^   real bands      ^
//!          sentinel (always 0) sentinel (always 0)
//! ```
//!
//! The table is allocated once per worker for the largest sequence pair and
//! reset between pairs. Resetting clears only the touched bands unless at
//! least a third of all bands are in use, in which case both arrays are
//! bulk-cleared.

use crate::error::{Result, SeedError};

/// Largest accepted band log-width.
pub const MAX_LOGWIDTH: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagonalBandTable {
    amaxlen: u32,
    bmaxlen: u32,
    logwidth: u32,
    numbands: usize,
    /// Per-band coverage, offset by one for the low sentinel.
    score: Vec<u32>,
    /// Last B-axis end position folded into each band.
    lastpos: Vec<u32>,
    used_bands: usize,
}

impl DiagonalBandTable {
    pub fn new(amaxlen: u32, bmaxlen: u32, logwidth: u32) -> Result<Self> {
        if logwidth > MAX_LOGWIDTH {
            return Err(SeedError::InvalidBandWidth(logwidth));
        }
        let numbands = 1 + ((amaxlen as usize + bmaxlen as usize) >> logwidth);
        log::trace!(
            "DiagonalBandTable: {} bands of width {} for {}x{}",
            numbands,
            1u32 << logwidth,
            amaxlen,
            bmaxlen
        );
        Ok(Self {
            amaxlen,
            bmaxlen,
            logwidth,
            numbands,
            score: vec![0; numbands + 2],
            lastpos: vec![0; numbands + 2],
            used_bands: 0,
        })
    }

    #[inline]
    pub fn amaxlen(&self) -> u32 {
        self.amaxlen
    }

    #[inline]
    pub fn bmaxlen(&self) -> u32 {
        self.bmaxlen
    }

    #[inline]
    pub fn logwidth(&self) -> u32 {
        self.logwidth
    }

    #[inline]
    pub fn num_bands(&self) -> usize {
        self.numbands
    }

    #[inline]
    pub fn used_bands(&self) -> usize {
        self.used_bands
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used_bands == 0
    }

    /// Band of the diagonal through `(apos, bpos)`.
    #[inline]
    pub fn band(&self, apos: u32, bpos: u32) -> usize {
        assert!(
            apos <= self.amaxlen && bpos <= self.bmaxlen,
            "hit ({}, {}) outside the {}x{} diagonal space",
            apos,
            bpos,
            self.amaxlen,
            self.bmaxlen
        );
        ((self.amaxlen - apos) as usize + bpos as usize) >> self.logwidth
    }

    #[inline]
    pub fn band_score(&self, band: usize) -> u32 {
        self.score[band + 1]
    }

    #[inline]
    pub fn band_lastpos(&self, band: usize) -> u32 {
        self.lastpos[band + 1]
    }

    /// Fold one seed ending at `(apos, bpos)` into its band.
    ///
    /// Positions already covered by an earlier seed of the band are not
    /// counted again, so feeding the same hit twice is a no-op.
    #[inline]
    pub fn single_update(&mut self, apos: u32, bpos: u32, matchlen: u32) {
        assert!(matchlen > 0, "seed length must be positive");
        let idx = self.band(apos, bpos) + 1;
        let score = self.score[idx];
        let lastpos = self.lastpos[idx];

        if score == 0 || u64::from(lastpos) + u64::from(matchlen) <= u64::from(bpos) {
            if score == 0 {
                self.used_bands += 1;
            }
            self.score[idx] = score + matchlen;
            self.lastpos[idx] = bpos;
        } else if lastpos < bpos {
            self.score[idx] = score + (bpos - lastpos);
            self.lastpos[idx] = bpos;
        }
    }

    /// Fold a batch of hits; overlap suppression expects non-decreasing
    /// `bpos` within each band.
    pub fn multi_update<I>(&mut self, hits: I, matchlen: u32)
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        for (apos, bpos) in hits {
            self.single_update(apos, bpos, matchlen);
        }
    }

    /// Coverage of the band through `(apos, bpos)` plus its better neighbour.
    #[inline]
    pub fn coverage(&self, apos: u32, bpos: u32) -> u32 {
        let idx = self.band(apos, bpos) + 1;
        self.score[idx] + self.score[idx - 1].max(self.score[idx + 1])
    }

    /// Return to the all-zero state after a sequence pair whose hits were
    /// `touched`.
    pub fn reset<I>(&mut self, touched: I)
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        if self.used_bands * 3 >= self.numbands {
            self.clear_all();
        } else {
            self.clear_touched(touched);
        }
    }

    /// Bulk-clear both arrays.
    pub fn clear_all(&mut self) {
        self.score.fill(0);
        self.lastpos.fill(0);
        self.used_bands = 0;
    }

    /// Clear only the bands of the given hits.
    pub fn clear_touched<I>(&mut self, touched: I)
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        for (apos, bpos) in touched {
            let idx = self.band(apos, bpos) + 1;
            self.score[idx] = 0;
            self.lastpos[idx] = 0;
        }
        self.used_bands = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_count_and_index() {
        let table = DiagonalBandTable::new(100, 60, 3).unwrap();
        assert_eq!(table.num_bands(), 1 + (160 >> 3));
        assert_eq!(table.band(100, 0), 0);
        assert_eq!(table.band(0, 60), 160 >> 3);
        assert_eq!(table.band(10, 10), 100 >> 3);
        assert!(table.is_empty());
    }

    #[test]
    fn test_invalid_logwidth() {
        assert!(matches!(
            DiagonalBandTable::new(10, 10, 11),
            Err(SeedError::InvalidBandWidth(11))
        ));
    }

    #[test]
    #[should_panic]
    fn test_hit_outside_diagonal_space_panics() {
        let table = DiagonalBandTable::new(10, 10, 2).unwrap();
        table.band(11, 0);
    }

    #[test]
    fn test_single_update_credits_fresh_band() {
        let mut table = DiagonalBandTable::new(1000, 1000, 6).unwrap();
        table.single_update(100, 120, 12);
        let band = table.band(100, 120);
        assert_eq!(table.band_score(band), 12);
        assert_eq!(table.band_lastpos(band), 120);
        assert_eq!(table.used_bands(), 1);
    }

    #[test]
    fn test_single_update_overlapping_seeds() {
        let mut table = DiagonalBandTable::new(1000, 1000, 6).unwrap();
        let band = table.band(100, 120);
        table.single_update(100, 120, 12);
        // disjoint seed on the same diagonal: full credit
        table.single_update(112, 132, 12);
        assert_eq!(table.band_score(band), 24);
        // overlapping seed: only the 4 new positions
        table.single_update(116, 136, 12);
        assert_eq!(table.band_score(band), 28);
        assert_eq!(table.band_lastpos(band), 136);
        assert_eq!(table.used_bands(), 1);
    }

    #[test]
    fn test_single_update_repeat_is_idempotent() {
        let mut table = DiagonalBandTable::new(1000, 1000, 6).unwrap();
        table.single_update(100, 120, 12);
        let before = table.clone();
        table.single_update(100, 120, 12);
        assert_eq!(table, before);
        // an earlier end position in the same band adds nothing either
        table.single_update(95, 115, 12);
        assert_eq!(table, before);
    }

    #[test]
    fn test_coverage_adds_best_neighbour() {
        let mut table = DiagonalBandTable::new(1000, 1000, 4).unwrap();
        // three hits on adjacent bands
        table.single_update(500, 500, 10); // band (1000)>>4 = 62
        table.single_update(500, 516, 7); // band 63
        table.single_update(500, 484, 3); // band 61
        assert_eq!(table.band(500, 500), 62);
        assert_eq!(table.coverage(500, 500), 10 + 7);
        assert_eq!(table.coverage(500, 516), 7 + 10);
        assert_eq!(table.coverage(500, 484), 3 + 10);
        assert_eq!(table.used_bands(), 3);
    }

    #[test]
    fn test_coverage_small_table_scenario() {
        let mut table = DiagonalBandTable::new(100, 100, 2).unwrap();
        table.single_update(10, 10, 5);
        assert!(table.coverage(10, 10) >= 5);

        let band = table.band(10, 10);
        assert_eq!(band, 25);
        table.single_update(10, 14, 3);
        assert_eq!(table.band(10, 14), band + 1);
        let expected = table.band_score(band)
            + table.band_score(band - 1).max(table.band_score(band + 1));
        assert_eq!(table.coverage(10, 10), expected);
        assert_eq!(table.coverage(10, 10), 8);
    }

    #[test]
    fn test_overlap_check_near_position_limit() {
        let mut table = DiagonalBandTable::new(0, u32::MAX, MAX_LOGWIDTH).unwrap();
        let band = table.band(0, u32::MAX - 2);
        table.single_update(0, u32::MAX - 2, 12);
        table.single_update(0, u32::MAX, 12);
        assert_eq!(table.band(0, u32::MAX), band);
        // overlapping seed: only the 2 new positions
        assert_eq!(table.band_score(band), 14);
        assert_eq!(table.band_lastpos(band), u32::MAX);
    }

    #[test]
    fn test_coverage_at_sentinel_edges() {
        let mut table = DiagonalBandTable::new(64, 64, 0).unwrap();
        table.single_update(64, 0, 5);
        assert_eq!(table.band(64, 0), 0);
        assert_eq!(table.coverage(64, 0), 5);
        table.single_update(0, 64, 6);
        assert_eq!(table.band(0, 64), table.num_bands() - 1);
        assert_eq!(table.coverage(0, 64), 6);
    }

    #[test]
    fn test_multi_update_matches_single_updates() {
        let hits = vec![(10, 20), (14, 24), (300, 40), (18, 28)];
        let mut a = DiagonalBandTable::new(512, 512, 5).unwrap();
        let mut b = a.clone();
        a.multi_update(hits.iter().copied(), 8);
        for &(x, y) in &hits {
            b.single_update(x, y, 8);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_reset_partial_and_bulk() {
        let fresh = DiagonalBandTable::new(4096, 4096, 6).unwrap();

        // few bands touched: partial clear
        let mut table = fresh.clone();
        let hits = vec![(10, 10), (2000, 100)];
        table.multi_update(hits.iter().copied(), 4);
        assert!(table.used_bands() * 3 < table.num_bands());
        table.reset(hits.iter().copied());
        assert_eq!(table, fresh);
        assert!(table.is_empty());

        // most bands touched: bulk clear, touched list is irrelevant
        let mut table = fresh.clone();
        let hits: Vec<(u32, u32)> = (0..4096).step_by(64).map(|b| (0, b)).collect();
        table.multi_update(hits.iter().copied(), 4);
        assert!(table.used_bands() * 3 >= table.num_bands());
        table.reset(std::iter::empty());
        assert_eq!(table, fresh);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_bulk_and_partial_reset_agree(
                hits in proptest::collection::vec((0u32..=300, 0u32..=200), 0..200),
                logwidth in 0u32..=6,
                matchlen in 1u32..=16,
            ) {
                let fresh = DiagonalBandTable::new(300, 200, logwidth).unwrap();
                let mut table = fresh.clone();
                table.multi_update(hits.iter().copied(), matchlen);

                let mut bulk = table.clone();
                bulk.clear_all();
                let mut partial = table.clone();
                partial.clear_touched(hits.iter().copied());

                prop_assert_eq!(&bulk, &partial);
                prop_assert_eq!(&bulk, &fresh);
            }

            #[test]
            fn prop_reset_restores_fresh_table(
                hits in proptest::collection::vec((0u32..=300, 0u32..=200), 0..400),
                logwidth in 0u32..=6,
                matchlen in 1u32..=16,
            ) {
                let fresh = DiagonalBandTable::new(300, 200, logwidth).unwrap();
                let mut table = fresh.clone();
                table.multi_update(hits.iter().copied(), matchlen);
                let after_first = table.clone();

                // either side of used_bands * 3 >= numbands
                table.reset(hits.iter().copied());
                prop_assert_eq!(&table, &fresh);

                // a second pair sees no trace of the first
                table.multi_update(hits.iter().copied(), matchlen);
                prop_assert_eq!(&table, &after_first);
            }

            #[test]
            fn prop_used_bands_counts_nonzero_scores(
                hits in proptest::collection::vec((0u32..=500, 0u32..=500), 0..300),
            ) {
                let mut table = DiagonalBandTable::new(500, 500, 3).unwrap();
                table.multi_update(hits.iter().copied(), 5);
                let nonzero = (0..table.num_bands()).filter(|&b| table.band_score(b) > 0).count();
                prop_assert_eq!(table.used_bands(), nonzero);
            }
        }
    }
}
