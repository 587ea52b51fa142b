//! Thread-local workspace for reusable allocations
//!
//! Each rayon worker owns one band table, one chain filter and the scratch
//! buffers of the per-segment filtering. The band table is sized for the
//! largest sequence pair of the run and only reset between segments, so a
//! worker allocates once per run instead of once per sequence pair.

use std::cell::RefCell;

use crate::error::Result;

use super::chaining::WeightedChainFilter;
use super::diagband::DiagonalBandTable;

/// Initial capacity of the per-segment buffers.
const INITIAL_LINKS: usize = 256;

// Thread-local workspace for seed-extend buffers
thread_local! {
    static WORKSPACE: RefCell<Option<SeedExtendWorkspace>> = const { RefCell::new(None) };
}

/// A promising seed: band index and window end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BandHit {
    pub band: usize,
    pub bpos: u32,
    pub apos: u32,
}

/// Reusable buffers for one worker of the seed-extend pipeline
pub struct SeedExtendWorkspace {
    pub band_table: DiagonalBandTable,
    pub chain_filter: WeightedChainFilter,
    /// Promising seeds of the current segment
    pub hits: Vec<BandHit>,
}

impl SeedExtendWorkspace {
    pub fn new(amaxlen: u32, bmaxlen: u32, logwidth: u32) -> Result<Self> {
        Ok(Self {
            band_table: DiagonalBandTable::new(amaxlen, bmaxlen, logwidth)?,
            chain_filter: WeightedChainFilter::with_capacity(INITIAL_LINKS),
            hits: Vec::with_capacity(INITIAL_LINKS),
        })
    }

    /// Reallocate the band table only if the run dimensions changed.
    pub fn ensure_dims(&mut self, amaxlen: u32, bmaxlen: u32, logwidth: u32) -> Result<()> {
        let table = &self.band_table;
        if table.amaxlen() != amaxlen || table.bmaxlen() != bmaxlen || table.logwidth() != logwidth
        {
            log::debug!(
                "Resizing band table from {}x{} to {}x{} (logwidth {})",
                table.amaxlen(),
                table.bmaxlen(),
                amaxlen,
                bmaxlen,
                logwidth
            );
            self.band_table = DiagonalBandTable::new(amaxlen, bmaxlen, logwidth)?;
        }
        Ok(())
    }

    /// Clear per-segment state, keeping allocations.
    pub fn clear(&mut self) {
        self.chain_filter.reset();
        self.hits.clear();
    }
}

/// Execute a function with this thread's workspace, sized for the given
/// dimensions.
///
/// # Example
/// ```ignore
/// with_workspace(amaxlen, bmaxlen, logwidth, |ws| {
///     ws.band_table.single_update(apos, bpos, span);
///     Ok(())
/// })?;
/// ```
pub fn with_workspace<F, R>(amaxlen: u32, bmaxlen: u32, logwidth: u32, f: F) -> Result<R>
where
    F: FnOnce(&mut SeedExtendWorkspace) -> Result<R>,
{
    WORKSPACE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let ws = match slot.take() {
            Some(mut ws) => {
                ws.ensure_dims(amaxlen, bmaxlen, logwidth)?;
                ws
            }
            None => SeedExtendWorkspace::new(amaxlen, bmaxlen, logwidth)?,
        };
        f(slot.insert(ws))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_reused_across_calls() {
        let first = with_workspace(100, 100, 4, |ws| {
            ws.band_table.single_update(10, 20, 5);
            ws.band_table.clear_all();
            Ok(ws.band_table.num_bands())
        })
        .unwrap();
        let second = with_workspace(100, 100, 4, |ws| Ok(ws.band_table.num_bands())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ensure_dims_resizes() {
        let mut ws = SeedExtendWorkspace::new(10, 10, 2).unwrap();
        let bands = ws.band_table.num_bands();
        ws.ensure_dims(10, 10, 2).unwrap();
        assert_eq!(ws.band_table.num_bands(), bands);
        ws.ensure_dims(1000, 10, 2).unwrap();
        assert_eq!(ws.band_table.num_bands(), 1 + (1010 >> 2));
        assert!(ws.ensure_dims(10, 10, 11).is_err());
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut ws = SeedExtendWorkspace::new(10, 10, 2).unwrap();
        ws.chain_filter.add(0, 5, 0, 5, 0);
        ws.hits.push(BandHit { band: 1, bpos: 3, apos: 4 });
        let cap = ws.hits.capacity();
        ws.clear();
        assert!(ws.chain_filter.is_empty());
        assert!(ws.hits.is_empty());
        assert_eq!(ws.hits.capacity(), cap);
    }
}
