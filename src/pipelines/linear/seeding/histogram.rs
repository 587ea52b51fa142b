//! Maximum k-mer frequency from a memory limit.
//!
//! Before seed pairs are materialized, a histogram counts how many seed pairs
//! each k-mer frequency would contribute. The largest frequency whose
//! cumulative seed-pair count still fits into 98% of the memory limit (minus
//! the memory held by the k-mer lists) becomes the maximum frequency.

use std::mem::size_of;

use crate::error::{Result, SeedError};

use super::collection::{for_each_common_run, keep_pair};
use super::types::{KmerPos, SeedPair};

/// Frequencies above this are pooled into one histogram bucket.
pub const MAX_HISTOGRAM_FREQUENCY: usize = 8190;

/// Share of the memory limit available to seed pairs.
const MEMLIMIT_FRACTION: f64 = 0.98;

/// Outcome of the histogram pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyLimit {
    /// Largest admissible k-mer frequency (`usize::MAX`: unlimited)
    pub maxfreq: usize,
    /// Expected number of seed pairs under `maxfreq`
    pub expected_pairs: u64,
}

/// Parameters of one histogram pass.
#[derive(Debug, Clone, Copy)]
pub struct HistogramParams {
    pub maxfreq: usize,
    pub memlimit: u64,
    /// K-mer list entries held in memory while seed pairs are built
    pub kmers_in_memory: usize,
    pub selfcomp: bool,
    /// A and B lists are the same list (forward self comparison)
    pub identical_lists: bool,
    pub endposdiff: u32,
}

/// Seed pairs contributed by each frequency; bucket `maxgram − 1` pools all
/// frequencies `≥ maxgram`.
pub fn frequency_histogram(
    alist: &[KmerPos],
    blist: &[KmerPos],
    params: &HistogramParams,
    maxgram: usize,
) -> Vec<u64> {
    let mut histogram = vec![0u64; maxgram];
    for_each_common_run(alist, blist, params.maxfreq, |arun, brun, frequency| {
        let bucket = frequency.min(maxgram) - 1;
        if params.selfcomp {
            let kept = arun
                .iter()
                .map(|a| {
                    brun.iter()
                        .filter(|b| keep_pair(a, b, true, params.endposdiff))
                        .count() as u64
                })
                .sum::<u64>();
            histogram[bucket] += kept;
        } else {
            histogram[bucket] += arun.len() as u64 * brun.len() as u64;
        }
    });
    histogram
}

/// Derive the maximum k-mer frequency fitting into `params.memlimit`.
pub fn maxfreq_for_memlimit(
    alist: &[KmerPos],
    blist: &[KmerPos],
    params: &HistogramParams,
) -> Result<FrequencyLimit> {
    let maxgram = params.maxfreq.min(MAX_HISTOGRAM_FREQUENCY) + 1;
    let histogram = frequency_histogram(alist, blist, params, maxgram);

    let pair_size = size_of::<SeedPair>() as u64;
    let mem_used = (params.kmers_in_memory * size_of::<KmerPos>()) as u64;
    let mem_avail = (MEMLIMIT_FRACTION * params.memlimit as f64) as u64;
    let pairs_avail = mem_avail.saturating_sub(mem_used) / pair_size;

    let mut maxfreq = 0usize;
    let mut expected = 0u64;
    if pairs_avail > 0 {
        let mut fitting = 0;
        for (i, &count) in histogram.iter().enumerate() {
            if expected + count > pairs_avail {
                break;
            }
            expected += count;
            fitting = i + 1;
        }
        maxfreq = if fitting == maxgram {
            usize::MAX
        } else {
            fitting
        };
        maxfreq = maxfreq.min(params.maxfreq);
    }

    if maxfreq == 0 || (maxfreq == 1 && params.identical_lists) {
        let needed_pairs = if params.identical_lists {
            histogram.iter().take(2).sum::<u64>()
        } else {
            histogram.first().copied().unwrap_or(0)
        };
        let required = ((needed_pairs * pair_size + mem_used) as f64 / MEMLIMIT_FRACTION) as u64;
        return Err(SeedError::MemLimitTooStrict {
            required_mb: (required >> 20) + 1,
        });
    }

    if maxfreq == usize::MAX {
        log::info!(
            "Memory limit allows all k-mers, expecting {} seed pairs",
            expected
        );
    } else if maxfreq <= 5 {
        log::warn!(
            "Only k-mers occurring <= {} times will be considered, due to small memlimit",
            maxfreq
        );
    } else {
        log::info!(
            "Set k-mer maximum frequency to {}, expecting {} seed pairs",
            maxfreq,
            expected
        );
    }

    Ok(FrequencyLimit {
        maxfreq,
        expected_pairs: expected,
    })
}
