//! K-mer list collection and seed-pair merging.
//!
//! Every window of `span` symbols free of wildcards is reduced to its spaced
//! seed code. Both lists are sorted by code, and equal codes are expanded into
//! seed pairs unless the code occurs more than `maxfreq` times in either list.

use rayon::prelude::*;

use crate::core::compute::encoding::is_special;
use crate::core::io::SequenceSet;
use crate::core::seed::SeedPattern;
use crate::error::{Result, SeedError};

use super::types::{KmerPos, SeedPair};

/// Seed codes of every sentinel-free window, sorted by `(code, seqnum, endpos)`.
pub fn collect_kmers(set: &SequenceSet, pattern: &SeedPattern) -> Vec<KmerPos> {
    let span = pattern.span();
    let window_mask = pattern.window_mask();

    let mut kmers: Vec<KmerPos> = set
        .seqs()
        .par_iter()
        .enumerate()
        .flat_map_iter(|(seqnum, seq)| {
            let mut out = Vec::with_capacity(seq.len().saturating_sub(span - 1));
            let mut code = 0u64;
            let mut valid = 0usize;
            for (pos, &c) in seq.iter().enumerate() {
                if is_special(c) {
                    valid = 0;
                    code = 0;
                    continue;
                }
                code = ((code << 2) | c as u64) & window_mask;
                valid += 1;
                if valid >= span {
                    out.push(KmerPos {
                        code: pattern.extract(code),
                        seqnum: seqnum as u32,
                        endpos: pos as u32,
                    });
                }
            }
            out
        })
        .collect();

    kmers.par_sort_unstable();
    log::debug!(
        "collect_kmers: {} k-mers from {} sequences (pattern {})",
        kmers.len(),
        set.len(),
        pattern
    );
    kmers
}

/// Walk the runs of equal codes present in both lists.
///
/// `visit` receives both runs and the code frequency `max(|arun|, |brun|)`
/// for every code with frequency at most `maxfreq`.
pub(crate) fn for_each_common_run<F>(alist: &[KmerPos], blist: &[KmerPos], maxfreq: usize, mut visit: F)
where
    F: FnMut(&[KmerPos], &[KmerPos], usize),
{
    let (mut ai, mut bi) = (0, 0);
    while ai < alist.len() && bi < blist.len() {
        let (acode, bcode) = (alist[ai].code, blist[bi].code);
        if acode < bcode {
            ai += 1;
        } else if acode > bcode {
            bi += 1;
        } else {
            let aend = ai + alist[ai..].iter().take_while(|k| k.code == acode).count();
            let bend = bi + blist[bi..].iter().take_while(|k| k.code == acode).count();
            let frequency = (aend - ai).max(bend - bi);
            if frequency <= maxfreq {
                visit(&alist[ai..aend], &blist[bi..bend], frequency);
            }
            ai = aend;
            bi = bend;
        }
    }
}

/// Self-comparison duplicate suppression: keep `(a, b)` only when `a`
/// precedes `b` by at least `endposdiff` on the same sequence, or lies on
/// an earlier sequence.
#[inline(always)]
pub(crate) fn keep_pair(a: &KmerPos, b: &KmerPos, selfcomp: bool, endposdiff: u32) -> bool {
    !selfcomp
        || a.seqnum < b.seqnum
        || (a.seqnum == b.seqnum && a.endpos as u64 + endposdiff as u64 <= b.endpos as u64)
}

/// Expand equal codes into seed pairs sorted by `(aseqnum, bseqnum, bpos, apos)`.
pub fn merge_seed_pairs(
    alist: &[KmerPos],
    blist: &[KmerPos],
    maxfreq: usize,
    selfcomp: bool,
    endposdiff: u32,
) -> Vec<SeedPair> {
    let mut pairs = Vec::new();
    for_each_common_run(alist, blist, maxfreq, |arun, brun, _| {
        for a in arun {
            for b in brun {
                if keep_pair(a, b, selfcomp, endposdiff) {
                    pairs.push(SeedPair::new(a.seqnum, a.endpos, b.seqnum, b.endpos));
                }
            }
        }
    });
    pairs.par_sort_unstable();
    log::debug!(
        "merge_seed_pairs: {} seed pairs (maxfreq {}, selfcomp {})",
        pairs.len(),
        maxfreq,
        selfcomp
    );
    pairs
}

/// Check that every seed pair agrees on all care positions of `pattern`.
pub fn verify_seed_pairs(
    aset: &SequenceSet,
    bset: &SequenceSet,
    pairs: &[SeedPair],
    pattern: &SeedPattern,
) -> Result<()> {
    let span = pattern.span() as u32;
    let offsets: Vec<u32> = pattern.care_offsets().map(|o| o as u32).collect();
    for sp in pairs {
        let aseq = aset.seq(sp.aseqnum as usize);
        let bseq = bset.seq(sp.bseqnum as usize);
        let astart = (sp.apos + 1).checked_sub(span);
        let bstart = (sp.bpos + 1).checked_sub(span);
        let ok = match (astart, bstart) {
            (Some(astart), Some(bstart)) => offsets.iter().all(|&o| {
                let (ai, bi) = ((astart + o) as usize, (bstart + o) as usize);
                ai < aseq.len() && bi < bseq.len() && !is_special(aseq[ai]) && aseq[ai] == bseq[bi]
            }),
            _ => false,
        };
        if !ok {
            return Err(SeedError::SeedMismatch {
                aseq: sp.aseqnum,
                apos: sp.apos,
                bseq: sp.bseqnum,
                bpos: sp.bpos,
            });
        }
    }
    log::info!("Verified {} seed pairs", pairs.len());
    Ok(())
}

/// Contiguous runs of seed pairs with the same `(aseqnum, bseqnum)`.
pub fn segments(pairs: &[SeedPair]) -> impl Iterator<Item = &[SeedPair]> {
    pairs.chunk_by(|x, y| x.same_segment(y))
}
