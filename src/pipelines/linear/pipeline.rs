//! Seed-extend pipeline driver
//!
//! Compares every sequence of set A with every sequence of set B (or of A
//! itself) on the forward strand and the reverse complement of B.
//!
//! # Pipeline Flow
//!
//! ```text
//! [A, B] → K-mer lists → Seed pairs → Band filter → Chaining → Verification → [matches]
//! ```
//!
//! Seed pairs are split into segments of one sequence pair each. Segments
//! are independent and processed in parallel; every rayon worker keeps its
//! band table and chain filter in a thread-local workspace.
//!
//! With `only_seeds` the run stops after chaining and reports the chained
//! links with their estimated distances. The debug options keep copies of
//! the k-mer lists and seed pairs in the run result.
//!
//! # Usage
//!
//! ```ignore
//! let params = opt.resolve_defaults(&aset, bset.as_ref())?;
//! let run = run_seed_extend(&aset, bset.as_ref(), &params)?;
//! ```

use std::fmt;
use std::time::Instant;

use rayon::prelude::*;

use super::chaining::{AlignmentLink, WeightedChainFilter};
use super::seeding::{
    collect_kmers, maxfreq_for_memlimit, merge_seed_pairs, segments, verify_seed_pairs,
    HistogramParams, KmerPos, SeedPair,
};
use super::verify::verify_link;
use super::workspace::{with_workspace, BandHit, SeedExtendWorkspace};
use crate::core::alignment::types::{Strand, VerifiedMatch};
use crate::core::io::SequenceSet;
use crate::error::Result;
use crate::seed_opt::SeedExtendParams;

/// Counters of one seed-extend run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedExtendStats {
    pub kmers: usize,
    pub seed_pairs: usize,
    pub segments: usize,
    pub promising_seeds: usize,
    pub links: usize,
    pub matches: usize,
}

impl SeedExtendStats {
    fn merge(&mut self, other: &SeedExtendStats) {
        self.kmers += other.kmers;
        self.seed_pairs += other.seed_pairs;
        self.segments += other.segments;
        self.promising_seeds += other.promising_seeds;
        self.links += other.links;
        self.matches += other.matches;
    }
}

impl fmt::Display for SeedExtendStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} k-mers, {} seed pairs, {} segments, {} promising seeds, {} links, {} matches",
            self.kmers,
            self.seed_pairs,
            self.segments,
            self.promising_seeds,
            self.links,
            self.matches
        )
    }
}

/// Sequence set and strand a k-mer list was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmerListOrigin {
    A,
    B(Strand),
}

impl fmt::Display for KmerListOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KmerListOrigin::A => write!(f, "A"),
            KmerListOrigin::B(strand) => write!(f, "B{}", strand),
        }
    }
}

/// Intermediate lists kept for `debug_kmer` / `debug_seedpair`.
#[derive(Debug, Clone, Default)]
pub struct DebugLists {
    pub kmers: Vec<(KmerListOrigin, Vec<KmerPos>)>,
    pub seed_pairs: Vec<(Strand, Vec<SeedPair>)>,
}

impl DebugLists {
    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty() && self.seed_pairs.is_empty()
    }
}

/// Matches and counters of one run.
#[derive(Debug, Clone, Default)]
pub struct SeedExtendRun {
    pub matches: Vec<VerifiedMatch>,
    pub stats: SeedExtendStats,
    pub debug: DebugLists,
}

/// Compare `aset` with `bset`, or with itself when `bset` is `None`.
///
/// Matches are sorted by sequence pair, strand and position; matches contained
/// in another match of the same segment are dropped.
pub fn run_seed_extend(
    aset: &SequenceSet,
    bset: Option<&SequenceSet>,
    params: &SeedExtendParams,
) -> Result<SeedExtendRun> {
    let timer = Instant::now();
    let selfcomp = bset.is_none();
    let bfwd = bset.unwrap_or(aset);
    let pattern = &params.seeding.pattern;

    log::info!(
        "Seed pattern {} (span {}, weight {}), mincoverage {}, minidentity {}%",
        pattern,
        pattern.span(),
        pattern.weight(),
        params.filter.min_coverage,
        params.verify.min_identity
    );

    let list_start = Instant::now();
    let alist = collect_kmers(aset, pattern);
    log::info!(
        "Collected {} k-mers of A in {:.3}s",
        alist.len(),
        list_start.elapsed().as_secs_f64()
    );

    let mut run = SeedExtendRun::default();
    run.stats.kmers = alist.len();
    let debug_kmer = params.seeding.debug_kmer;
    if debug_kmer {
        run.debug.kmers.push((KmerListOrigin::A, alist.clone()));
    }

    if params.forward {
        let blist_owned;
        let blist: &[KmerPos] = if selfcomp {
            &alist
        } else {
            blist_owned = collect_kmers(bfwd, pattern);
            run.stats.kmers += blist_owned.len();
            if debug_kmer {
                run.debug
                    .kmers
                    .push((KmerListOrigin::B(Strand::Forward), blist_owned.clone()));
            }
            &blist_owned
        };
        let (matches, stats, pairs) = process_strand(
            aset,
            bfwd,
            &alist,
            blist,
            Strand::Forward,
            selfcomp,
            params,
        )?;
        run.matches.extend(matches);
        run.stats.merge(&stats);
        if let Some(pairs) = pairs {
            run.debug.seed_pairs.push((Strand::Forward, pairs));
        }
    }

    if params.reverse {
        let brev = bfwd.reverse_complemented();
        let blist = collect_kmers(&brev, pattern);
        run.stats.kmers += blist.len();
        if debug_kmer {
            run.debug
                .kmers
                .push((KmerListOrigin::B(Strand::Reverse), blist.clone()));
        }
        let (matches, stats, pairs) = process_strand(
            aset,
            &brev,
            &alist,
            &blist,
            Strand::Reverse,
            selfcomp,
            params,
        )?;
        run.matches.extend(matches);
        run.stats.merge(&stats);
        if let Some(pairs) = pairs {
            run.debug.seed_pairs.push((Strand::Reverse, pairs));
        }
    }

    run.matches.sort_by_key(|m| {
        (
            m.aseqnum, m.bseqnum, m.strand, m.a_start, m.b_start, m.a_end, m.b_end, m.distance,
        )
    });
    run.matches.dedup();
    run.stats.matches = run.matches.len();

    log::info!(
        "Seed-extend complete in {:.3}s: {}",
        timer.elapsed().as_secs_f64(),
        run.stats
    );
    Ok(run)
}

/// Matches, counters and (on request) the seed pairs of one strand.
type StrandOutcome = (Vec<VerifiedMatch>, SeedExtendStats, Option<Vec<SeedPair>>);

/// Seed pairs, filtering and verification for one strand of B.
///
/// `bstrand` holds the sequences of B in the coordinates of `strand`. The
/// seed pairs are returned as well when `debug_seedpair` is set.
fn process_strand(
    aset: &SequenceSet,
    bstrand: &SequenceSet,
    alist: &[KmerPos],
    blist: &[KmerPos],
    strand: Strand,
    selfcomp: bool,
    params: &SeedExtendParams,
) -> Result<StrandOutcome> {
    let strand_start = Instant::now();
    let seeding = &params.seeding;
    let span = seeding.pattern.span() as u32;
    let identical_lists = selfcomp && strand.is_forward();

    // Reverse-strand windows never coincide with their forward windows, so
    // only the mirrored duplicates are suppressed there.
    let endposdiff = if !strand.is_forward() {
        0
    } else if seeding.overlapping_seeds {
        1
    } else {
        span
    };

    let maxfreq = match seeding.memlimit {
        Some(memlimit) => {
            let histogram = HistogramParams {
                maxfreq: seeding.max_freq,
                memlimit,
                kmers_in_memory: alist.len() + if identical_lists { 0 } else { blist.len() },
                selfcomp,
                identical_lists,
                endposdiff,
            };
            maxfreq_for_memlimit(alist, blist, &histogram)?.maxfreq
        }
        None => seeding.max_freq,
    };

    let pairs = merge_seed_pairs(alist, blist, maxfreq, selfcomp, endposdiff);
    if seeding.verify_seeds {
        verify_seed_pairs(aset, bstrand, &pairs, &seeding.pattern)?;
    }

    let min_segment_len = params.min_segment_len();
    let segs: Vec<&[SeedPair]> = segments(&pairs)
        .filter(|seg| seg.len() >= min_segment_len)
        .collect();

    let amaxlen = aset.max_len() as u32;
    let bmaxlen = bstrand.max_len() as u32;
    let logwidth = params.filter.log_diagbandwidth;

    let outcomes = segs
        .par_iter()
        .map(|seg| {
            with_workspace(amaxlen, bmaxlen, logwidth, |ws| {
                process_segment(ws, seg, aset, bstrand, strand, params)
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut stats = SeedExtendStats {
        seed_pairs: pairs.len(),
        segments: segs.len(),
        ..SeedExtendStats::default()
    };
    let mut matches = Vec::new();
    for (found, seg_stats) in outcomes {
        stats.merge(&seg_stats);
        matches.extend(found);
    }

    log::info!(
        "{} strand: {} seed pairs in {} segments, {} matches in {:.3}s",
        if strand.is_forward() { "Forward" } else { "Reverse" },
        stats.seed_pairs,
        stats.segments,
        matches.len(),
        strand_start.elapsed().as_secs_f64()
    );
    let kept_pairs = seeding.debug_seedpair.then_some(pairs);
    Ok((matches, stats, kept_pairs))
}

/// Candidate region built from promising seeds of one band.
#[derive(Debug, Clone, Copy)]
struct Region {
    band: usize,
    a_start: u32,
    a_end: u32,
    b_start: u32,
    b_end: u32,
    distance: u32,
    diagonal: i64,
}

impl Region {
    fn start(hit: &BandHit, span: u32) -> Self {
        Self {
            band: hit.band,
            a_start: hit.apos + 1 - span,
            a_end: hit.apos + 1,
            b_start: hit.bpos + 1 - span,
            b_end: hit.bpos + 1,
            distance: 0,
            diagonal: hit.apos as i64 - hit.bpos as i64,
        }
    }

    /// Seed window overlaps or abuts the region on both axes.
    fn accepts(&self, hit: &BandHit, span: u32) -> bool {
        let (a0, a1) = (hit.apos + 1 - span, hit.apos + 1);
        let b0 = hit.bpos + 1 - span;
        hit.band == self.band && a0 <= self.a_end && a1 >= self.a_start && b0 <= self.b_end
    }

    fn absorb(&mut self, hit: &BandHit, span: u32) {
        let diagonal = hit.apos as i64 - hit.bpos as i64;
        self.a_start = self.a_start.min(hit.apos + 1 - span);
        self.a_end = self.a_end.max(hit.apos + 1);
        self.b_end = self.b_end.max(hit.bpos + 1);
        self.distance += (diagonal - self.diagonal).unsigned_abs() as u32;
        self.diagonal = diagonal;
    }

    /// Add as a link in forward B coordinates; the distance estimate is
    /// capped at the shorter side so the identity stays non-negative.
    fn add_to(&self, filter: &mut WeightedChainFilter, strand: Strand, blen: u32) {
        let distance = self
            .distance
            .min((self.a_end - self.a_start).min(self.b_end - self.b_start));
        let (b_start, b_end) = match strand {
            Strand::Forward => (self.b_start, self.b_end),
            Strand::Reverse => (blen - self.b_end, blen - self.b_start),
        };
        filter.add(self.a_start, self.a_end, b_start, b_end, distance);
    }
}

/// True if the position where verification of `link` begins already lies
/// inside a match of the segment. On the reverse strand the scan starts at
/// the last B position of the link in forward coordinates.
fn start_covered(found: &[VerifiedMatch], link: &AlignmentLink, strand: Strand) -> bool {
    let bpos = match strand {
        Strand::Forward => link.b_start,
        Strand::Reverse => link.b_end - 1,
    };
    found.iter().any(|m| m.covers(link.a_start, bpos))
}

/// Band filtering, chaining and verification of one sequence pair.
fn process_segment(
    ws: &mut SeedExtendWorkspace,
    seg: &[SeedPair],
    aset: &SequenceSet,
    bstrand: &SequenceSet,
    strand: Strand,
    params: &SeedExtendParams,
) -> Result<(Vec<VerifiedMatch>, SeedExtendStats)> {
    let mut stats = SeedExtendStats::default();
    let Some(first) = seg.first() else {
        return Ok((Vec::new(), stats));
    };
    let (aseqnum, bseqnum) = (first.aseqnum, first.bseqnum);
    let a = aset.seq(aseqnum as usize);
    let b = bstrand.seq(bseqnum as usize);
    let blen = b.len() as u32;
    let span = params.span() as u32;
    let min_coverage = params.filter.min_coverage;

    ws.clear();
    let hits = || seg.iter().map(|sp| (sp.apos, sp.bpos));
    ws.band_table.multi_update(hits(), span);
    for sp in seg {
        if ws.band_table.coverage(sp.apos, sp.bpos) >= min_coverage {
            ws.hits.push(BandHit {
                band: ws.band_table.band(sp.apos, sp.bpos),
                bpos: sp.bpos,
                apos: sp.apos,
            });
        }
    }
    ws.band_table.reset(hits());
    stats.promising_seeds = ws.hits.len();
    if ws.hits.is_empty() {
        return Ok((Vec::new(), stats));
    }

    ws.hits.sort_unstable();
    let mut region: Option<Region> = None;
    for hit in &ws.hits {
        if region.is_some_and(|r| r.accepts(hit, span)) {
            if let Some(r) = region.as_mut() {
                r.absorb(hit, span);
            }
        } else if let Some(done) = region.replace(Region::start(hit, span)) {
            done.add_to(&mut ws.chain_filter, strand, blen);
        }
    }
    if let Some(done) = region {
        done.add_to(&mut ws.chain_filter, strand, blen);
    }
    stats.links = ws.chain_filter.len();

    let chain = ws.chain_filter.evaluate(strand.is_forward());
    let limit = params.filter.max_chain_links.unwrap_or(usize::MAX);

    if params.only_seeds {
        let links: Vec<VerifiedMatch> = chain
            .indices
            .iter()
            .take(limit)
            .map(|&index| {
                let link = ws.chain_filter.link(index);
                VerifiedMatch {
                    aseqnum,
                    a_start: link.a_start,
                    a_end: link.a_end,
                    bseqnum,
                    b_start: link.b_start,
                    b_end: link.b_end,
                    strand,
                    distance: link.distance,
                }
            })
            .collect();
        stats.matches = links.len();
        return Ok((links, stats));
    }

    let mut found: Vec<VerifiedMatch> = Vec::new();
    for &index in chain.indices.iter().take(limit) {
        let link = ws.chain_filter.link(index);
        if start_covered(&found, link, strand) {
            continue;
        }

        let b_start = match strand {
            Strand::Forward => link.b_start,
            Strand::Reverse => blen - link.b_end,
        };
        let Some(ext) = verify_link(a, b, link.a_start as usize, b_start as usize, &params.verify)?
        else {
            continue;
        };

        let (b_start, b_end) = match strand {
            Strand::Forward => (ext.b_start as u32, ext.b_end as u32),
            Strand::Reverse => (blen - ext.b_end as u32, blen - ext.b_start as u32),
        };
        let m = VerifiedMatch {
            aseqnum,
            a_start: ext.a_start as u32,
            a_end: ext.a_end as u32,
            bseqnum,
            b_start,
            b_end,
            strand,
            distance: ext.distance as u32,
        };
        if !found.iter().any(|prev| prev.contains(&m)) {
            found.retain(|prev| !m.contains(prev));
            found.push(m);
        }
    }

    log::debug!(
        "segment ({}, {}) {}: {} promising seeds, {} links, chain of {}, {} matches",
        aseqnum,
        bseqnum,
        strand,
        stats.promising_seeds,
        stats.links,
        chain.len(),
        found.len()
    );
    stats.matches = found.len();
    Ok((found, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::encoding::reverse_complement;
    use crate::seed_opt::SeedExtendOpt;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_seq(rng: &mut StdRng, len: usize) -> Vec<u8> {
        (0..len).map(|_| rng.gen_range(0..4u8)).collect()
    }

    fn params_for(aset: &SequenceSet, bset: Option<&SequenceSet>) -> SeedExtendParams {
        let opt = SeedExtendOpt {
            seed_length: Some(12),
            weight: Some(12),
            ..SeedExtendOpt::default()
        };
        opt.resolve_defaults(aset, bset).unwrap()
    }

    #[test]
    fn test_region_merges_overlapping_seeds() {
        let mut filter = WeightedChainFilter::new();
        let h1 = BandHit { band: 3, bpos: 20, apos: 30 };
        let h2 = BandHit { band: 3, bpos: 25, apos: 35 };
        let h3 = BandHit { band: 3, bpos: 60, apos: 70 };
        let mut r = Region::start(&h1, 10);
        assert!(r.accepts(&h2, 10));
        r.absorb(&h2, 10);
        assert!(!r.accepts(&h3, 10));
        assert_eq!((r.a_start, r.a_end, r.b_start, r.b_end), (21, 36, 11, 26));
        assert_eq!(r.distance, 0);

        r.add_to(&mut filter, Strand::Reverse, 100);
        let link = filter.link(0);
        assert_eq!((link.b_start, link.b_end), (74, 89));
    }

    #[test]
    fn test_region_counts_diagonal_shifts() {
        let h1 = BandHit { band: 0, bpos: 20, apos: 30 };
        let h2 = BandHit { band: 0, bpos: 26, apos: 34 };
        let mut r = Region::start(&h1, 10);
        r.absorb(&h2, 10);
        assert_eq!(r.distance, 2);
    }

    #[test]
    fn test_link_skipped_when_start_inside_match() {
        let found = vec![VerifiedMatch {
            aseqnum: 0,
            a_start: 100,
            a_end: 300,
            bseqnum: 0,
            b_start: 400,
            b_end: 600,
            strand: Strand::Forward,
            distance: 0,
        }];
        // starts inside, runs past the end of the match
        let overhanging = AlignmentLink::new(250, 350, 550, 650, 0);
        assert!(start_covered(&found, &overhanging, Strand::Forward));
        // B start before the match, B end inside it
        let leading = AlignmentLink::new(150, 250, 350, 450, 0);
        assert!(!start_covered(&found, &leading, Strand::Forward));
        // reverse strand: the scan starts at the high B end of the link
        assert!(start_covered(&found, &leading, Strand::Reverse));
        assert!(!start_covered(&found, &overhanging, Strand::Reverse));
    }

    #[test]
    fn test_planted_repeat_forward() {
        let mut rng = StdRng::seed_from_u64(42);
        let core = random_seq(&mut rng, 300);
        let mut a = random_seq(&mut rng, 500);
        a.splice(100..100, core.iter().copied());
        let mut b = random_seq(&mut rng, 700);
        b.splice(250..250, core.iter().copied());

        let mut aset = SequenceSet::new();
        aset.push("a", a);
        let mut bset = SequenceSet::new();
        bset.push("b", b);

        let params = params_for(&aset, Some(&bset));
        let run = run_seed_extend(&aset, Some(&bset), &params).unwrap();
        let forward: Vec<_> = run
            .matches
            .iter()
            .filter(|m| m.strand == Strand::Forward && m.a_len() >= 250)
            .collect();
        assert_eq!(forward.len(), 1);
        // chunked extension may stop a few symbols short of the core ends
        let m = forward[0];
        assert!(m.a_start <= 110 && m.a_end >= 390, "{:?}", m);
        assert!((m.b_start as i64 - m.a_start as i64 - 150).abs() <= 16);
        assert!(m.identity() >= 80.0);
    }

    #[test]
    fn test_debug_lists_kept_on_request() {
        let mut rng = StdRng::seed_from_u64(44);
        let core = random_seq(&mut rng, 200);
        let mut a = random_seq(&mut rng, 300);
        a.splice(50..50, core.iter().copied());
        let mut b = random_seq(&mut rng, 300);
        b.splice(120..120, core.iter().copied());

        let mut aset = SequenceSet::new();
        aset.push("a", a);
        let mut bset = SequenceSet::new();
        bset.push("b", b);

        let mut params = params_for(&aset, Some(&bset));
        let run = run_seed_extend(&aset, Some(&bset), &params).unwrap();
        assert!(run.debug.is_empty());

        params.seeding.debug_kmer = true;
        params.seeding.debug_seedpair = true;
        let run = run_seed_extend(&aset, Some(&bset), &params).unwrap();
        let origins: Vec<_> = run.debug.kmers.iter().map(|(o, _)| *o).collect();
        assert_eq!(
            origins,
            vec![
                KmerListOrigin::A,
                KmerListOrigin::B(Strand::Forward),
                KmerListOrigin::B(Strand::Reverse)
            ]
        );
        let kmers: usize = run.debug.kmers.iter().map(|(_, l)| l.len()).sum();
        assert_eq!(kmers, run.stats.kmers);
        let strands: Vec<_> = run.debug.seed_pairs.iter().map(|(s, _)| *s).collect();
        assert_eq!(strands, vec![Strand::Forward, Strand::Reverse]);
        let pairs: usize = run.debug.seed_pairs.iter().map(|(_, l)| l.len()).sum();
        assert_eq!(pairs, run.stats.seed_pairs);
    }

    #[test]
    fn test_only_seeds_reports_chained_links() {
        let mut rng = StdRng::seed_from_u64(45);
        let core = random_seq(&mut rng, 300);
        let mut a = vec![0u8; 100];
        a.extend_from_slice(&core);
        a.extend(std::iter::repeat(0u8).take(100));
        let mut b = vec![1u8; 250];
        b.extend_from_slice(&core);
        b.extend(std::iter::repeat(1u8).take(150));

        let mut aset = SequenceSet::new();
        aset.push("a", a);
        let mut bset = SequenceSet::new();
        bset.push("b", b);

        let mut params = params_for(&aset, Some(&bset));
        params.reverse = false;
        params.only_seeds = true;
        let run = run_seed_extend(&aset, Some(&bset), &params).unwrap();
        assert_eq!(run.matches.len(), 1, "{:?}", run.matches);
        let link = &run.matches[0];
        // every window of the core seeds the same diagonal
        assert_eq!((link.a_start, link.a_end), (100, 400));
        assert_eq!((link.b_start, link.b_end), (250, 550));
        assert_eq!(link.distance, 0);
        assert_eq!(run.stats.matches, 1);
    }

    #[test]
    fn test_planted_reverse_complement() {
        let mut rng = StdRng::seed_from_u64(43);
        let core = random_seq(&mut rng, 300);
        let mut a = random_seq(&mut rng, 500);
        a.splice(100..100, core.iter().copied());
        let mut b = random_seq(&mut rng, 700);
        b.splice(250..250, reverse_complement(&core));

        let mut aset = SequenceSet::new();
        aset.push("a", a);
        let mut bset = SequenceSet::new();
        bset.push("b", b);

        let params = params_for(&aset, Some(&bset));
        let run = run_seed_extend(&aset, Some(&bset), &params).unwrap();
        let reverse: Vec<_> = run
            .matches
            .iter()
            .filter(|m| m.strand == Strand::Reverse && m.a_len() >= 250)
            .collect();
        assert_eq!(reverse.len(), 1);
        let m = reverse[0];
        assert!(m.a_start <= 110 && m.a_end >= 390, "{:?}", m);
        assert!(m.b_start <= 260 && m.b_end >= 540, "{:?}", m);
    }
}
