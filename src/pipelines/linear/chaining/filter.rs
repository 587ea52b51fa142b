//! Weighted chaining filter.
//!
//! Selects the best-scoring mutually ordered subset of the candidate links of
//! one sequence pair. This is a penalized longest-increasing-subsequence over
//! two axes: links are ordered by their axis-1 start, each link is credited
//! `weight × min(len0, len1)` minus what it shares with its predecessor, and
//! ties are broken by the smaller cumulative positional gap.
//!
//! Reverse-strand links are stored in forward axis-1 coordinates and mirrored
//! on the fly (`[s, e) → [qmax − e, qmax − s)`), so the stored links are never
//! modified and a buffer can be evaluated repeatedly in either direction.

use std::cmp::Ordering;

use super::types::{AlignmentLink, Chain, ChainStats};

#[derive(Debug, Default, Clone)]
pub struct WeightedChainFilter {
    links: Vec<AlignmentLink>,
    /// Evaluation order (permutation of insertion indices)
    order: Vec<usize>,
    /// Largest axis-1 end seen since the last reset
    qmax: u32,
}

/// Axis-1 range of a link as seen by the evaluation direction.
#[inline(always)]
fn axis1_view(link: &AlignmentLink, qmax: u32, forward: bool) -> (u32, u32) {
    if forward {
        (link.b_start, link.b_end)
    } else {
        (qmax - link.b_end, qmax - link.b_start)
    }
}

#[inline(always)]
fn overlap(s0: u32, e0: u32, s1: u32, e1: u32) -> u32 {
    e0.min(e1).saturating_sub(s0.max(s1))
}

impl WeightedChainFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            qmax: 0,
        }
    }

    /// Append a candidate link.
    pub fn add(&mut self, a_start: u32, a_end: u32, b_start: u32, b_end: u32, distance: u32) {
        self.qmax = self.qmax.max(b_end);
        self.links
            .push(AlignmentLink::new(a_start, a_end, b_start, b_end, distance));
    }

    /// Forget all links, keeping the allocation.
    pub fn reset(&mut self) {
        self.links.clear();
        self.order.clear();
        self.qmax = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.links.capacity()
    }

    #[inline]
    pub fn links(&self) -> &[AlignmentLink] {
        &self.links
    }

    #[inline]
    pub fn link(&self, index: usize) -> &AlignmentLink {
        &self.links[index]
    }

    /// Best chain as insertion indices in start-to-end order.
    pub fn evaluate(&mut self, forward: bool) -> Chain {
        let Some(best) = self.run_dp(forward) else {
            return Chain::default();
        };

        let mut indices = Vec::new();
        let mut cur = Some(best);
        while let Some(i) = cur {
            indices.push(i);
            cur = self.links[i].prev;
        }
        indices.reverse();

        let chain = Chain {
            indices,
            score: self.links[best].score,
            gap: self.links[best].gap,
        };
        log::debug!(
            "evaluate: {} links -> chain of {} (score {:.1}, gap {}, forward={})",
            self.links.len(),
            chain.len(),
            chain.score,
            chain.gap,
            forward
        );
        chain
    }

    /// Summed distance and aligned length along the best chain.
    pub fn evaluate_stats(&mut self, forward: bool) -> ChainStats {
        let Some(best) = self.run_dp(forward) else {
            return ChainStats::default();
        };

        let mut stats = ChainStats {
            score: self.links[best].score,
            ..ChainStats::default()
        };
        let mut cur = Some(best);
        while let Some(i) = cur {
            let link = &self.links[i];
            stats.links += 1;
            stats.distance += link.distance as u64;
            stats.aligned_len += link.aligned_len();
            cur = link.prev;
        }
        stats
    }

    /// Fill `score`/`gap`/`prev` of every link; returns the best end link.
    fn run_dp(&mut self, forward: bool) -> Option<usize> {
        if self.links.is_empty() {
            return None;
        }

        let links = &mut self.links;
        let qmax = self.qmax;

        self.order.clear();
        self.order.extend(0..links.len());
        self.order.sort_by(|&x, &y| {
            let (lx, ly) = (&links[x], &links[y]);
            let (sx, _) = axis1_view(lx, qmax, forward);
            let (sy, _) = axis1_view(ly, qmax, forward);
            sx.cmp(&sy)
                .then_with(|| {
                    let kx = lx.len1() as f64 * lx.weight;
                    let ky = ly.len1() as f64 * ly.weight;
                    ky.total_cmp(&kx)
                })
                .then_with(|| lx.a_start.cmp(&ly.a_start))
                .then_with(|| lx.a_end.cmp(&ly.a_end))
                .then_with(|| lx.b_start.cmp(&ly.b_start))
                .then_with(|| lx.b_end.cmp(&ly.b_end))
                .then_with(|| lx.distance.cmp(&ly.distance))
                .then_with(|| x.cmp(&y))
        });

        let mut best: Option<(usize, f64, u64)> = None;
        for (rank, &i) in self.order.iter().enumerate() {
            let (bs_i, be_i) = axis1_view(&links[i], qmax, forward);
            let (as_i, ae_i) = (links[i].a_start, links[i].a_end);
            let min_len = links[i].min_len() as f64;
            let weight = links[i].weight;

            let mut score = weight * min_len;
            let mut gap = 0u64;
            let mut prev = None;

            for &j in &self.order[..rank] {
                let lj = &links[j];
                let (bs_j, be_j) = axis1_view(lj, qmax, forward);
                let shared = overlap(as_i, ae_i, lj.a_start, lj.a_end)
                    .max(overlap(bs_i, be_i, bs_j, be_j)) as f64;
                let cand_score = lj.score + (min_len - shared) * weight;
                let cand_gap = lj.gap
                    + (as_i as i64 - lj.a_end as i64).unsigned_abs()
                    + (bs_i as i64 - be_j as i64).unsigned_abs();

                if cand_score > score || (cand_score == score && cand_gap < gap) {
                    score = cand_score;
                    gap = cand_gap;
                    prev = Some(j);
                }
            }

            let link = &mut links[i];
            link.score = score;
            link.gap = gap;
            link.prev = prev;

            let better = match best {
                None => true,
                Some((_, bscore, bgap)) => match score.total_cmp(&bscore) {
                    Ordering::Greater => true,
                    Ordering::Equal => gap < bgap,
                    Ordering::Less => false,
                },
            };
            if better {
                best = Some((i, score, gap));
            }
        }

        best.map(|(i, _, _)| i)
    }
}
