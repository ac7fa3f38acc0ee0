//! Matcher orchestration: roots → growth → scoring → best root.
//!
//! A [`Probe`] is built once and shared read-only; every matching thread
//! brings its own [`MatcherWorkspace`] (explicitly, or implicitly through a
//! thread-local slot). Workspaces are reset between matches and thrown away,
//! not reused, if a match did not finish.

use std::cell::RefCell;

use crate::cfg::{ConfigError, MatchCfg};
use crate::edge::EdgeHash;
use crate::template::{FeatureTemplate, SearchTemplate};

use super::graph::PairingGraph;
use super::pool::PairPool;
use super::roots::{RootList, RootStats};
use super::scoring::ScoreBreakdown;
use super::spider::EdgeSpider;
use super::types::MinutiaPair;

/// Probe-side matching index: search template, edge hash and configuration.
///
/// Immutable after construction and `Sync`, so many threads can match
/// candidates against one probe at the same time.
#[derive(Clone, Debug)]
pub struct Probe {
    template: SearchTemplate,
    hash: EdgeHash,
    cfg: MatchCfg,
}

/// Best pairing of one match, regrown with supporting edges recorded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchExplanation {
    pub score: ScoreBreakdown,
    /// Index of the winning root among the enumerated roots.
    pub root: usize,
    pub roots: RootStats,
    /// Accepted pairs in growth order (index 0 is the root).
    pub pairs: Vec<MinutiaPair>,
    /// Edges that confirmed already accepted pairs.
    pub supporting: Vec<MinutiaPair>,
}

impl Probe {
    /// Build the probe index from extractor output.
    pub fn new(features: &FeatureTemplate, cfg: MatchCfg) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::index(SearchTemplate::new(features, &cfg), cfg))
    }

    /// Build with [`MatchCfg::default`].
    pub fn with_defaults(features: &FeatureTemplate) -> Self {
        let cfg = MatchCfg::default();
        Self::index(SearchTemplate::new(features, &cfg), cfg)
    }

    /// Wrap an existing search template. It must have been built with `cfg`.
    pub fn from_template(template: SearchTemplate, cfg: MatchCfg) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::index(template, cfg))
    }

    fn index(template: SearchTemplate, cfg: MatchCfg) -> Self {
        let hash = EdgeHash::build(&template, cfg.tolerance());
        tracing::debug!(minutiae = template.len(), bins = hash.stats().bins, "probe ready");
        Self {
            template,
            hash,
            cfg,
        }
    }

    #[inline]
    pub fn template(&self) -> &SearchTemplate {
        &self.template
    }

    #[inline]
    pub fn hash(&self) -> &EdgeHash {
        &self.hash
    }

    #[inline]
    pub fn cfg(&self) -> &MatchCfg {
        &self.cfg
    }

    /// Candidate template built with this probe's configuration.
    pub fn candidate(&self, features: &FeatureTemplate) -> SearchTemplate {
        SearchTemplate::new(features, &self.cfg)
    }

    /// Similarity score against `candidate`, using this thread's workspace.
    pub fn matches(&self, candidate: &SearchTemplate) -> f64 {
        with_thread_workspace(|ws| ws.run(self, candidate))
    }

    /// Similarity score against `candidate`, using a caller-owned workspace.
    pub fn match_with(&self, ws: &mut MatcherWorkspace, candidate: &SearchTemplate) -> f64 {
        ws.run(self, candidate)
    }

    /// Score breakdown and pairs of the best root. `None` when no root exists.
    pub fn explain(&self, candidate: &SearchTemplate) -> Option<MatchExplanation> {
        with_thread_workspace(|ws| ws.explain(self, candidate))
    }

    /// 1:N search. Returns the best candidate index and score; ties go to the
    /// lowest index. `None` for an empty gallery.
    pub fn identify(&self, candidates: &[SearchTemplate]) -> Option<(usize, f64)> {
        with_thread_workspace(|ws| {
            let mut best: Option<(usize, f64)> = None;
            for (i, candidate) in candidates.iter().enumerate() {
                let score = ws.run(self, candidate);
                if best.map_or(true, |(_, high)| score > high) {
                    best = Some((i, score));
                }
            }
            best
        })
    }
}

/// Mutable scratch state of one matching thread.
///
/// Holds the pair arena, pairing graph, root list and growth frontier. A
/// match leaves it clean (no live pairs, empty tables). If a match is
/// interrupted by a panic the workspace is marked in flight; the next match
/// replaces it wholesale instead of trusting its free list.
#[derive(Debug, Default)]
pub struct MatcherWorkspace {
    pool: PairPool,
    graph: PairingGraph,
    roots: RootList,
    spider: EdgeSpider,
    in_flight: bool,
}

impl MatcherWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throw away all state, including warmed-up buffers.
    pub fn discard(&mut self) {
        *self = Self::default();
    }

    /// No pair is handed out and no table entry is set.
    pub fn is_clean(&self) -> bool {
        !self.in_flight
            && self.pool.live() == 0
            && self.graph.is_empty()
            && self.roots.is_empty()
            && self.graph.is_consistent(&self.pool)
    }

    fn begin(&mut self, probe: &Probe, candidate: &SearchTemplate) {
        if self.in_flight {
            tracing::warn!("matcher workspace left mid-match; rebuilding");
            self.discard();
        }
        self.in_flight = true;
        self.graph.reserve(probe.template.len(), candidate.len());
        self.graph.support_enabled = false;
    }

    fn finish(&mut self) {
        self.roots.discard(&mut self.pool);
        self.in_flight = false;
    }

    /// Enumerate roots, grow and score each, keep the best by shaped score.
    fn search(
        &mut self,
        probe: &Probe,
        candidate: &SearchTemplate,
    ) -> (RootStats, Option<(usize, f64)>) {
        let stats = self
            .roots
            .enumerate(&mut self.pool, &probe.hash, candidate, &probe.cfg);
        let mut best: Option<(usize, f64)> = None;
        for (i, &root) in self.roots.pairs().iter().enumerate() {
            self.spider.crawl(
                probe.template.edges(),
                candidate.edges(),
                &mut self.graph,
                &mut self.pool,
                root,
                probe.cfg.tolerance(),
            );
            let score = ScoreBreakdown::compute(
                &probe.template,
                candidate,
                &self.graph,
                &self.pool,
                &probe.cfg,
            )
            .shaped_score;
            if best.map_or(true, |(_, high)| score > high) {
                best = Some((i, score));
            }
            self.graph.clear(&mut self.pool);
        }
        tracing::trace!(
            roots = self.roots.len(),
            lookups = stats.lookups,
            tried = stats.tried,
            best = ?best,
            "match searched"
        );
        (stats, best)
    }

    fn run(&mut self, probe: &Probe, candidate: &SearchTemplate) -> f64 {
        self.begin(probe, candidate);
        let (_, best) = self.search(probe, candidate);
        self.finish();
        best.map_or(0.0, |(_, score)| score)
    }

    fn explain(
        &mut self,
        probe: &Probe,
        candidate: &SearchTemplate,
    ) -> Option<MatchExplanation> {
        self.begin(probe, candidate);
        let (stats, best) = self.search(probe, candidate);
        let explanation = best.map(|(root, _)| {
            self.graph.support_enabled = true;
            self.spider.crawl(
                probe.template.edges(),
                candidate.edges(),
                &mut self.graph,
                &mut self.pool,
                self.roots.pairs()[root],
                probe.cfg.tolerance(),
            );
            let score = ScoreBreakdown::compute(
                &probe.template,
                candidate,
                &self.graph,
                &self.pool,
                &probe.cfg,
            );
            let pairs = self.graph.tree().iter().map(|&id| self.pool[id]).collect();
            let supporting = self
                .graph
                .supporting()
                .iter()
                .map(|&id| self.pool[id])
                .collect();
            self.graph.clear(&mut self.pool);
            self.graph.support_enabled = false;
            MatchExplanation {
                score,
                root,
                roots: stats,
                pairs,
                supporting,
            }
        });
        self.finish();
        explanation
    }
}

thread_local! {
    static WORKSPACE: RefCell<Option<MatcherWorkspace>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's workspace.
///
/// The workspace is moved out of its slot for the duration of `f` and only
/// put back when `f` returns, so a panic drops it instead of leaving a
/// half-updated one behind for the next call.
fn with_thread_workspace<R>(f: impl FnOnce(&mut MatcherWorkspace) -> R) -> R {
    let mut ws = WORKSPACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_default();
    let out = f(&mut ws);
    WORKSPACE.with(|slot| *slot.borrow_mut() = Some(ws));
    out
}
