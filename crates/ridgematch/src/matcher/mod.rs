//! Minutia matcher: root enumeration, pairing-graph growth and scoring.
//!
//! Layout
//! - `types.rs`: `MinutiaPair` records and `PairId` handles.
//! - `pool.rs`: free-list arena owning every pair record.
//! - `graph.rs`: `PairingGraph`, the accepted pairs with O(1) conflict lookup.
//! - `roots.rs`: seed pairs from candidate edges probed against the edge hash.
//! - `spider.rs`: greedy growth of one root along matching neighbor edges.
//! - `scoring.rs`: multi-factor raw score and FMR shaping.
//! - `engine.rs`: `Probe`, `MatcherWorkspace` and the match loop.
//!
//! All cross-references between pairs are `PairId`s into the arena owned by
//! the workspace, so a workspace can be reset in O(pairs touched).

mod engine;
mod graph;
mod pool;
mod roots;
mod scoring;
mod spider;
mod types;

pub use engine::{MatchExplanation, MatcherWorkspace, Probe};
pub use graph::PairingGraph;
pub use pool::PairPool;
pub use roots::{RootList, RootStats};
pub use scoring::{shape, ScoreBreakdown};
pub use spider::EdgeSpider;
pub use types::{MinutiaPair, PairId};

#[cfg(test)]
mod tests;
