//! Minutia-based fingerprint matching.
//!
//! A probe template is indexed once ([`Probe`]) and then compared against any
//! number of candidate templates, each comparison yielding a similarity score
//! calibrated against false match rates (0 = no evidence, 10 ≈ FMR 1/10,
//! 20 ≈ 1/100, 30 ≈ 1/1000, …).
//!
//! Pipeline
//! - `template`: extractor output → deterministic order + neighbor table.
//! - `edge`: edge shapes and the probe-side edge hash.
//! - `matcher`: root enumeration, greedy graph growth, scoring.
//!
//! API Policy
//! - The curated surface is [`api`]; everything else may change between
//!   versions.

pub mod api;
pub mod cfg;
pub mod edge;
pub mod geom;
pub mod matcher;
pub mod synth;
pub mod template;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{ConfigError, FmrThresholds, MatchCfg, ScoreWeights};
pub use matcher::{MatchExplanation, MatcherWorkspace, Probe, ScoreBreakdown};
pub use template::{FeatureTemplate, Minutia, MinutiaKind, SearchTemplate};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::MatchCfg;
    pub use crate::matcher::{MatcherWorkspace, Probe};
    pub use crate::template::{FeatureTemplate, Minutia, MinutiaKind, SearchTemplate};
}
