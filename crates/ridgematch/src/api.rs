//! Curated API.
//!
//! - Build a [`Probe`] once per probe template; it is `Sync`.
//! - Build one [`SearchTemplate`] per candidate with [`Probe::candidate`] (or
//!   [`SearchTemplate::new`] with the same configuration).
//! - Score with [`Probe::matches`], [`Probe::match_with`] or
//!   [`Probe::identify`]; diagnose with [`Probe::explain`].

// Configuration
pub use crate::cfg::{ConfigError, FmrThresholds, MatchCfg, ScoreWeights};
// Templates
pub use crate::template::{FeatureTemplate, Minutia, MinutiaKind, SearchTemplate};
// Matching
pub use crate::matcher::{
    shape as shape_score, MatchExplanation, MatcherWorkspace, MinutiaPair, Probe, RootStats,
    ScoreBreakdown,
};
// Synthetic inputs
pub use crate::synth::{
    draw_template, shuffle as shuffle_template, CloudCfg, Jitter, ReplayToken, RigidMotion,
    SynthError,
};
