//! Matcher configuration: tolerances, work caps, scoring weights and the FMR
//! calibration table.
//!
//! Policy
//! - One flat `Copy` struct, captured by value when a probe is built. Nothing
//!   reads configuration from globals, so two probes with different settings
//!   can coexist in one process.
//! - Defaults are the calibrated values. The shaping table in particular is
//!   tied to the growth heuristic in `matcher::spider`; changing either one
//!   without recalibrating moves the meaning of every score.

use std::fmt;

use crate::edge::Tolerance;

/// Bits of resolution of the polar lookup table (per axis).
pub(crate) const POLAR_TABLE_BITS: u32 = 8;
/// Multiplier of the minutia shuffle key. Fixed so the ordering is reproducible.
pub(crate) const SHUFFLE_PRIME: i32 = 1_610_612_741;

/// Weights of the individual score factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
    pub minutia: f64,
    pub minutia_fraction: f64,
    pub minutia_type: f64,
    pub supported_minutia: f64,
    pub edge: f64,
    pub distance_accuracy: f64,
    pub angle_accuracy: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            minutia: 0.032,
            minutia_fraction: 8.98,
            minutia_type: 0.629,
            supported_minutia: 0.193,
            edge: 0.265,
            distance_accuracy: 9.9,
            angle_accuracy: 2.79,
        }
    }
}

impl ScoreWeights {
    fn as_array(&self) -> [f64; 7] {
        [
            self.minutia,
            self.minutia_fraction,
            self.minutia_type,
            self.supported_minutia,
            self.edge,
            self.distance_accuracy,
            self.angle_accuracy,
        ]
    }
}

/// Raw-score thresholds measured at fixed false match rates.
///
/// `fmr_max` is the highest raw score observed at any FMR worth reporting;
/// `fmr_n` is the raw score where FMR drops to `1/n`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FmrThresholds {
    pub fmr_max: f64,
    pub fmr_2: f64,
    pub fmr_10: f64,
    pub fmr_100: f64,
    pub fmr_1000: f64,
    pub fmr_10_000: f64,
    pub fmr_100_000: f64,
}

impl Default for FmrThresholds {
    fn default() -> Self {
        Self {
            fmr_max: 8.48,
            fmr_2: 11.12,
            fmr_10: 12.95,
            fmr_100: 14.15,
            fmr_1000: 18.22,
            fmr_10_000: 22.39,
            fmr_100_000: 27.24,
        }
    }
}

impl FmrThresholds {
    pub(crate) fn as_array(&self) -> [f64; 7] {
        [
            self.fmr_max,
            self.fmr_2,
            self.fmr_10,
            self.fmr_100,
            self.fmr_1000,
            self.fmr_10_000,
            self.fmr_100_000,
        ]
    }
}

/// Complete matcher configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchCfg {
    /// Largest accepted edge length difference in pixels.
    pub max_distance_error: i32,
    /// Largest accepted edge angle difference in radians.
    pub max_angle_error: f64,
    /// Cap on the neighbor star of every minutia.
    pub edge_table_neighbors: usize,
    /// Neighbor radius in pixels, used when a template has too few minutiae
    /// for the k-nearest cutoff to apply.
    pub edge_table_range: i32,
    /// Root edges shorter than this are only tried in the fallback pass.
    pub min_root_edge_length: i32,
    pub max_root_edge_lookups: usize,
    pub max_tried_roots: usize,
    /// A pair counts as supported once it has at least this many supporting edges.
    pub min_supporting_edges: u32,
    pub distance_error_flatness: f64,
    pub angle_error_flatness: f64,
    pub weights: ScoreWeights,
    pub fmr: FmrThresholds,
}

impl Default for MatchCfg {
    fn default() -> Self {
        Self {
            max_distance_error: 13,
            max_angle_error: 10f64.to_radians(),
            edge_table_neighbors: 9,
            edge_table_range: 490,
            min_root_edge_length: 58,
            max_root_edge_lookups: 1633,
            max_tried_roots: 70,
            min_supporting_edges: 1,
            distance_error_flatness: 0.69,
            angle_error_flatness: 0.27,
            weights: ScoreWeights::default(),
            fmr: FmrThresholds::default(),
        }
    }
}

impl MatchCfg {
    /// Edge-shape tolerance derived from the error limits.
    #[inline]
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.max_distance_error, self.max_angle_error)
    }

    /// Check that the configuration describes a usable matcher.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_distance_error <= 0 {
            return Err(ConfigError::invalid("max_distance_error must be positive"));
        }
        if !(self.max_angle_error > 0.0 && self.max_angle_error < std::f64::consts::PI) {
            return Err(ConfigError::invalid("max_angle_error must lie in (0, π)"));
        }
        if self.edge_table_neighbors == 0 {
            return Err(ConfigError::invalid("edge_table_neighbors must be positive"));
        }
        if self.edge_table_range <= 0 {
            return Err(ConfigError::invalid("edge_table_range must be positive"));
        }
        if self.max_root_edge_lookups == 0 || self.max_tried_roots == 0 {
            return Err(ConfigError::invalid("root caps must be positive"));
        }
        for (name, v) in [
            ("distance_error_flatness", self.distance_error_flatness),
            ("angle_error_flatness", self.angle_error_flatness),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::invalid(format!("{name} must lie in [0, 1]")));
            }
        }
        if self.weights.as_array().iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::invalid("score weights must be finite"));
        }
        let t = self.fmr.as_array();
        if t.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Calibration {
                reason: "thresholds must be finite".into(),
            });
        }
        if t.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Calibration {
                reason: "thresholds must increase strictly".into(),
            });
        }
        Ok(())
    }
}

/// Configuration rejected by [`MatchCfg::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidParam { reason: String },
    Calibration { reason: String },
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParam { reason } => write!(f, "invalid matcher parameter: {reason}"),
            Self::Calibration { reason } => write!(f, "invalid FMR calibration: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(MatchCfg::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_tolerances() {
        let cfg = MatchCfg {
            max_distance_error: 0,
            ..MatchCfg::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidParam { .. })
        ));
        let cfg = MatchCfg {
            max_angle_error: 4.0,
            ..MatchCfg::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let mut cfg = MatchCfg::default();
        cfg.fmr.fmr_1000 = cfg.fmr.fmr_100;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Calibration { .. }));
        assert!(err.to_string().contains("increase"));
    }
}
