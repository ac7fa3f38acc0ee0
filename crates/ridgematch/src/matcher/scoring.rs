//! Score of a grown pairing and its FMR-calibrated shaping.
//!
//! The raw score is a weighted sum of evidence counts (pairs, fractions,
//! supporting edges, type agreement) and of edge accuracy relative to the
//! worst accepted error. Shaping maps it piecewise-linearly onto a scale where
//! each band corresponds to one decade of false match rate.

use crate::cfg::{FmrThresholds, MatchCfg};
use crate::edge::EdgeShape;
use crate::geom::angle;
use crate::template::SearchTemplate;

use super::graph::PairingGraph;
use super::pool::PairPool;

/// Every factor of the score, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub minutia_count: usize,
    pub minutia_score: f64,
    pub minutia_fraction_in_probe: f64,
    pub minutia_fraction_in_candidate: f64,
    pub minutia_fraction: f64,
    pub minutia_fraction_score: f64,
    pub supporting_edge_sum: u32,
    pub edge_count: u32,
    pub edge_score: f64,
    pub supported_minutia_count: usize,
    pub supported_minutia_score: f64,
    pub minutia_type_hits: usize,
    pub minutia_type_score: f64,
    pub distance_error_sum: i32,
    pub distance_accuracy_sum: i32,
    pub distance_accuracy_score: f64,
    pub angle_error_sum: f64,
    pub angle_accuracy_sum: f64,
    pub angle_accuracy_score: f64,
    pub total_score: f64,
    pub shaped_score: f64,
}

#[inline]
fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl ScoreBreakdown {
    /// Score the pairing currently held by `graph`.
    pub fn compute(
        probe: &SearchTemplate,
        candidate: &SearchTemplate,
        graph: &PairingGraph,
        pool: &PairPool,
        cfg: &MatchCfg,
    ) -> Self {
        let w = &cfg.weights;
        let pminutiae = probe.minutiae();
        let cminutiae = candidate.minutiae();
        let count = graph.count();
        let mut s = Self {
            minutia_count: count,
            minutia_score: w.minutia * count as f64,
            minutia_fraction_in_probe: fraction(count, pminutiae.len()),
            minutia_fraction_in_candidate: fraction(count, cminutiae.len()),
            ..Self::default()
        };
        s.minutia_fraction = 0.5 * (s.minutia_fraction_in_probe + s.minutia_fraction_in_candidate);
        s.minutia_fraction_score = w.minutia_fraction * s.minutia_fraction;

        for &id in graph.tree() {
            let pair = &pool[id];
            s.supporting_edge_sum += pair.supporting_edges;
            if pair.supporting_edges >= cfg.min_supporting_edges {
                s.supported_minutia_count += 1;
            }
            if pminutiae[pair.probe].kind == cminutiae[pair.candidate].kind {
                s.minutia_type_hits += 1;
            }
        }
        s.edge_count = count as u32 + s.supporting_edge_sum;
        s.edge_score = w.edge * s.edge_count as f64;
        s.supported_minutia_score = w.supported_minutia * s.supported_minutia_count as f64;
        s.minutia_type_score = w.minutia_type * s.minutia_type_hits as f64;

        // Errors below the flatness radius all count the same.
        let inner_distance =
            (cfg.distance_error_flatness * cfg.max_distance_error as f64).round() as i32;
        let inner_angle = cfg.angle_error_flatness * cfg.max_angle_error;
        for &id in graph.tree().iter().skip(1) {
            let pair = &pool[id];
            let pedge = EdgeShape::new(&pminutiae[pair.probe_ref], &pminutiae[pair.probe]);
            let cedge = EdgeShape::new(&cminutiae[pair.candidate_ref], &cminutiae[pair.candidate]);
            s.distance_error_sum += inner_distance.max((pedge.length - cedge.length).abs());
            s.angle_error_sum +=
                inner_angle.max(angle::distance(pedge.reference_angle, cedge.reference_angle));
            s.angle_error_sum +=
                inner_angle.max(angle::distance(pedge.neighbor_angle, cedge.neighbor_angle));
        }
        let grown = count.saturating_sub(1);
        let distance_potential = cfg.max_distance_error * grown as i32;
        s.distance_accuracy_sum = distance_potential - s.distance_error_sum;
        if distance_potential > 0 {
            s.distance_accuracy_score = w.distance_accuracy
                * (s.distance_accuracy_sum as f64 / distance_potential as f64);
        }
        let angle_potential = cfg.max_angle_error * grown as f64 * 2.0;
        s.angle_accuracy_sum = angle_potential - s.angle_error_sum;
        if angle_potential > 0.0 {
            s.angle_accuracy_score = w.angle_accuracy * (s.angle_accuracy_sum / angle_potential);
        }

        s.total_score = s.minutia_score
            + s.minutia_fraction_score
            + s.supported_minutia_score
            + s.edge_score
            + s.minutia_type_score
            + s.distance_accuracy_score
            + s.angle_accuracy_score;
        s.shaped_score = shape(s.total_score, &cfg.fmr);
        s
    }
}

/// Map a raw score onto the FMR-calibrated scale.
///
/// | raw                  | shaped      |
/// |----------------------|-------------|
/// | `< fmr_max`          | 0           |
/// | `fmr_max .. fmr_2`   | 0 → 3       |
/// | `fmr_2 .. fmr_10`    | 3 → 10      |
/// | `fmr_10 .. fmr_100`  | 10 → 20     |
/// | `fmr_100 .. fmr_1000`| 20 → 30     |
/// | `.. fmr_10_000`      | 30 → 40     |
/// | `.. fmr_100_000`     | 40 → 50     |
/// | above                | 50 + 30 per `fmr_100_000 - fmr_100` |
pub fn shape(raw: f64, t: &FmrThresholds) -> f64 {
    let interpolate = |min: f64, max: f64, start: f64, length: f64| {
        (raw - min) / (max - min) * length + start
    };
    if raw < t.fmr_max {
        return 0.0;
    }
    if raw < t.fmr_2 {
        return interpolate(t.fmr_max, t.fmr_2, 0.0, 3.0);
    }
    if raw < t.fmr_10 {
        return interpolate(t.fmr_2, t.fmr_10, 3.0, 7.0);
    }
    if raw < t.fmr_100 {
        return interpolate(t.fmr_10, t.fmr_100, 10.0, 10.0);
    }
    if raw < t.fmr_1000 {
        return interpolate(t.fmr_100, t.fmr_1000, 20.0, 10.0);
    }
    if raw < t.fmr_10_000 {
        return interpolate(t.fmr_1000, t.fmr_10_000, 30.0, 10.0);
    }
    if raw < t.fmr_100_000 {
        return interpolate(t.fmr_10_000, t.fmr_100_000, 40.0, 10.0);
    }
    (raw - t.fmr_100_000) / (t.fmr_100_000 - t.fmr_100) * 30.0 + 50.0
}
