//! Synthetic minutia clouds (uniform placement + replay tokens).
//!
//! Purpose
//! - Reproducible stand-ins for extractor output, used by tests, benches and
//!   the CLI. Real fingerprints are not uniform; these clouds only exercise
//!   the geometry.
//!
//! Model
//! - Minutiae are placed uniformly inside the image minus a margin, rejecting
//!   positions closer than `min_spacing` to an existing one. Directions are
//!   uniform on `[0, 2π)`, kinds are Bernoulli(`bifurcation_ratio`).
//! - A second impression of the same finger is the cloud moved by a
//!   [`RigidMotion`] and perturbed by [`Jitter`].
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use std::f64::consts::TAU;
use std::fmt;

use nalgebra::{Point2, Rotation2, Vector2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::geom::{angle, length_sq};
use crate::template::{FeatureTemplate, Minutia, MinutiaKind};

/// Cloud sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct CloudCfg {
    pub width: i32,
    pub height: i32,
    pub count: usize,
    /// Keep-out band along the image border.
    pub margin: i32,
    /// Minimum distance between any two minutiae.
    pub min_spacing: i32,
    /// Probability that a minutia is a bifurcation. Clamped to [0, 1].
    pub bifurcation_ratio: f64,
    /// Rejection-sampling budget for the whole cloud.
    pub max_attempts: usize,
}

impl Default for CloudCfg {
    fn default() -> Self {
        Self {
            width: 400,
            height: 500,
            count: 40,
            margin: 20,
            min_spacing: 12,
            bifurcation_ratio: 0.5,
            max_attempts: 20_000,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    /// Token for the next draw in the same stream.
    #[inline]
    pub fn next(self) -> Self {
        Self {
            seed: self.seed,
            index: self.index.wrapping_add(1),
        }
    }

    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Error type of the synthetic generators.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthError {
    InvalidParams { reason: String },
    Crowded { placed: usize, requested: usize },
}

impl SynthError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams { reason } => write!(f, "invalid synth params: {reason}"),
            Self::Crowded { placed, requested } => write!(
                f,
                "could only place {placed} of {requested} minutiae at the requested spacing"
            ),
        }
    }
}

impl std::error::Error for SynthError {}

/// Draw a random minutia cloud.
pub fn draw_template(cfg: CloudCfg, tok: ReplayToken) -> Result<FeatureTemplate, SynthError> {
    if cfg.width <= 2 * cfg.margin || cfg.height <= 2 * cfg.margin {
        return Err(SynthError::invalid("image must be larger than twice the margin"));
    }
    if cfg.min_spacing < 0 {
        return Err(SynthError::invalid("min_spacing must be non-negative"));
    }
    let mut rng = tok.to_std_rng();
    let ratio = cfg.bifurcation_ratio.clamp(0.0, 1.0);
    let spacing_sq = cfg.min_spacing * cfg.min_spacing;
    let mut minutiae: Vec<Minutia> = Vec::with_capacity(cfg.count);
    let mut attempts = 0;
    while minutiae.len() < cfg.count {
        if attempts >= cfg.max_attempts {
            return Err(SynthError::Crowded {
                placed: minutiae.len(),
                requested: cfg.count,
            });
        }
        attempts += 1;
        let x = rng.gen_range(cfg.margin..cfg.width - cfg.margin);
        let y = rng.gen_range(cfg.margin..cfg.height - cfg.margin);
        let direction = rng.gen::<f64>() * TAU;
        let kind = if rng.gen_bool(ratio) {
            MinutiaKind::Bifurcation
        } else {
            MinutiaKind::Ending
        };
        let candidate = Minutia::new(x, y, angle::normalize(direction), kind);
        if minutiae
            .iter()
            .any(|m| length_sq(m.position - candidate.position) < spacing_sq)
        {
            continue;
        }
        minutiae.push(candidate);
    }
    Ok(FeatureTemplate::new(cfg.width, cfg.height, minutiae))
}

/// Rotation about `center` followed by a shift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidMotion {
    pub rotation: f64,
    pub center: Vector2<f64>,
    pub shift: Vector2<f64>,
}

impl RigidMotion {
    /// Rotate about the image center, then shift.
    pub fn about_image_center(
        template: &FeatureTemplate,
        rotation: f64,
        shift: Vector2<f64>,
    ) -> Self {
        Self {
            rotation,
            center: Vector2::new(template.width as f64 / 2.0, template.height as f64 / 2.0),
            shift,
        }
    }

    /// Draw a motion with `|rotation| <= max_rotation` and `|shift_i| <= max_shift`.
    pub fn random(
        template: &FeatureTemplate,
        max_rotation: f64,
        max_shift: f64,
        tok: ReplayToken,
    ) -> Self {
        let mut rng = tok.to_std_rng();
        let rotation = (rng.gen::<f64>() * 2.0 - 1.0) * max_rotation;
        let shift = Vector2::new(
            (rng.gen::<f64>() * 2.0 - 1.0) * max_shift,
            (rng.gen::<f64>() * 2.0 - 1.0) * max_shift,
        );
        Self::about_image_center(template, rotation, shift)
    }

    /// Move every minutia; positions are rounded back to the pixel grid.
    pub fn apply(&self, template: &FeatureTemplate) -> FeatureTemplate {
        let rot = Rotation2::new(self.rotation);
        let minutiae = template
            .minutiae
            .iter()
            .map(|m| {
                let p = Point2::new(m.position.x as f64, m.position.y as f64);
                let moved = rot * (p - self.center) + self.center + self.shift;
                Minutia::new(
                    moved.x.round() as i32,
                    moved.y.round() as i32,
                    angle::normalize(m.direction + self.rotation),
                    m.kind,
                )
            })
            .collect();
        FeatureTemplate::new(template.width, template.height, minutiae)
    }
}

/// Bounded uniform noise on positions (pixels per axis) and directions (radians).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Jitter {
    pub position: f64,
    pub direction: f64,
}

impl Jitter {
    pub fn apply(&self, template: &FeatureTemplate, tok: ReplayToken) -> FeatureTemplate {
        let mut rng = tok.to_std_rng();
        let mut noise = |amplitude: f64| (rng.gen::<f64>() * 2.0 - 1.0) * amplitude;
        let minutiae = template
            .minutiae
            .iter()
            .map(|m| {
                let dx = noise(self.position).round() as i32;
                let dy = noise(self.position).round() as i32;
                let da = noise(self.direction);
                Minutia::new(
                    m.position.x + dx,
                    m.position.y + dy,
                    angle::normalize(m.direction + da),
                    m.kind,
                )
            })
            .collect();
        FeatureTemplate::new(template.width, template.height, minutiae)
    }
}

/// Same minutiae, different storage order.
pub fn shuffle(template: &FeatureTemplate, tok: ReplayToken) -> FeatureTemplate {
    let mut out = template.clone();
    out.minutiae.shuffle(&mut tok.to_std_rng());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_replay() {
        let tok = ReplayToken { seed: 42, index: 3 };
        let a = draw_template(CloudCfg::default(), tok).unwrap();
        let b = draw_template(CloudCfg::default(), tok).unwrap();
        assert_eq!(a, b);
        let c = draw_template(CloudCfg::default(), tok.next()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn draws_respect_bounds_and_spacing() {
        let cfg = CloudCfg::default();
        let t = draw_template(cfg, ReplayToken { seed: 1, index: 0 }).unwrap();
        assert_eq!(t.minutiae.len(), cfg.count);
        for (i, a) in t.minutiae.iter().enumerate() {
            assert!((cfg.margin..cfg.width - cfg.margin).contains(&a.position.x));
            assert!((cfg.margin..cfg.height - cfg.margin).contains(&a.position.y));
            assert!((0.0..TAU).contains(&a.direction));
            for b in &t.minutiae[i + 1..] {
                assert!(length_sq(a.position - b.position) >= cfg.min_spacing.pow(2));
            }
        }
    }

    #[test]
    fn crowded_cloud_is_reported() {
        let cfg = CloudCfg {
            width: 60,
            height: 60,
            margin: 10,
            min_spacing: 30,
            count: 50,
            max_attempts: 500,
            ..CloudCfg::default()
        };
        let err = draw_template(cfg, ReplayToken { seed: 0, index: 0 }).unwrap_err();
        assert!(matches!(err, SynthError::Crowded { requested: 50, .. }));
        let bad = CloudCfg {
            margin: 300,
            ..CloudCfg::default()
        };
        assert!(matches!(
            draw_template(bad, ReplayToken { seed: 0, index: 0 }),
            Err(SynthError::InvalidParams { .. })
        ));
    }

    #[test]
    fn rigid_motion_preserves_distances_up_to_rounding() {
        let t = draw_template(CloudCfg::default(), ReplayToken { seed: 8, index: 0 }).unwrap();
        let moved = RigidMotion::about_image_center(&t, 0.4, Vector2::new(12.0, -7.0)).apply(&t);
        for i in 0..t.minutiae.len() {
            for j in i + 1..t.minutiae.len() {
                let d0 = (length_sq(t.minutiae[i].position - t.minutiae[j].position) as f64).sqrt();
                let d1 = (length_sq(moved.minutiae[i].position - moved.minutiae[j].position)
                    as f64)
                    .sqrt();
                assert!((d0 - d1).abs() <= 1.5);
            }
            let turn = angle::difference(moved.minutiae[i].direction, t.minutiae[i].direction);
            assert!((turn - 0.4).abs() < 1e-9);
        }
    }
}
