//! Angle arithmetic on the circle `[0, 2π)`.
//!
//! All functions expect inputs already normalized to `[0, 2π)` (except
//! [`normalize`]) and return normalized results.

use std::f64::consts::{PI, TAU};

/// Wrap any finite angle into `[0, 2π)`.
#[inline]
pub fn normalize(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid may round up to TAU for tiny negative inputs.
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Counter-clockwise rotation from `b` to `a`, in `[0, 2π)`.
#[inline]
pub fn difference(a: f64, b: f64) -> f64 {
    let angle = a - b;
    if angle >= 0.0 {
        angle
    } else {
        angle + TAU
    }
}

/// Sum of two angles, wrapped.
#[inline]
pub fn add(a: f64, b: f64) -> f64 {
    let angle = a + b;
    if angle < TAU {
        angle
    } else {
        angle - TAU
    }
}

/// Shortest circular distance, in `[0, π]`.
#[inline]
pub fn distance(a: f64, b: f64) -> f64 {
    let delta = (a - b).abs();
    if delta <= PI {
        delta
    } else {
        TAU - delta
    }
}

/// The angle pointing the other way.
#[inline]
pub fn opposite(angle: f64) -> f64 {
    if angle < PI {
        angle + PI
    } else {
        angle - PI
    }
}

/// Mirror image across the x axis, i.e. `2π - angle` wrapped.
#[inline]
pub fn complementary(angle: f64) -> f64 {
    let complement = TAU - angle;
    if complement < TAU {
        complement
    } else {
        complement - TAU
    }
}
