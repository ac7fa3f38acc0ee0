//! Integer plane geometry and circular angle arithmetic.
//!
//! Purpose
//! - Minutia positions are integer pixels (`IntPoint`), directions are radians
//!   on the circle `[0, 2π)`.
//! - Edge lengths and segment angles come from a precomputed polar table so
//!   the same pair of points always produces bit-identical edge shapes.
//!
//! Code cross-refs: `edge::EdgeShape`, `template::neighbors`.

pub mod angle;
mod polar;

pub use polar::polar;

use nalgebra::Vector2;

/// Integer pixel position or displacement.
pub type IntPoint = Vector2<i32>;

/// Squared Euclidean length of an integer vector.
#[inline]
pub fn length_sq(v: IntPoint) -> i32 {
    v.dot(&v)
}
