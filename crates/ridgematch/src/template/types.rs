//! Extractor-facing data types.

use crate::geom::IntPoint;
use nalgebra::Vector2;

/// Ridge feature class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MinutiaKind {
    Ending,
    Bifurcation,
}

/// One ridge ending or bifurcation.
///
/// `direction` is in radians, normalized to `[0, 2π)` by the producer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minutia {
    pub position: IntPoint,
    pub direction: f64,
    pub kind: MinutiaKind,
}

impl Minutia {
    #[inline]
    pub fn new(x: i32, y: i32, direction: f64, kind: MinutiaKind) -> Self {
        Self {
            position: Vector2::new(x, y),
            direction,
            kind,
        }
    }
}

/// Extractor output: image size plus minutiae in arbitrary order.
///
/// Contents are trusted; range checks belong to whoever produced them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTemplate {
    pub width: i32,
    pub height: i32,
    pub minutiae: Vec<Minutia>,
}

impl FeatureTemplate {
    pub fn new(width: i32, height: i32, minutiae: Vec<Minutia>) -> Self {
        Self {
            width,
            height,
            minutiae,
        }
    }
}
