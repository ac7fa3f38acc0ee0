//! Rotation/translation-invariant edge descriptor and its tolerance predicate.

use crate::geom::{angle, polar};
use crate::template::Minutia;

/// Shape of the directed edge `reference → neighbor`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeShape {
    /// Rounded pixel length.
    pub length: i32,
    /// Reference direction relative to the segment angle.
    pub reference_angle: f64,
    /// Neighbor direction relative to the opposite segment angle.
    pub neighbor_angle: f64,
}

impl EdgeShape {
    /// Measure the edge between two minutiae.
    ///
    /// The neighbor angle is taken against the reversed segment, so the edge
    /// seen from the other end is `(length, neighbor_angle, reference_angle)`.
    pub fn new(reference: &Minutia, neighbor: &Minutia) -> Self {
        let (length, segment) = polar(neighbor.position - reference.position);
        Self {
            length,
            reference_angle: angle::difference(reference.direction, segment),
            neighbor_angle: angle::difference(neighbor.direction, angle::opposite(segment)),
        }
    }
}

/// Probe edge remembered together with the minutiae it connects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedEdge {
    pub shape: EdgeShape,
    pub reference: usize,
    pub neighbor: usize,
}

impl IndexedEdge {
    pub fn new(minutiae: &[Minutia], reference: usize, neighbor: usize) -> Self {
        Self {
            shape: EdgeShape::new(&minutiae[reference], &minutiae[neighbor]),
            reference,
            neighbor,
        }
    }
}

/// Edge matching tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    pub max_distance_error: i32,
    pub max_angle_error: f64,
    complementary_angle_error: f64,
}

impl Tolerance {
    pub fn new(max_distance_error: i32, max_angle_error: f64) -> Self {
        Self {
            max_distance_error,
            max_angle_error,
            complementary_angle_error: angle::complementary(max_angle_error),
        }
    }

    /// Both angles agree within `max_angle_error` (circularly).
    ///
    /// The rotation from candidate to probe is either small or close to a full
    /// turn; checking both sides of the wrap keeps the boundary exact.
    #[inline]
    pub fn angles_match(&self, probe: &EdgeShape, candidate: &EdgeShape) -> bool {
        let reference_delta = angle::difference(probe.reference_angle, candidate.reference_angle);
        if reference_delta > self.max_angle_error
            && reference_delta < self.complementary_angle_error
        {
            return false;
        }
        let neighbor_delta = angle::difference(probe.neighbor_angle, candidate.neighbor_angle);
        neighbor_delta <= self.max_angle_error || neighbor_delta >= self.complementary_angle_error
    }

    /// Full match predicate: length and both angles.
    #[inline]
    pub fn matches(&self, probe: &EdgeShape, candidate: &EdgeShape) -> bool {
        let length_delta = probe.length - candidate.length;
        (-self.max_distance_error..=self.max_distance_error).contains(&length_delta)
            && self.angles_match(probe, candidate)
    }
}
