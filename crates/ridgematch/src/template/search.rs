//! Search template: reordered minutiae plus their neighbor stars.

use std::cmp::Ordering;

use crate::cfg::{MatchCfg, SHUFFLE_PRIME};

use super::neighbors::{build_edge_table, NeighborEdge};
use super::types::{FeatureTemplate, Minutia};

/// Immutable matching view of one fingerprint.
///
/// Minutiae are sorted by a fixed arithmetic key rather than by position or
/// input order, which spreads them evenly over the edge hash bins and makes
/// the template independent of the order the extractor emitted them in.
#[derive(Clone, Debug)]
pub struct SearchTemplate {
    pub width: i32,
    pub height: i32,
    minutiae: Vec<Minutia>,
    edges: Vec<Vec<NeighborEdge>>,
}

impl SearchTemplate {
    pub fn new(features: &FeatureTemplate, cfg: &MatchCfg) -> Self {
        let mut minutiae = features.minutiae.clone();
        minutiae.sort_by(shuffle_order);
        let edges = build_edge_table(&minutiae, cfg);
        Self {
            width: features.width,
            height: features.height,
            minutiae,
            edges,
        }
    }

    /// Build with [`MatchCfg::default`].
    pub fn with_defaults(features: &FeatureTemplate) -> Self {
        Self::new(features, &MatchCfg::default())
    }

    #[inline]
    pub fn minutiae(&self) -> &[Minutia] {
        &self.minutiae
    }

    /// Neighbor stars, indexed like [`Self::minutiae`].
    #[inline]
    pub fn edges(&self) -> &[Vec<NeighborEdge>] {
        &self.edges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.minutiae.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.minutiae.is_empty()
    }
}

#[inline]
fn shuffle_key(m: &Minutia) -> i32 {
    m.position
        .x
        .wrapping_mul(SHUFFLE_PRIME)
        .wrapping_add(m.position.y)
        .wrapping_mul(SHUFFLE_PRIME)
}

/// Total order: shuffle key first, then every field as a tie-break.
fn shuffle_order(a: &Minutia, b: &Minutia) -> Ordering {
    shuffle_key(a)
        .cmp(&shuffle_key(b))
        .then(a.position.x.cmp(&b.position.x))
        .then(a.position.y.cmp(&b.position.y))
        .then(a.direction.total_cmp(&b.direction))
        .then(a.kind.cmp(&b.kind))
}
