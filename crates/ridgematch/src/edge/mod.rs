//! Edge shapes and the probe-side edge hash.
//!
//! An edge is the directed segment between two minutiae of one template. Its
//! shape (length plus both minutia directions measured against the segment)
//! does not change when the whole fingerprint is rotated or shifted, so shapes
//! from two different impressions can be compared directly.

mod hash;
mod shape;

pub use hash::{EdgeHash, HashStats};
pub use shape::{EdgeShape, IndexedEdge, Tolerance};
