//! Minutia model and the per-session search template.
//!
//! - `types.rs`: what the feature extractor hands over (`Minutia`,
//!   `FeatureTemplate`).
//! - `search.rs`: `SearchTemplate`, the immutable, deterministically reordered
//!   minutia array used by the matcher.
//! - `neighbors.rs`: the bounded k-nearest neighbor star per minutia.

mod neighbors;
mod search;
mod types;

pub use neighbors::{build_edge_table, NeighborEdge};
pub use search::SearchTemplate;
pub use types::{FeatureTemplate, Minutia, MinutiaKind};

#[cfg(test)]
mod tests;
