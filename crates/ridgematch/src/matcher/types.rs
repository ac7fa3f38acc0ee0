//! Pair records and their arena handles.

/// Handle of a [`MinutiaPair`] slot in the [`super::PairPool`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairId(pub usize);

/// One probe↔candidate minutia correspondence.
///
/// `probe_ref`/`candidate_ref` name the already accepted pair whose edge
/// proposed this one (meaningless for a root). `distance` is the candidate
/// edge length, used to order the growth frontier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinutiaPair {
    pub probe: usize,
    pub candidate: usize,
    pub probe_ref: usize,
    pub candidate_ref: usize,
    pub distance: i32,
    pub supporting_edges: u32,
}
