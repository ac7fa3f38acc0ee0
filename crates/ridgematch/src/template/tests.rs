use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::*;
use crate::cfg::MatchCfg;
use crate::geom::length_sq;
use crate::synth::{draw_template, CloudCfg, ReplayToken};

fn cloud(count: usize, seed: u64) -> FeatureTemplate {
    let cfg = CloudCfg {
        count,
        ..CloudCfg::default()
    };
    draw_template(cfg, ReplayToken { seed, index: 0 }).unwrap()
}

#[test]
fn reorder_ignores_input_order() {
    let cfg = MatchCfg::default();
    let features = cloud(40, 3);
    let mut shuffled = features.clone();
    shuffled.minutiae.shuffle(&mut StdRng::seed_from_u64(99));
    assert_ne!(features.minutiae, shuffled.minutiae);
    let a = SearchTemplate::new(&features, &cfg);
    let b = SearchTemplate::new(&shuffled, &cfg);
    assert_eq!(a.minutiae(), b.minutiae());
    assert_eq!(a.edges(), b.edges());
}

#[test]
fn reorder_is_not_spatial() {
    let features = cloud(40, 5);
    let t = SearchTemplate::with_defaults(&features);
    let by_x = t
        .minutiae()
        .windows(2)
        .all(|w| w[0].position.x <= w[1].position.x);
    let by_y = t
        .minutiae()
        .windows(2)
        .all(|w| w[0].position.y <= w[1].position.y);
    assert!(!by_x && !by_y);
}

#[test]
fn stars_are_bounded_sorted_and_nearest() {
    let cfg = MatchCfg::default();
    let t = SearchTemplate::new(&cloud(30, 11), &cfg);
    let minutiae = t.minutiae();
    for (reference, star) in t.edges().iter().enumerate() {
        assert_eq!(star.len(), cfg.edge_table_neighbors);
        assert!(star.iter().all(|e| e.neighbor != reference));
        assert!(star.windows(2).all(|w| {
            (w[0].shape.length, w[0].neighbor) <= (w[1].shape.length, w[1].neighbor)
        }));
        // Nothing outside the star is strictly closer than the farthest member.
        let farthest = star
            .iter()
            .map(|e| length_sq(minutiae[e.neighbor].position - minutiae[reference].position))
            .max()
            .unwrap();
        let closer = (0..minutiae.len())
            .filter(|&n| n != reference && star.iter().all(|e| e.neighbor != n))
            .filter(|&n| {
                length_sq(minutiae[n].position - minutiae[reference].position) < farthest
            })
            .count();
        assert_eq!(closer, 0, "minutia {reference}");
    }
}

#[test]
fn small_templates_use_the_fixed_radius() {
    let cfg = MatchCfg::default();
    let features = FeatureTemplate::new(
        1000,
        1000,
        vec![
            Minutia::new(0, 0, 0.0, MinutiaKind::Ending),
            Minutia::new(100, 0, 1.0, MinutiaKind::Bifurcation),
            Minutia::new(900, 0, 2.0, MinutiaKind::Ending),
        ],
    );
    let t = SearchTemplate::new(&features, &cfg);
    let total: usize = t.edges().iter().map(Vec::len).sum();
    // 0↔100 (100 px) and 100↔900 (800 px is out of range), 0↔900 out of range.
    assert_eq!(total, 2);
}

#[test]
fn degenerate_templates_build() {
    let empty = SearchTemplate::with_defaults(&FeatureTemplate::default());
    assert!(empty.is_empty());
    assert!(empty.edges().is_empty());
    let single = SearchTemplate::with_defaults(&FeatureTemplate::new(
        10,
        10,
        vec![Minutia::new(1, 2, 0.5, MinutiaKind::Ending)],
    ));
    assert_eq!(single.len(), 1);
    assert!(single.edges()[0].is_empty());
}
