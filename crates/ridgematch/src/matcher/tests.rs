//! Matcher behavior on hand-built and synthetic templates.

use std::collections::HashSet;
use std::f64::consts::TAU;

use nalgebra::Vector2;
use proptest::prelude::*;

use super::*;
use crate::cfg::MatchCfg;
use crate::synth::{draw_template, shuffle, CloudCfg, Jitter, ReplayToken, RigidMotion};
use crate::template::{FeatureTemplate, Minutia, MinutiaKind, SearchTemplate};

fn cloud(count: usize, seed: u64) -> FeatureTemplate {
    let cfg = CloudCfg {
        count,
        ..CloudCfg::default()
    };
    draw_template(cfg, ReplayToken { seed, index: 0 }).unwrap()
}

/// Noise well inside the matching tolerance.
const MILD: Jitter = Jitter {
    position: 3.0,
    direction: 0.03,
};

/// Second impression: rotated, shifted and slightly noisy.
fn impression(features: &FeatureTemplate, seed: u64, jitter: Jitter) -> FeatureTemplate {
    let tok = ReplayToken { seed, index: 1 };
    let moved = RigidMotion::random(features, 0.6, 25.0, tok).apply(features);
    jitter.apply(&moved, tok.next())
}

/// 4x3 lattice, 70 px apart, directions 30° apart.
fn lattice() -> FeatureTemplate {
    let mut minutiae = Vec::new();
    for r in 0..3 {
        for c in 0..4 {
            let i = r * 4 + c;
            let kind = if i % 3 == 0 {
                MinutiaKind::Bifurcation
            } else {
                MinutiaKind::Ending
            };
            minutiae.push(Minutia::new(
                100 + 70 * c,
                100 + 70 * r,
                (i as f64 * 30f64.to_radians()) % TAU,
                kind,
            ));
        }
    }
    FeatureTemplate::new(500, 400, minutiae)
}

fn quad() -> FeatureTemplate {
    FeatureTemplate::new(
        400,
        400,
        vec![
            Minutia::new(100, 100, 0.3, MinutiaKind::Ending),
            Minutia::new(265, 128, 2.0, MinutiaKind::Bifurcation),
            Minutia::new(231, 297, 4.0, MinutiaKind::Ending),
            Minutia::new(88, 243, 5.5, MinutiaKind::Bifurcation),
        ],
    )
}

#[test]
fn self_match_pairs_every_minutia() {
    let features = lattice();
    let probe = Probe::with_defaults(&features);
    let candidate = probe.candidate(&features);
    let ex = probe.explain(&candidate).expect("roots exist");
    assert_eq!(ex.pairs.len(), features.minutiae.len());
    let pm = probe.template().minutiae();
    let cm = candidate.minutiae();
    for pair in &ex.pairs {
        assert_eq!(pm[pair.probe], cm[pair.candidate]);
    }
    assert_eq!(ex.score.supported_minutia_count, features.minutiae.len());
    assert_eq!(ex.score.minutia_type_hits, features.minutiae.len());
    assert!((ex.score.minutia_fraction - 1.0).abs() < 1e-12);
    assert!(ex.score.shaped_score > 50.0);
}

#[test]
fn self_match_beats_every_other_impression() {
    let features = cloud(35, 21);
    let probe = Probe::with_defaults(&features);
    let own = probe.matches(&probe.candidate(&features));
    for seed in 0..4 {
        let noise = Jitter {
            position: 4.0,
            direction: 0.05,
        };
        let other = impression(&features, seed, noise);
        assert!(probe.matches(&probe.candidate(&other)) <= own);
    }
}

#[test]
fn congruent_quadrilateral_matches() {
    let features = quad();
    let moved = RigidMotion::about_image_center(&features, 0.5, Vector2::new(30.0, -12.0))
        .apply(&features);
    let cfg = MatchCfg::default();
    let probe = Probe::new(&features, cfg).unwrap();
    let ex = probe.explain(&probe.candidate(&moved)).expect("roots exist");
    assert!(ex.pairs.len() >= 4);
    assert!(ex.score.total_score > cfg.fmr.fmr_max);
    assert!(ex.score.shaped_score > 0.0);
}

#[test]
fn degenerate_templates_score_zero() {
    let probe_big = Probe::with_defaults(&cloud(30, 1));
    for n in 0..2 {
        let tiny = FeatureTemplate::new(
            400,
            500,
            cloud(30, 1).minutiae.into_iter().take(n).collect(),
        );
        let probe_tiny = Probe::with_defaults(&tiny);
        assert_eq!(probe_big.matches(&probe_big.candidate(&tiny)), 0.0);
        assert_eq!(probe_tiny.matches(&probe_tiny.candidate(&cloud(30, 1))), 0.0);
        assert_eq!(probe_tiny.matches(&probe_tiny.candidate(&tiny)), 0.0);
        assert!(probe_big.explain(&probe_big.candidate(&tiny)).is_none());
    }
}

#[test]
fn unrelated_clouds_score_low() {
    for seed in 0..6 {
        let probe = Probe::with_defaults(&cloud(30, 100 + seed));
        let other = probe.candidate(&cloud(30, 200 + seed));
        let score = probe.matches(&other);
        // Below the 1/10 FMR band.
        assert!(score < 10.0, "seed {seed}: {score}");
    }
}

#[test]
fn genuine_pairs_score_high() {
    for seed in 0..4 {
        let features = cloud(40, 300 + seed);
        let probe = Probe::with_defaults(&features);
        let other = impression(&features, seed, MILD);
        let score = probe.matches(&probe.candidate(&other));
        assert!(score > 40.0, "seed {seed}: {score}");
    }
}

#[test]
fn perturbation_beyond_tolerance_never_helps() {
    let features = cloud(40, 77);
    let probe = Probe::with_defaults(&features);
    let clean = impression(&features, 5, Jitter::default());
    let base = probe.matches(&probe.candidate(&clean));
    for (k, amplitude) in [20.0, 35.0, 60.0].into_iter().enumerate() {
        let noisy = Jitter {
            position: amplitude,
            direction: 0.6,
        }
        .apply(&clean, ReplayToken { seed: 9, index: k as u64 });
        let score = probe.matches(&probe.candidate(&noisy));
        assert!(score <= base, "{amplitude}: {score} > {base}");
    }
}

#[test]
fn repeated_matches_are_bit_identical() {
    let features = cloud(40, 4);
    let probe = Probe::with_defaults(&features);
    let candidate = probe.candidate(&impression(&features, 2, MILD));
    let first = probe.matches(&candidate);
    let mut ws = MatcherWorkspace::new();
    for _ in 0..3 {
        assert_eq!(probe.matches(&candidate).to_bits(), first.to_bits());
        assert_eq!(probe.match_with(&mut ws, &candidate).to_bits(), first.to_bits());
        assert!(ws.is_clean());
    }
    let rebuilt = Probe::with_defaults(&features);
    assert_eq!(rebuilt.matches(&candidate).to_bits(), first.to_bits());
}

#[test]
fn workspace_history_does_not_change_the_score() {
    let mut warmed = MatcherWorkspace::new();
    for seed in 0..12 {
        let features = cloud(60, 400 + seed);
        let probe = Probe::with_defaults(&features);
        let candidate = probe.candidate(&impression(&features, seed, MILD));
        for other in 0..3 {
            let unrelated = probe.candidate(&cloud(60, 500 + 3 * seed + other));
            probe.match_with(&mut warmed, &unrelated);
        }
        let fresh = probe.match_with(&mut MatcherWorkspace::new(), &candidate);
        let reused = probe.match_with(&mut warmed, &candidate);
        assert_eq!(fresh.to_bits(), reused.to_bits(), "seed {seed}");
        let ex = probe.explain(&candidate).unwrap();
        assert_eq!(ex.score.shaped_score.to_bits(), fresh.to_bits(), "seed {seed}");
    }
}

#[test]
fn explanation_agrees_with_score() {
    let features = cloud(40, 12);
    let probe = Probe::with_defaults(&features);
    let candidate = probe.candidate(&impression(&features, 3, MILD));
    let ex = probe.explain(&candidate).expect("roots exist");
    assert_eq!(ex.score.shaped_score.to_bits(), probe.matches(&candidate).to_bits());
    assert_eq!(ex.score.minutia_count, ex.pairs.len());
    assert_eq!(ex.score.supporting_edge_sum as usize, 2 * ex.supporting.len());
    assert!(ex.root < ex.roots.tried.max(1));
    assert!(ex.roots.tried <= probe.cfg().max_tried_roots);
    assert!(ex.roots.lookups <= probe.cfg().max_root_edge_lookups);
}

#[test]
fn identify_picks_the_genuine_candidate() {
    let features = cloud(40, 31);
    let probe = Probe::with_defaults(&features);
    let gallery: Vec<SearchTemplate> = vec![
        probe.candidate(&cloud(40, 32)),
        probe.candidate(&impression(&features, 1, MILD)),
        probe.candidate(&cloud(40, 33)),
    ];
    let (index, score) = probe.identify(&gallery).unwrap();
    assert_eq!(index, 1);
    assert_eq!(score.to_bits(), probe.matches(&gallery[1]).to_bits());
    assert!(probe.identify(&[]).is_none());
}

#[test]
fn threads_share_one_probe() {
    let features = cloud(40, 50);
    let probe = Probe::with_defaults(&features);
    let candidates: Vec<SearchTemplate> = (0..8)
        .map(|seed| {
            probe.candidate(&impression(&features, seed, MILD))
        })
        .collect();
    let expected: Vec<f64> = candidates.iter().map(|c| probe.matches(c)).collect();
    let got: Vec<f64> = std::thread::scope(|s| {
        let handles: Vec<_> = candidates
            .iter()
            .map(|c| s.spawn(|| probe.matches(c)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(
        expected.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        got.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
}

#[test]
fn graph_growth_keeps_a_bijection() {
    let cfg = MatchCfg::default();
    let features = cloud(40, 8);
    let probe = Probe::new(&features, cfg).unwrap();
    let noise = Jitter {
        position: 4.0,
        direction: 0.05,
    };
    let candidate = probe.candidate(&impression(&features, 8, noise));
    let mut pool = PairPool::new();
    let mut graph = PairingGraph::new();
    let mut roots = RootList::new();
    let mut spider = EdgeSpider::new();
    graph.reserve(probe.template().len(), candidate.len());
    roots.enumerate(&mut pool, probe.hash(), &candidate, &cfg);
    assert!(!roots.is_empty());
    for &root in roots.pairs() {
        spider.crawl(
            probe.template().edges(),
            candidate.edges(),
            &mut graph,
            &mut pool,
            root,
            cfg.tolerance(),
        );
        assert!(graph.is_consistent(&pool));
        let probes: HashSet<usize> = graph.tree().iter().map(|&id| pool[id].probe).collect();
        let candidates: HashSet<usize> =
            graph.tree().iter().map(|&id| pool[id].candidate).collect();
        assert_eq!(probes.len(), graph.count());
        assert_eq!(candidates.len(), graph.count());
        assert_eq!(graph.tree()[0], root);
        graph.clear(&mut pool);
        assert!(graph.is_consistent(&pool));
        assert_eq!(pool.live(), roots.len());
        assert_eq!(pool[root].supporting_edges, 0);
    }
    roots.discard(&mut pool);
    assert_eq!(pool.live(), 0);
}

#[test]
fn root_caps_bound_the_work() {
    let cfg = MatchCfg {
        max_tried_roots: 5,
        ..MatchCfg::default()
    };
    let features = cloud(60, 13);
    let probe = Probe::new(&features, cfg).unwrap();
    let candidate = probe.candidate(&features);
    let mut pool = PairPool::new();
    let mut roots = RootList::new();
    let stats = roots.enumerate(&mut pool, probe.hash(), &candidate, &cfg);
    assert_eq!(stats.tried, 5);
    assert!(roots.len() <= 5);

    let cfg = MatchCfg {
        max_root_edge_lookups: 10,
        ..MatchCfg::default()
    };
    let probe = Probe::new(&cloud(60, 14), cfg).unwrap();
    let other = probe.candidate(&cloud(60, 15));
    let mut fresh = RootList::new();
    let stats = fresh.enumerate(&mut pool, probe.hash(), &other, &cfg);
    assert!(stats.lookups <= 10);
    roots.discard(&mut pool);
    fresh.discard(&mut pool);
    assert_eq!(pool.live(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn storage_order_does_not_change_the_score(seed in 0u64..1000, count in 5usize..40) {
        let features = cloud(count, seed);
        let other = impression(&features, seed, MILD);
        let probe = Probe::with_defaults(&features);
        let score = probe.matches(&probe.candidate(&other));
        let reordered_candidate = shuffle(&other, ReplayToken { seed, index: 7 });
        prop_assert_eq!(
            probe.matches(&probe.candidate(&reordered_candidate)).to_bits(),
            score.to_bits()
        );
        let reordered = shuffle(&features, ReplayToken { seed, index: 8 });
        let reordered_probe = Probe::with_defaults(&reordered);
        prop_assert_eq!(
            reordered_probe.matches(&reordered_probe.candidate(&other)).to_bits(),
            score.to_bits()
        );
    }

    #[test]
    fn self_match_is_near_complete(seed in 0u64..1000, count in 15usize..50) {
        let features = cloud(count, seed);
        let probe = Probe::with_defaults(&features);
        let ex = probe.explain(&probe.candidate(&features)).unwrap();
        // Greedy growth may lose a few minutiae to look-alike neighbors.
        prop_assert!(ex.pairs.len() * 3 >= count * 2, "{} of {}", ex.pairs.len(), count);
        prop_assert!(ex.score.shaped_score > 0.0);
    }

    #[test]
    fn workspace_is_clean_after_every_match(a in 0u64..1000, b in 0u64..1000) {
        let probe = Probe::with_defaults(&cloud(30, a));
        let mut ws = MatcherWorkspace::new();
        probe.match_with(&mut ws, &probe.candidate(&cloud(25, b)));
        prop_assert!(ws.is_clean());
        probe.match_with(&mut ws, &probe.candidate(&cloud(45, b + 1)));
        prop_assert!(ws.is_clean());
    }
}
