use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ridgematch::synth::{draw_template, CloudCfg, Jitter, ReplayToken, RigidMotion};
use ridgematch::{FeatureTemplate, MatchCfg, MatchExplanation, Probe, ScoreBreakdown};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod output;

#[derive(Parser)]
#[command(name = "ridgematch")]
#[command(about = "Minutia matcher driver on synthetic templates")]
struct Cmd {
    /// Largest accepted edge length difference in pixels
    #[arg(long, global = true)]
    max_distance_error: Option<i32>,
    /// Largest accepted edge angle difference in degrees
    #[arg(long, global = true)]
    max_angle_error: Option<f64>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args, Clone, Copy, Serialize)]
struct CloudArgs {
    #[arg(long, default_value_t = 1)]
    seed: u64,
    #[arg(long, default_value_t = 40)]
    minutiae: usize,
    /// Rotation bound of the second impression, radians
    #[arg(long, default_value_t = 0.5)]
    rotation: f64,
    /// Translation bound of the second impression, pixels per axis
    #[arg(long, default_value_t = 25.0)]
    shift: f64,
}

#[derive(Subcommand)]
enum Action {
    /// Score one genuine and one impostor pair
    Pair {
        #[command(flatten)]
        cloud: CloudArgs,
        /// Position noise in pixels
        #[arg(long, default_value_t = 3.0)]
        jitter: f64,
        /// Direction noise in degrees
        #[arg(long, default_value_t = 3.0)]
        angle_jitter: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Genuine score as a function of position noise
    Sweep {
        #[command(flatten)]
        cloud: CloudArgs,
        #[arg(long, default_value_t = 30.0)]
        max_jitter: f64,
        #[arg(long, default_value_t = 10)]
        steps: usize,
        /// Impressions per step
        #[arg(long, default_value_t = 8)]
        trials: u64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print version and active configuration
    Report,
}

/// Headline factors of one score.
#[derive(Serialize)]
struct ScoreSummary {
    shaped: f64,
    raw: f64,
    pairs: usize,
    supported: usize,
    type_hits: usize,
    edges: u32,
    fraction: f64,
    distance_accuracy: f64,
    angle_accuracy: f64,
}

impl From<&ScoreBreakdown> for ScoreSummary {
    fn from(s: &ScoreBreakdown) -> Self {
        Self {
            shaped: s.shaped_score,
            raw: s.total_score,
            pairs: s.minutia_count,
            supported: s.supported_minutia_count,
            type_hits: s.minutia_type_hits,
            edges: s.edge_count,
            fraction: s.minutia_fraction,
            distance_accuracy: s.distance_accuracy_score,
            angle_accuracy: s.angle_accuracy_score,
        }
    }
}

#[derive(Serialize)]
struct Scored {
    score: ScoreSummary,
    root: Option<usize>,
    lookups: usize,
    tried: usize,
    supporting: usize,
}

impl From<Option<MatchExplanation>> for Scored {
    fn from(ex: Option<MatchExplanation>) -> Self {
        match ex {
            Some(ex) => Self {
                score: (&ex.score).into(),
                root: Some(ex.root),
                lookups: ex.roots.lookups,
                tried: ex.roots.tried,
                supporting: ex.supporting.len(),
            },
            None => Self {
                score: (&ScoreBreakdown::default()).into(),
                root: None,
                lookups: 0,
                tried: 0,
                supporting: 0,
            },
        }
    }
}

#[derive(Serialize)]
struct PairResult {
    genuine: Scored,
    impostor: Scored,
}

#[derive(Serialize)]
struct PairParams {
    #[serde(flatten)]
    cloud: CloudArgs,
    jitter: f64,
    angle_jitter: f64,
}

#[derive(Serialize)]
struct SweepRow {
    jitter: f64,
    mean: f64,
    min: f64,
    scores: Vec<f64>,
}

#[derive(Serialize)]
struct SweepParams {
    #[serde(flatten)]
    cloud: CloudArgs,
    max_jitter: f64,
    steps: usize,
    trials: u64,
}

#[derive(Serialize)]
struct CfgReport {
    max_distance_error: i32,
    max_angle_error_deg: f64,
    edge_table_neighbors: usize,
    edge_table_range: i32,
    min_root_edge_length: i32,
    max_root_edge_lookups: usize,
    max_tried_roots: usize,
    min_supporting_edges: u32,
    distance_error_flatness: f64,
    angle_error_flatness: f64,
    /// minutia, fraction, type, supported, edge, distance accuracy, angle accuracy
    weights: [f64; 7],
    /// FMR max, 1/2, 1/10, 1/100, 1/1000, 1/10^4, 1/10^5
    fmr: [f64; 7],
}

impl From<&MatchCfg> for CfgReport {
    fn from(cfg: &MatchCfg) -> Self {
        let w = &cfg.weights;
        let t = &cfg.fmr;
        Self {
            max_distance_error: cfg.max_distance_error,
            max_angle_error_deg: cfg.max_angle_error.to_degrees(),
            edge_table_neighbors: cfg.edge_table_neighbors,
            edge_table_range: cfg.edge_table_range,
            min_root_edge_length: cfg.min_root_edge_length,
            max_root_edge_lookups: cfg.max_root_edge_lookups,
            max_tried_roots: cfg.max_tried_roots,
            min_supporting_edges: cfg.min_supporting_edges,
            distance_error_flatness: cfg.distance_error_flatness,
            angle_error_flatness: cfg.angle_error_flatness,
            weights: [
                w.minutia,
                w.minutia_fraction,
                w.minutia_type,
                w.supported_minutia,
                w.edge,
                w.distance_accuracy,
                w.angle_accuracy,
            ],
            fmr: [
                t.fmr_max,
                t.fmr_2,
                t.fmr_10,
                t.fmr_100,
                t.fmr_1000,
                t.fmr_10_000,
                t.fmr_100_000,
            ],
        }
    }
}

#[derive(Serialize)]
struct Report {
    version: &'static str,
    code_rev: String,
    cfg: CfgReport,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let cfg = match_cfg(&cmd)?;
    match cmd.action {
        Action::Pair {
            cloud,
            jitter,
            angle_jitter,
            out,
        } => pair(
            cfg,
            PairParams {
                cloud,
                jitter,
                angle_jitter,
            },
            out,
        ),
        Action::Sweep {
            cloud,
            max_jitter,
            steps,
            trials,
            out,
        } => sweep(
            cfg,
            SweepParams {
                cloud,
                max_jitter,
                steps,
                trials,
            },
            out,
        ),
        Action::Report => report(cfg),
    }
}

fn match_cfg(cmd: &Cmd) -> Result<MatchCfg> {
    let mut cfg = MatchCfg::default();
    if let Some(d) = cmd.max_distance_error {
        cfg.max_distance_error = d;
    }
    if let Some(deg) = cmd.max_angle_error {
        cfg.max_angle_error = deg.to_radians();
    }
    cfg.validate().context("invalid matcher configuration")?;
    Ok(cfg)
}

fn cloud(args: CloudArgs, index: u64) -> Result<FeatureTemplate> {
    let cfg = CloudCfg {
        count: args.minutiae,
        ..CloudCfg::default()
    };
    draw_template(cfg, ReplayToken { seed: args.seed, index })
        .with_context(|| format!("drawing cloud seed={} index={index}", args.seed))
}

/// Moved and perturbed copy of `features`.
fn impression(
    features: &FeatureTemplate,
    args: CloudArgs,
    jitter: Jitter,
    index: u64,
) -> FeatureTemplate {
    let tok = ReplayToken {
        seed: args.seed,
        index,
    };
    let moved = RigidMotion::random(features, args.rotation, args.shift, tok).apply(features);
    jitter.apply(&moved, tok.next())
}

fn pair(cfg: MatchCfg, params: PairParams, out: Option<PathBuf>) -> Result<()> {
    let args = params.cloud;
    tracing::info!(seed = args.seed, minutiae = args.minutiae, jitter = params.jitter, "pair");
    let features = cloud(args, 0)?;
    let probe = Probe::new(&features, cfg).context("building probe")?;
    let noise = Jitter {
        position: params.jitter,
        direction: params.angle_jitter.to_radians(),
    };
    let genuine = impression(&features, args, noise, 1);
    let impostor = cloud(args, 2)?;
    let result = PairResult {
        genuine: probe.explain(&probe.candidate(&genuine)).into(),
        impostor: probe.explain(&probe.candidate(&impostor)).into(),
    };
    output::emit(&result, &params, out.as_deref())?;
    Ok(())
}

fn sweep(cfg: MatchCfg, params: SweepParams, out: Option<PathBuf>) -> Result<()> {
    let SweepParams {
        cloud: args,
        max_jitter,
        steps,
        trials,
    } = params;
    anyhow::ensure!(steps > 0 && trials > 0, "steps and trials must be positive");
    tracing::info!(seed = args.seed, steps, trials, max_jitter, "sweep");
    let features = cloud(args, 0)?;
    let probe = Probe::new(&features, cfg).context("building probe")?;
    let mut rows = Vec::with_capacity(steps + 1);
    for step in 0..=steps {
        let position = max_jitter * step as f64 / steps as f64;
        let noise = Jitter {
            position,
            direction: (position / 3.0).to_radians(),
        };
        let scores: Vec<f64> = (0..trials)
            .map(|t| {
                let index = 1 + step as u64 * trials + t;
                let other = impression(&features, args, noise, index);
                probe.matches(&probe.candidate(&other))
            })
            .collect();
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        tracing::debug!(position, mean, min, "sweep step");
        rows.push(SweepRow {
            jitter: position,
            mean,
            min,
            scores,
        });
    }
    output::emit(&rows, &params, out.as_deref())?;
    Ok(())
}

fn report(cfg: MatchCfg) -> Result<()> {
    let doc = Report {
        version: ridgematch::VERSION,
        code_rev: output::current_git_rev(),
        cfg: (&cfg).into(),
    };
    output::emit(&doc, &(), None)?;
    Ok(())
}
