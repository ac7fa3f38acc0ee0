//! Results go to stdout, or to a file with a run record beside it.
//!
//! A file result `runs/pair.json` gets `runs/pair.provenance.json` holding the
//! code revision, crate version, the call site and the run parameters, so a
//! stored score can be reproduced.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Serialize)]
struct CallSite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct RunRecord<'a, P: Serialize> {
    code_rev: String,
    version: &'static str,
    callsite: CallSite,
    params: &'a P,
    output: String,
}

/// Print `doc` as pretty JSON, or write it to `out` together with its run
/// record. Returns the record path when a file was written.
#[track_caller]
pub fn emit<T, P>(doc: &T, params: &P, out: Option<&Path>) -> Result<Option<PathBuf>>
where
    T: Serialize + ?Sized,
    P: Serialize,
{
    let callsite = Location::caller();
    let json = serde_json::to_string_pretty(doc)?;
    let Some(out) = out else {
        println!("{json}");
        return Ok(None);
    };
    create_parent(out)?;
    fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;

    let record = RunRecord {
        code_rev: current_git_rev(),
        version: ridgematch::VERSION,
        callsite: CallSite {
            file: callsite.file(),
            line: callsite.line(),
        },
        params,
        output: out.display().to_string(),
    };
    let record_path = record_path(out);
    fs::write(&record_path, serde_json::to_string_pretty(&record)?)
        .with_context(|| format!("writing {}", record_path.display()))?;
    tracing::info!(out = %out.display(), record = %record_path.display(), "wrote result");
    Ok(Some(record_path))
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("creating output dir {}", dir.display())),
        _ => Ok(()),
    }
}

/// `<dir>/<stem>.provenance.json` for `<dir>/<stem>.<ext>`.
fn record_path(out: &Path) -> PathBuf {
    let stem = out.file_stem().and_then(|s| s.to_str()).unwrap_or("result");
    out.with_file_name(format!("{stem}.provenance.json"))
}

/// Revision from `GIT_COMMIT` (compile time first, then run time), falling
/// back to the enclosing checkout.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_owned)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty());
    from_env
        .or_else(|| {
            let output = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            output
                .status
                .success()
                .then(|| String::from_utf8_lossy(&output.stdout).trim().to_owned())
        })
        .unwrap_or_else(|| "unknown".to_owned())
}
