//! Vendor source management (fetch, clean).
//!
//! Existence of the local path is the only idempotency check: a present tree
//! is never re-fetched, validated, or compared against the remote.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use crate::config::{BuildOptions, SourceSpec};
use crate::error::{PipelineError, Result, Stage};
use crate::process::{CommandRunner, Invocation};

/// Outcome of [`ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    /// The tree was already on disk; nothing was run.
    AlreadyPresent,
    /// The tree was cloned by this call.
    Fetched,
}

/// Make sure a local copy of `source` exists, cloning it recursively if not.
///
/// A failed clone is not cleaned up; a half-written tree stays where git left it.
pub fn ensure(
    runner: &mut impl CommandRunner,
    source: &SourceSpec,
    options: &BuildOptions,
) -> Result<Acquired> {
    let dest = &source.path;

    if dest.exists() {
        info!(path = %dest.display(), "source already present");
        return Ok(Acquired::AlreadyPresent);
    }

    // git receives the path as a string; a lossy conversion would clone
    // somewhere other than `dest`.
    let dest_str = dest.to_str().ok_or_else(|| PipelineError::NonUtf8Path {
        stage: Stage::Acquire,
        path: dest.clone(),
    })?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| PipelineError::io(Stage::Acquire, "creating", parent, e))?;
    }

    info!(url = %source.url, path = %dest.display(), "cloning source");

    let clone = Invocation::new(&options.git, clone_args(source, dest_str));
    runner
        .run(&clone)
        .map_err(|cause| PipelineError::Acquisition {
            url: source.url.clone(),
            dest: dest.clone(),
            cause,
        })?;

    Ok(Acquired::Fetched)
}

fn clone_args(source: &SourceSpec, dest: &str) -> Vec<String> {
    let mut args = vec!["clone".to_string(), "--recursive".to_string()];
    if let Some(branch) = &source.branch {
        args.push("--branch".to_string());
        args.push(branch.clone());
    }
    args.push(source.url.clone());
    args.push(dest.to_string());
    args
}

/// Remove the build directory, and with `source` the whole source tree.
///
/// Returns the paths that were actually removed.
pub fn clean(spec: &SourceSpec, source: bool) -> anyhow::Result<Vec<PathBuf>> {
    let target = if source {
        spec.path.clone()
    } else {
        crate::cmake::build_dir(&spec.path)
    };

    if target.exists() {
        std::fs::remove_dir_all(&target)
            .with_context(|| format!("Failed to remove {}", target.display()))?;
        info!(path = %target.display(), "removed");
        Ok(vec![target])
    } else {
        info!(path = %target.display(), "nothing to clean");
        Ok(Vec::new())
    }
}
