//! Artifact verification and staging.
//!
//! Verification and copying are interleaved per artifact. A missing artifact
//! aborts the loop immediately, and anything already copied in the same call
//! stays in the destination. The destination can therefore be left partially
//! populated after a [`PipelineError::MissingArtifact`].

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PipelineError, Result, Stage};
use crate::manifest::ArtifactManifest;

/// An artifact copied from the build directory into the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Confirm `build_dir/name` exists and return its path.
pub fn verify(build_dir: &Path, name: &str) -> Result<PathBuf> {
    let candidate = build_dir.join(name);
    if candidate.exists() {
        Ok(candidate)
    } else {
        Err(PipelineError::MissingArtifact {
            name: name.to_string(),
            search_dir: build_dir.to_path_buf(),
        })
    }
}

/// Verify and copy every manifest entry, in order, into `destination`.
///
/// `destination` is created if absent. Unrelated files already in it are
/// left alone; files with a manifest name are overwritten.
pub fn stage_all(
    build_dir: &Path,
    manifest: &ArtifactManifest,
    destination: &Path,
) -> Result<Vec<StagedArtifact>> {
    std::fs::create_dir_all(destination)
        .map_err(|e| PipelineError::io(Stage::Staging, "creating", destination, e))?;

    let mut staged = Vec::with_capacity(manifest.len());
    for name in manifest.iter() {
        let source = verify(build_dir, name)?;
        let target = destination.join(name);

        // fs::copy follows symlinks and writes an independent file,
        // permission bits included.
        std::fs::copy(&source, &target)
            .map_err(|e| PipelineError::io(Stage::Staging, "copying to", &target, e))?;

        info!(artifact = name, to = %target.display(), "staged");
        staged.push(StagedArtifact {
            name: name.to_string(),
            source,
            destination: target,
        });
    }

    Ok(staged)
}

/// Presence of one manifest entry, as reported by `polystage status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub name: String,
    pub built: bool,
    pub staged: Option<std::time::SystemTime>,
}

/// Check every manifest entry in the build directory and the destination.
///
/// Never fails: unreadable metadata is reported as "not staged".
pub fn status(
    build_dir: &Path,
    manifest: &ArtifactManifest,
    destination: &Path,
) -> Vec<ArtifactStatus> {
    manifest
        .iter()
        .map(|name| ArtifactStatus {
            name: name.to_string(),
            built: build_dir.join(name).exists(),
            staged: std::fs::metadata(destination.join(name))
                .and_then(|m| m.modified())
                .ok(),
        })
        .collect()
}
