//! Pipeline configuration.
//!
//! Every field has a default that reproduces the `py_polyhedral` package
//! build, so a missing config file means "build polyhedral_common".

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::manifest::ArtifactManifest;

pub const DEFAULT_REPO_URL: &str = "https://github.com/MathieuDutSik/polyhedral_common";
pub const DEFAULT_SOURCE_DIR: &str = "cpp_code_repo";
pub const DEFAULT_DESTINATION: &str = "build/lib/py_polyhedral/bin";

/// Where the external source comes from and where it lives locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSpec {
    pub url: String,
    pub path: PathBuf,
    /// Branch or tag to clone. `None` clones the remote's default branch.
    pub branch: Option<String>,
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self {
            url: DEFAULT_REPO_URL.to_string(),
            path: PathBuf::from(DEFAULT_SOURCE_DIR),
            branch: None,
        }
    }
}

/// Programs and flags used to drive the native build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    pub git: String,
    pub cmake: String,
    /// Appended to the configure step, e.g. `-DCMAKE_BUILD_TYPE=Release`.
    pub configure_args: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            cmake: "cmake".to_string(),
            configure_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceSpec,
    pub build: BuildOptions,
    pub destination: PathBuf,
    pub manifest: ArtifactManifest,
}

impl Config {
    /// Load a JSON config file. Absent keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// `sourceRoot/build`.
    pub fn build_dir(&self) -> PathBuf {
        crate::cmake::build_dir(&self.source.path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceSpec::default(),
            build: BuildOptions::default(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            manifest: ArtifactManifest::default(),
        }
    }
}
