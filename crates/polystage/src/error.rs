//! Error types for the fetch/build/stage pipeline.
//!
//! Every error is fatal. Nothing here is retried, and nothing is downgraded
//! to a warning.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::PipelineState;

/// Pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    Configure,
    Compile,
    Staging,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Acquire => "acquire",
            Stage::Configure => "configure",
            Stage::Compile => "compile",
            Stage::Staging => "stage",
        };
        f.write_str(name)
    }
}

/// An external process could not be run to a successful exit.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all (missing binary, bad cwd).
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process ran and exited unsuccessfully. `code` is `None` when it
    /// was terminated by a signal.
    #[error("{program} exited with {}", describe_code(.code))]
    Exit { program: String, code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetching the source tree failed.
    #[error("acquire: fetching {url} into {} failed", .dest.display())]
    Acquisition {
        url: String,
        dest: PathBuf,
        #[source]
        cause: CommandError,
    },

    /// The native build system's configure step failed.
    #[error("configure: configuring {} failed", .build_dir.display())]
    Configuration {
        build_dir: PathBuf,
        #[source]
        cause: CommandError,
    },

    /// The native build system's compile step failed.
    #[error("compile: building in {} failed", .build_dir.display())]
    Compilation {
        build_dir: PathBuf,
        #[source]
        cause: CommandError,
    },

    /// An artifact named in the manifest is absent after a successful compile.
    #[error("stage: {name} was not found in {}", .search_dir.display())]
    MissingArtifact { name: String, search_dir: PathBuf },

    /// A filesystem operation issued by a stage failed.
    #[error("{stage}: {action} {} failed", .path.display())]
    Io {
        stage: Stage,
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path handed to an external tool cannot be passed through unchanged.
    #[error("{stage}: path {} is not valid UTF-8", .path.display())]
    NonUtf8Path { stage: Stage, path: PathBuf },

    /// `run` was called on a pipeline that already left `Idle`.
    #[error("pipeline is {state}, reset it before running again")]
    NotIdle { state: PipelineState },
}

impl PipelineError {
    /// Stage this error belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Acquisition { .. } => Some(Stage::Acquire),
            PipelineError::Configuration { .. } => Some(Stage::Configure),
            PipelineError::Compilation { .. } => Some(Stage::Compile),
            PipelineError::MissingArtifact { .. } => Some(Stage::Staging),
            PipelineError::Io { stage, .. } | PipelineError::NonUtf8Path { stage, .. } => {
                Some(*stage)
            }
            PipelineError::NotIdle { .. } => None,
        }
    }

    pub(crate) fn io(
        stage: Stage,
        action: &'static str,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        PipelineError::Io {
            stage,
            action,
            path: path.into(),
            source,
        }
    }
}

/// Reasons an artifact manifest is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("artifact manifest is empty")]
    Empty,

    #[error("artifact name at position {0} is empty")]
    EmptyName(usize),

    #[error("artifact name {0:?} is not a flat file name")]
    NotFlat(String),

    #[error("artifact {0:?} is listed more than once")]
    Duplicate(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
