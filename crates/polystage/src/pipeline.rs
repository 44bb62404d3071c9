//! Acquire → configure → compile → stage, once, strictly forward.
//!
//! The pipeline assumes it is the only process touching the source, build
//! and destination paths. There is no locking; two concurrent runs against
//! the same paths can race on directory creation and build contents.

use std::fmt;

use tracing::info;

use crate::artifacts::{self, StagedArtifact};
use crate::cmake;
use crate::config::Config;
use crate::error::{PipelineError, Result, Stage};
use crate::process::CommandRunner;
use crate::vendor;

/// Where a pipeline is in its single forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Acquiring,
    Configuring,
    Compiling,
    Staging,
    Complete,
    Failed(Stage),
}

impl PipelineState {
    /// `Complete` or `Failed`; only [`Pipeline::reset`] leaves these.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::Acquiring => f.write_str("acquiring"),
            PipelineState::Configuring => f.write_str("configuring"),
            PipelineState::Compiling => f.write_str("compiling"),
            PipelineState::Staging => f.write_str("staging"),
            PipelineState::Complete => f.write_str("complete"),
            PipelineState::Failed(stage) => write!(f, "failed ({stage})"),
        }
    }
}

pub struct Pipeline<R> {
    config: Config,
    runner: R,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(config: Config, runner: R) -> Self {
        Self {
            config,
            runner,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered since the last reset, in order.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Return to `Idle`. Nothing on disk is touched.
    pub fn reset(&mut self) {
        self.state = PipelineState::Idle;
        self.history = vec![PipelineState::Idle];
    }

    /// Run every stage. Any error moves the pipeline to `Failed` and is
    /// returned unchanged.
    pub fn run(&mut self) -> Result<Vec<StagedArtifact>> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::NotIdle { state: self.state });
        }

        match self.run_stages() {
            Ok(staged) => {
                self.enter(PipelineState::Complete);
                info!(artifacts = staged.len(), "pipeline complete");
                Ok(staged)
            }
            // Reporting the error is left to the caller.
            Err((stage, err)) => {
                self.enter(PipelineState::Failed(stage));
                Err(err)
            }
        }
    }

    /// On failure, also returns the stage that was running.
    fn run_stages(
        &mut self,
    ) -> std::result::Result<Vec<StagedArtifact>, (Stage, PipelineError)> {
        let config = &self.config;

        self.state = PipelineState::Acquiring;
        self.history.push(self.state);
        vendor::ensure(&mut self.runner, &config.source, &config.build)
            .map_err(|e| (Stage::Acquire, e))?;

        self.state = PipelineState::Configuring;
        self.history.push(self.state);
        let build_dir =
            cmake::prepare(&config.source.path).map_err(|e| (Stage::Configure, e))?;
        cmake::configure(&mut self.runner, &build_dir, &config.build)
            .map_err(|e| (Stage::Configure, e))?;

        self.state = PipelineState::Compiling;
        self.history.push(self.state);
        cmake::compile(&mut self.runner, &build_dir, &config.build)
            .map_err(|e| (Stage::Compile, e))?;

        self.state = PipelineState::Staging;
        self.history.push(self.state);
        artifacts::stage_all(&build_dir, &config.manifest, &config.destination)
            .map_err(|e| (Stage::Staging, e))
    }

    fn enter(&mut self, next: PipelineState) {
        self.state = next;
        self.history.push(next);
    }
}
