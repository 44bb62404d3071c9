//! External process invocation.
//!
//! Every stage that shells out goes through [`CommandRunner`], so the
//! pipeline can be driven against a recording fake in tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::CommandError;

/// A single blocking process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Command line as it would be typed, for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Runs an invocation to completion.
///
/// Implementations block until the process exits. There is no timeout.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), CommandError>;
}

/// Spawns real processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), CommandError> {
        debug!(
            command = %invocation.display(),
            cwd = ?invocation.cwd,
            "running"
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|source| CommandError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(CommandError::Exit {
                program: invocation.program.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }
}
