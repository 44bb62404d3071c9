//! CMake build driver.
//!
//! Configure and compile always run, even when the build directory already
//! holds a finished build. Stale state in the build directory is kept.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::BuildOptions;
use crate::error::{PipelineError, Result, Stage};
use crate::process::{CommandRunner, Invocation};

const BUILD_SUBDIR: &str = "build";

/// `source_root/build`.
pub fn build_dir(source_root: &Path) -> PathBuf {
    source_root.join(BUILD_SUBDIR)
}

/// Configure step. The build directory is always `source_root/build`, so
/// the project root is its parent.
pub fn configure_invocation(options: &BuildOptions, build_dir: &Path) -> Invocation {
    let args = std::iter::once("..".to_string()).chain(options.configure_args.iter().cloned());
    Invocation::new(&options.cmake, args).current_dir(build_dir)
}

pub fn compile_invocation(options: &BuildOptions, build_dir: &Path) -> Invocation {
    Invocation::new(&options.cmake, ["--build", "."]).current_dir(build_dir)
}

/// Create the build directory if needed, then configure and compile.
pub fn build(
    runner: &mut impl CommandRunner,
    source_root: &Path,
    options: &BuildOptions,
) -> Result<PathBuf> {
    let dir = prepare(source_root)?;
    configure(runner, &dir, options)?;
    compile(runner, &dir, options)?;
    Ok(dir)
}

/// Create `source_root/build` if absent. An existing directory is reused as is.
pub fn prepare(source_root: &Path) -> Result<PathBuf> {
    let dir = build_dir(source_root);
    std::fs::create_dir_all(&dir)
        .map_err(|e| PipelineError::io(Stage::Configure, "creating", &dir, e))?;
    Ok(dir)
}

pub fn configure(
    runner: &mut impl CommandRunner,
    build_dir: &Path,
    options: &BuildOptions,
) -> Result<()> {
    info!(build_dir = %build_dir.display(), "configuring");
    runner
        .run(&configure_invocation(options, build_dir))
        .map_err(|cause| PipelineError::Configuration {
            build_dir: build_dir.to_path_buf(),
            cause,
        })
}

pub fn compile(
    runner: &mut impl CommandRunner,
    build_dir: &Path,
    options: &BuildOptions,
) -> Result<()> {
    info!(build_dir = %build_dir.display(), "compiling");
    runner
        .run(&compile_invocation(options, build_dir))
        .map_err(|cause| PipelineError::Compilation {
            build_dir: build_dir.to_path_buf(),
            cause,
        })
}
