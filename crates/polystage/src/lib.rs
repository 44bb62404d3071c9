//! # polystage
//!
//! Fetches polyhedral_common, drives its CMake build, checks that the
//! expected binaries were produced and copies them into the package tree.
//!
//! Structure:
//! - `vendor` - source acquisition (clone once, never re-fetch)
//! - `cmake` - build directory, configure and compile
//! - `artifacts` - per-artifact verify-then-copy into the destination
//! - `pipeline` - the forward-only state machine tying the stages together
//! - `manifest` / `config` - what to build and where to put it
//! - `process` - external command seam

pub mod artifacts;
pub mod cmake;
pub mod config;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod process;
pub mod vendor;

pub use artifacts::StagedArtifact;
pub use config::Config;
pub use error::{CommandError, ManifestError, PipelineError, Stage};
pub use manifest::ArtifactManifest;
pub use pipeline::{Pipeline, PipelineState};
pub use process::{CommandRunner, SystemRunner};
