//! End-to-end checks of the `polystage` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

struct TestEnv {
    temp: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    /// Write a config whose git/cmake are replaced by the given programs.
    fn write_config(&self, git: &str, cmake: &str, manifest: &[&str]) -> PathBuf {
        let config = json!({
            "source": {
                "url": "https://example.invalid/polyhedral_common",
                "path": self.path("cpp_code_repo"),
            },
            "build": { "git": git, "cmake": cmake },
            "destination": self.path("py_polyhedral/bin"),
            "manifest": manifest,
        });
        let path = self.path("polystage.json");
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        path
    }

    /// Pretend a previous build already produced `names`.
    fn seed_build(&self, names: &[&str]) {
        let build = self.path("cpp_code_repo/build");
        std::fs::create_dir_all(&build).unwrap();
        for name in names {
            std::fs::write(build.join(name), format!("#!/bin/sh\necho {name}\n")).unwrap();
        }
    }

    fn cmd(&self, config: &Path) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_polystage"));
        cmd.current_dir(self.temp.path())
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(config);
        cmd
    }
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Test that every subcommand shows up in --help.
#[test]
fn test_help_lists_commands() {
    Command::new(env!("CARGO_BIN_EXE_polystage"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("clean"));
}

/// Test status on a fresh checkout location.
#[test]
fn test_status_reports_missing_everything() {
    let env = TestEnv::new();
    let config = env.write_config("git", "cmake", &["A", "B"]);

    env.cmd(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[missing]"))
        .stdout(predicate::str::contains("0/2 staged"));
}

/// Test that a duplicate manifest entry fails config loading.
#[test]
fn test_invalid_config_is_rejected() {
    let env = TestEnv::new();
    let config = env.path("polystage.json");
    std::fs::write(&config, r#"{ "manifest": ["A", "A"] }"#).unwrap();

    env.cmd(&config)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than once"));
}

/// Test a full run against an existing tree and build.
#[cfg(unix)]
#[test]
fn test_run_stages_prebuilt_artifacts() {
    let env = TestEnv::new();
    // git would fail, but the tree already exists so it is never called.
    let config = env.write_config("false", "true", &["A", "B", "C"]);
    env.seed_build(&["A", "B", "C"]);

    env.cmd(&config)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged 3 artifacts"));

    assert_eq!(listing(&env.path("py_polyhedral/bin")), ["A", "B", "C"]);
    assert_eq!(
        std::fs::read(env.path("py_polyhedral/bin/B")).unwrap(),
        std::fs::read(env.path("cpp_code_repo/build/B")).unwrap()
    );
}

/// Test that a missing artifact aborts after staging earlier ones.
#[cfg(unix)]
#[test]
fn test_run_fails_on_missing_artifact_and_keeps_partial_stage() {
    let env = TestEnv::new();
    let config = env.write_config("false", "true", &["A", "B", "C"]);
    env.seed_build(&["A", "C"]);

    env.cmd(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("B was not found"));

    assert_eq!(listing(&env.path("py_polyhedral/bin")), ["A"]);
}

/// Test that a pipeline failure is reported once, not logged and reported.
#[cfg(unix)]
#[test]
fn test_run_failure_is_reported_once() {
    let env = TestEnv::new();
    let config = env.write_config("false", "true", &["A", "B"]);
    env.seed_build(&["A"]);

    env.cmd(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::function(|err: &str| {
            err.matches("B was not found").count() == 1
        }));
}

/// Test that a failed clone aborts before anything is built.
#[cfg(unix)]
#[test]
fn test_run_fails_when_clone_fails() {
    let env = TestEnv::new();
    let config = env.write_config("false", "true", &["A"]);

    env.cmd(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("acquire"));

    assert!(!env.path("py_polyhedral").exists());
}

/// Test that a failed configure aborts before staging.
#[cfg(unix)]
#[test]
fn test_run_fails_when_configure_fails() {
    let env = TestEnv::new();
    let config = env.write_config("false", "false", &["A"]);
    env.seed_build(&["A"]);

    env.cmd(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configure"));

    assert!(!env.path("py_polyhedral").exists());
}

/// Test that --dest wins over the config file.
#[cfg(unix)]
#[test]
fn test_dest_flag_overrides_config() {
    let env = TestEnv::new();
    let config = env.write_config("false", "true", &["A"]);
    env.seed_build(&["A"]);

    env.cmd(&config)
        .arg("--dest")
        .arg(env.path("elsewhere"))
        .arg("stage")
        .assert()
        .success();

    assert_eq!(listing(&env.path("elsewhere")), ["A"]);
    assert!(!env.path("py_polyhedral").exists());
}

/// Test clean on the build directory, then on nothing.
#[test]
fn test_clean_removes_build_dir_only() {
    let env = TestEnv::new();
    let config = env.write_config("git", "cmake", &["A"]);
    env.seed_build(&["A"]);

    env.cmd(&config)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned"));

    assert!(!env.path("cpp_code_repo/build").exists());
    assert!(env.path("cpp_code_repo").exists());

    env.cmd(&config)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean"));
}

/// Test that a failed clean names the path it could not remove.
#[test]
fn test_clean_failure_names_path() {
    let env = TestEnv::new();
    let config = env.write_config("git", "cmake", &["A"]);
    std::fs::create_dir_all(env.path("cpp_code_repo")).unwrap();
    std::fs::write(env.path("cpp_code_repo/build"), "not a dir").unwrap();

    env.cmd(&config)
        .arg("clean")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to remove").and(
            predicate::str::contains(env.path("cpp_code_repo/build").display().to_string()),
        ));
}
