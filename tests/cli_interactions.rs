//! CLI argument handling and error exit codes

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const PDC_VARS: &[&str] = &[
    "PDC_CONTROLLER",
    "PDC_SECRET",
    "PDC_TIMEOUT_MS",
    "PDC_PROFILE",
    "PDC_CONCURRENCY",
    "PDC_ENABLE_COLOR",
];

/// Command isolated from the caller's environment and working directory
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pdc").unwrap();
    cmd.current_dir(dir.path());
    for var in PDC_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_options_and_environment() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--controller"))
        .stdout(predicate::str::contains("--save"))
        .stdout(predicate::str::contains("PDC_CONTROLLER"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_profile_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--no-color", "-c", "127.0.0.1:1", "-p", "absent.yaml"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn test_profile_directory_is_invalid() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("profiles")).unwrap();

    create_test_cmd(&dir)
        .args(["--no-color", "-c", "127.0.0.1:1", "-p", "profiles"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid profile"));
}

#[test]
fn test_save_requires_profile() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--no-color", "--save"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--save requires a profile"));
}

#[test]
fn test_conflicting_color_flags() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--color", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot specify both --color and --no-color"));
}

#[test]
fn test_invalid_timeout_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--timeout", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Timeout must be greater than 0"));
}

#[test]
fn test_invalid_environment_value() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .env("PDC_CONCURRENCY", "lots")
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PDC_CONCURRENCY"));
}

#[test]
fn test_env_file_is_read_from_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "PDC_TIMEOUT_MS=0\n").unwrap();

    create_test_cmd(&dir)
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Timeout must be greater than 0"));
}

#[test]
fn test_unreachable_controller_exits_with_upstream_code() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--no-color", "-c", "127.0.0.1:1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("UPSTREAM"));
}
