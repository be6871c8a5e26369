//! Integration tests for the command line interface

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod common;

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bundle-acceptance").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("ACCEPTANCE_JUJU")
        .env_remove("ACCEPTANCE_MODEL")
        .env_remove("ACCEPTANCE_SERIES")
        .env_remove("ACCEPTANCE_BUNDLE");
    cmd
}

#[test]
fn test_cli_help_flag() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_subcommand_required() {
    let dir = TempDir::new().unwrap();
    cmd(&dir).assert().failure().code(2);
}

#[test]
fn test_run_help_lists_flags() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--teardown"))
        .stdout(predicate::str::contains("--only"))
        .stdout(predicate::str::contains("--verify-drop"));
}

#[test]
fn test_list_prints_checks_in_order() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            "(?s)components.*hdfs_dir.*yarn_mapreduce.*hive_cli.*beeline",
        )
        .unwrap());
}

#[test]
fn test_validate_default_bundle() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bundle.yaml"), common::BUNDLE).unwrap();

    cmd(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("slave (2 units)"))
        .stdout(predicate::str::contains("6 relations"));
}

#[test]
fn test_validate_bundle_from_config_file() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("deploy");
    std::fs::create_dir(&nested).unwrap();
    std::fs::write(nested.join("hadoop-hive.yaml"), common::BUNDLE).unwrap();
    std::fs::write(
        nested.join("acceptance.toml"),
        "bundle = \"hadoop-hive.yaml\"\n",
    )
    .unwrap();

    cmd(&dir)
        .args(["validate", "-c", "deploy/acceptance.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hadoop-hive.yaml is valid"));
}

#[test]
fn test_validate_missing_role_is_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bundle.yaml"),
        "services:\n  namenode: {charm: cs:trusty/apache-hadoop-namenode, num_units: 1}\n",
    )
    .unwrap();

    cmd(&dir)
        .arg("validate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("missing required roles"));
}

#[test]
fn test_validate_missing_bundle_file() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["validate", "--bundle", "nope.yaml"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot read bundle"));
}

#[test]
fn test_missing_config_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["validate", "--config", "absent.toml"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_unknown_only_is_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bundle.yaml"), common::BUNDLE).unwrap();

    cmd(&dir)
        .args(["check", "--only", "smoke"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unknown check(s): smoke"));
}

#[test]
fn test_missing_juju_binary_is_provisioning_failure() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bundle.yaml"), common::BUNDLE).unwrap();

    cmd(&dir)
        .env("ACCEPTANCE_JUJU", "juju-not-installed-here")
        .arg("check")
        .assert()
        .failure()
        .code(3);
}
