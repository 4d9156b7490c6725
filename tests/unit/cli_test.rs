//! Integration tests for the azp-audit CLI

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

fn azp_audit() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("azp-audit"))
}

/// Command with config and state isolated under a temp home.
fn isolated(temp: &TempDir) -> assert_cmd::Command {
    let mut cmd = azp_audit();
    cmd.env("HOME", temp.path());
    cmd.env("XDG_CONFIG_HOME", temp.path().join(".config"));
    cmd.env("AZP_AUDIT_HOME", temp.path().join("state"));
    cmd
}

/// Write a settings file into the isolated config dir.
fn write_settings(temp: &TempDir, content: &str) {
    let dir = temp.path().join(".config").join("azp-audit");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn version_is_printed() {
    azp_audit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("azp-audit"));
}

#[test]
fn help_describes_the_tool() {
    azp_audit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("drift"));
}

#[test]
fn no_arguments_shows_usage() {
    azp_audit().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn list_pipeline_files_globs() {
    let temp = TempDir::new().unwrap();
    isolated(&temp)
        .args(["list-pipeline-files", "--globs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("azure-pipelines.yml"))
        .stdout(predicate::str::contains("ansible_collections"));
}

#[test]
fn list_pipeline_files_empty_mirror_is_empty_json() {
    let temp = TempDir::new().unwrap();
    isolated(&temp)
        .args(["--json", "list-pipeline-files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn sync_without_discovery_lists_local_mirror() {
    let temp = TempDir::new().unwrap();
    isolated(&temp).arg("sync").assert().success();
}

#[test]
fn sync_discover_without_tokens_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    isolated(&temp)
        .args(["sync", "--discover"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("credential"));
}

#[test]
fn check_without_reachable_core_repository_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    // The reference repository cannot be cloned, so canonical-state
    // resolution must abort with an error, not a panic.
    write_settings(
        &temp,
        "clone_base = \"/nonexistent-remote\"\nnetwork_timeout_secs = 10\nretry_attempts = 1\n",
    );
    isolated(&temp)
        .args(["check", "matrix"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn invalid_settings_file_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, "concurrency = \"not a number\"\n");
    isolated(&temp).arg("sync").assert().failure();
}
