//! Command-line tests for configuration handling.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated home/config directories so the user's real config is never read.
struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    fn agenda(&self) -> Command {
        let mut cmd = Command::cargo_bin("agenda").unwrap();
        cmd.env("HOME", self.temp_dir.path())
            .env("XDG_CONFIG_HOME", self.temp_dir.path().join("config"))
            .env("XDG_DATA_HOME", self.temp_dir.path().join("data"));
        cmd
    }
}

#[test]
fn test_help_lists_check_config() {
    TestEnv::new()
        .agenda()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn test_check_config_without_file_uses_defaults() {
    TestEnv::new()
        .agenda()
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("Personal"))
        .stdout(predicate::str::contains("Work"))
        .stdout(predicate::str::contains("Family"));
}

#[test]
fn test_check_config_reads_categories() {
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
phone_region = "br"
categories = [
    { name = "Pessoal" },
    { name = "Trabalho" },
    { name = "Família" },
]
"#,
    );

    env.agenda()
        .args(["--config", path.to_str().unwrap(), "check-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded configuration from"))
        .stdout(predicate::str::contains("Trabalho"))
        .stdout(predicate::str::contains("Phone region: BR"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let env = TestEnv::new();
    let missing = env.temp_dir.path().join("nope.toml");

    env.agenda()
        .args(["--config", missing.to_str().unwrap(), "check-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn test_key_collision_fails() {
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
[keys.confirm]
confirm = ["y"]
cancel = ["y"]
"#,
    );

    env.agenda()
        .args(["--config", path.to_str().unwrap(), "check-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key binding collision"));
}

#[test]
fn test_duplicate_categories_fail() {
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
categories = [{ name = "Work" }, { name = "work" }]
"#,
    );

    env.agenda()
        .args(["--config", path.to_str().unwrap(), "check-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicates"));
}

#[test]
fn test_unknown_keys_warn_but_load() {
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
vdir = "/tmp/contacts"

[ui.colors]
shadow = [0, 0, 0]
"#,
    );

    env.agenda()
        .args(["--config", path.to_str().unwrap(), "check-config"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown configuration key `vdir`"))
        .stderr(predicate::str::contains("unknown ui.colors entry `shadow`"));
}
