//! CLI argument and configuration handling for the release commands.
//!
//! Only paths that fail before any network access are exercised here.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn selfupdate(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("selfupdate").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("SELF_UPDATE_PRIVATE_KEY")
        .env_remove("SELF_UPDATE_PUBLIC_KEY")
        .env_remove("SELF_UPDATE_GH_TOKEN");
    cmd
}

#[test]
fn test_check_requires_repository() {
    let home = TempDir::new().unwrap();

    selfupdate(&home)
        .args(["github", "check", "--name", "tool", "--current-version", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--owner"));
}

#[test]
fn test_release_requires_name_or_asset() {
    let home = TempDir::new().unwrap();

    selfupdate(&home)
        .args(["github", "release", "--owner", "acme", "--repo", "tool", "--version", "1.0.0"])
        .write_stdin("binary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_release_sign_requires_key_before_upload() {
    let home = TempDir::new().unwrap();

    selfupdate(&home)
        .args([
            "github", "release", "--owner", "acme", "--repo", "tool", "--name", "tool", "--version",
            "1.0.0", "--sign",
        ])
        .write_stdin("binary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SELF_UPDATE_PRIVATE_KEY"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("broken.toml");
    fs::write(&config, "owner = [").unwrap();

    selfupdate(&home)
        .args(["--config", config.to_str().unwrap(), "github", "check", "--current-version", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.toml"));
}

#[test]
fn test_default_config_file_supplies_repository() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".selfupdate");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "owner = \"acme\"\nrepo = \"tool\"\n").unwrap();

    // Repository now resolves; the asset name is the next thing missing
    selfupdate(&home)
        .args(["github", "check", "--current-version", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_update_requires_public_key() {
    let home = TempDir::new().unwrap();

    selfupdate(&home)
        .args(["update", "--owner", "acme", "--repo", "tool", "--name", "tool", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("public key"));
}
