//! CLI tests for key generation and stdin/stdout signing

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn selfupdate() -> Command {
    let mut cmd = Command::cargo_bin("selfupdate").unwrap();
    cmd.env_remove("SELF_UPDATE_PRIVATE_KEY")
        .env_remove("SELF_UPDATE_PUBLIC_KEY")
        .env_remove("SELF_UPDATE_GH_TOKEN");
    cmd
}

fn generate_keys(dir: &TempDir) -> (String, String) {
    selfupdate()
        .current_dir(dir.path())
        .args(["crypto", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"));

    let public = fs::read_to_string(dir.path().join("selfupdate.pub")).unwrap();
    let private = fs::read_to_string(dir.path().join("selfupdate.key")).unwrap();
    (public, private)
}

#[test]
fn test_keys_are_lowercase_hex() {
    let dir = TempDir::new().unwrap();
    let (public, private) = generate_keys(&dir);

    assert_eq!(public.len(), 64);
    assert_eq!(private.len(), 128);
    for key in [&public, &private] {
        assert!(key.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}

#[test]
fn test_keys_refuse_to_overwrite() {
    let dir = TempDir::new().unwrap();
    generate_keys(&dir);

    selfupdate()
        .current_dir(dir.path())
        .args(["crypto", "keys"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    selfupdate()
        .current_dir(dir.path())
        .args(["crypto", "keys", "--force"])
        .assert()
        .success();
}

#[test]
fn test_sign_then_verify_through_pipes() {
    let dir = TempDir::new().unwrap();
    let (public, private) = generate_keys(&dir);
    let payload = b"#!/bin/sh\necho hello\n".to_vec();

    let signed = selfupdate()
        .args(["crypto", "sign"])
        .env("SELF_UPDATE_PRIVATE_KEY", &private)
        .write_stdin(payload.clone())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(signed.len(), payload.len() + 96);

    selfupdate()
        .args(["crypto", "verify", "--public-key", public.as_str()])
        .write_stdin(signed)
        .assert()
        .success()
        .stdout(payload);
}

#[test]
fn test_verify_with_key_file() {
    let dir = TempDir::new().unwrap();
    generate_keys(&dir);

    let signed = selfupdate()
        .current_dir(dir.path())
        .args(["crypto", "sign", "--key-file", "selfupdate.key"])
        .write_stdin("payload")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    selfupdate()
        .current_dir(dir.path())
        .args(["crypto", "verify", "--key-file", "selfupdate.pub"])
        .write_stdin(signed)
        .assert()
        .success()
        .stdout("payload");
}

#[test]
fn test_verify_rejects_tampered_input() {
    let dir = TempDir::new().unwrap();
    let (public, private) = generate_keys(&dir);

    let mut signed = selfupdate()
        .args(["crypto", "sign", "--private-key", private.as_str()])
        .write_stdin("important payload")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let last = signed.len() - 1;
    signed[last] ^= 0x01;

    selfupdate()
        .args(["crypto", "verify", "--public-key", public.as_str()])
        .write_stdin(signed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Verification failed"));
}

#[test]
fn test_verify_short_input() {
    let dir = TempDir::new().unwrap();
    let (public, _) = generate_keys(&dir);

    selfupdate()
        .args(["crypto", "verify", "--public-key", public.as_str()])
        .write_stdin("too short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Short read"));
}

#[test]
fn test_sign_requires_key() {
    selfupdate()
        .args(["crypto", "sign"])
        .write_stdin("data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SELF_UPDATE_PRIVATE_KEY"));
}

#[test]
fn test_invalid_public_key() {
    selfupdate()
        .args(["crypto", "verify", "--public-key", "abcd"])
        .write_stdin("data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key"));
}
