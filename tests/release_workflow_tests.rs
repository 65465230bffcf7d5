//! Publish-then-install workflow over the in-memory release backend

use pretty_assertions::assert_eq;
use selfupdate::crypto::{generate_keys, Signer, Verifier};
use selfupdate::release::{Checker, Downloader, MemoryBackend, ReleaseSource, Uploader};
use selfupdate::update::{NoPermissions, Patcher, UpdateOutcome, Updater};
use selfupdate::{Context, UpdateConfig, UpdateDecision, UpdateError};
use std::fs;
use std::io::{Cursor, Read};
use tempfile::TempDir;

const NAME: &str = "tool";

fn publish(source: &ReleaseSource<MemoryBackend>, signer: &Signer, asset: &str, tag: &str, payload: &[u8]) {
    let ctx = Context::background();
    if !source.exists(&ctx, tag).unwrap() {
        source.release(&ctx, tag, tag, &format!("release {}", tag)).unwrap();
    }
    let signed = signer.sign(Cursor::new(payload.to_vec()));
    source.upload(&ctx, asset, tag, Box::new(signed)).unwrap();
}

fn config_for(dir: &TempDir, public_key: selfupdate::PublicKey, current: &str) -> UpdateConfig {
    UpdateConfig::builder()
        .repository("acme", NAME)
        .name(NAME)
        .public_key(public_key)
        .current_version(current)
        .target(dir.path().join(NAME))
        .build()
        .unwrap()
}

fn updater(source: ReleaseSource<MemoryBackend>, config: UpdateConfig) -> Updater<ReleaseSource<MemoryBackend>> {
    Updater::new(source, config).with_patcher(Patcher::with_permissions(Box::new(NoPermissions)))
}

#[test]
fn test_check_semantics() {
    let (_, private) = generate_keys();
    let signer = Signer::new(private);
    let source = ReleaseSource::new(MemoryBackend::new());
    let ctx = Context::background();
    let asset = "tool-linux-x86_64.sign";

    publish(&source, &signer, asset, "1.0.0", b"one");
    assert_eq!(source.check(&ctx, asset, "1.0.0").unwrap(), UpdateDecision::UpToDate);

    publish(&source, &signer, asset, "1.1.0", b"two");
    match source.check(&ctx, asset, "1.0.0").unwrap() {
        UpdateDecision::Available(new) => {
            assert_eq!(new.version, "1.1.0");
            assert_eq!(new.description, "release 1.1.0");
        },
        other => panic!("expected an update, got {:?}", other),
    }

    let newest = source
        .check(&ctx, asset, "1.0.0")
        .and_then(UpdateDecision::into_available)
        .map(|new| new.version);
    assert_eq!(newest.unwrap(), "1.1.0");
    let err = source
        .check(&ctx, asset, "1.1.0")
        .and_then(UpdateDecision::into_available)
        .unwrap_err();
    assert!(matches!(err, UpdateError::NoNewerVersion));
}

#[test]
fn test_assets_are_stored_compressed() {
    let (_, private) = generate_keys();
    let signer = Signer::new(private);
    let source = ReleaseSource::new(MemoryBackend::new());
    let payload = vec![0u8; 256 * 1024];

    publish(&source, &signer, "a.sign", "1.0.0", &payload);
    let stored = source.backend().raw_asset("1.0.0", "a.sign").unwrap();
    assert!(stored.len() < payload.len() / 10);

    let mut downloaded = Vec::new();
    source
        .download(&Context::background(), "a.sign", "1.0.0")
        .unwrap()
        .read_to_end(&mut downloaded)
        .unwrap();
    // signature block plus payload
    assert_eq!(downloaded.len(), payload.len() + 96);
}

#[test]
fn test_update_installs_verified_build() {
    let (public, private) = generate_keys();
    let signer = Signer::new(private);
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, public, "1.0.0");
    fs::write(dir.path().join(NAME), b"build 1.0.0").unwrap();

    let source = ReleaseSource::new(MemoryBackend::new());
    publish(&source, &signer, &config.asset_name(), "1.0.0", b"build 1.0.0");
    publish(&source, &signer, &config.asset_name(), "1.2.0", b"build 1.2.0");

    let outcome = updater(source, config).run(&Context::background()).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Installed {
            version: "1.2.0".to_string(),
            path: dir.path().join(NAME),
        }
    );
    assert_eq!(fs::read(dir.path().join(NAME)).unwrap(), b"build 1.2.0");
}

#[test]
fn test_update_when_current() {
    let (public, private) = generate_keys();
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, public, "2.0.0");

    let source = ReleaseSource::new(MemoryBackend::new());
    publish(&source, &Signer::new(private), &config.asset_name(), "2.0.0", b"same");

    let outcome = updater(source, config).run(&Context::background()).unwrap();
    assert_eq!(outcome, UpdateOutcome::UpToDate);
    assert!(!dir.path().join(NAME).exists());
}

#[test]
fn test_update_signed_with_other_key_is_not_installed() {
    let (public, _) = generate_keys();
    let (_, attacker) = generate_keys();
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, public, "1.0.0");
    fs::write(dir.path().join(NAME), b"trusted").unwrap();

    let source = ReleaseSource::new(MemoryBackend::new());
    publish(&source, &Signer::new(attacker), &config.asset_name(), "9.0.0", b"malicious");

    let err = updater(source, config).run(&Context::background()).unwrap_err();
    assert!(err.is_security_event());
    assert_eq!(fs::read(dir.path().join(NAME)).unwrap(), b"trusted");
}

#[test]
fn test_update_with_corrupted_asset_is_not_installed() {
    let (public, private) = generate_keys();
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, public, "1.0.0");
    fs::write(dir.path().join(NAME), b"trusted").unwrap();

    let source = ReleaseSource::new(MemoryBackend::new());
    let asset = config.asset_name();
    publish(&source, &Signer::new(private), &asset, "1.1.0", b"genuine build");

    let mut stored = source.backend().raw_asset("1.1.0", &asset).unwrap();
    let last = stored.len() - 1;
    stored[last] ^= 0xff;
    source.backend().set_raw_asset("1.1.0", &asset, stored).unwrap();

    let err = updater(source, config).run(&Context::background()).unwrap_err();
    assert!(matches!(
        err,
        UpdateError::Compression { .. } | UpdateError::VerificationFailed
    ));
    assert_eq!(fs::read(dir.path().join(NAME)).unwrap(), b"trusted");
}

#[test]
fn test_corrupted_frame_header_reports_compression_error() {
    let (public, private) = generate_keys();
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, public, "1.0.0");
    fs::write(dir.path().join(NAME), b"trusted").unwrap();

    let source = ReleaseSource::new(MemoryBackend::new());
    let asset = config.asset_name();
    publish(&source, &Signer::new(private), &asset, "1.1.0", b"genuine build");

    let mut stored = source.backend().raw_asset("1.1.0", &asset).unwrap();
    stored[0] ^= 0xff;
    source.backend().set_raw_asset("1.1.0", &asset, stored).unwrap();

    let downloaded = source.download(&Context::background(), &asset, "1.1.0").unwrap();
    let mut out = Vec::new();
    let err = Verifier::new(public)
        .verify(downloaded)
        .read_to_end(&mut out)
        .map_err(UpdateError::from)
        .unwrap_err();
    assert!(matches!(err, UpdateError::Compression { .. }), "got {:?}", err);
    assert!(out.is_empty());

    let err = updater(source, config).run(&Context::background()).unwrap_err();
    assert!(matches!(err, UpdateError::Compression { .. }), "got {:?}", err);
    assert_eq!(fs::read(dir.path().join(NAME)).unwrap(), b"trusted");
}

#[test]
fn test_cancelled_update_touches_nothing() {
    let (public, private) = generate_keys();
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, public, "1.0.0");

    let source = ReleaseSource::new(MemoryBackend::new());
    publish(&source, &Signer::new(private), &config.asset_name(), "1.1.0", b"new");

    let ctx = Context::background();
    ctx.cancel();
    let err = updater(source, config).run(&ctx).unwrap_err();
    assert!(matches!(err, UpdateError::Cancelled));
    assert!(!dir.path().join(NAME).exists());
}
