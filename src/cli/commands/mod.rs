//! CLI command implementations

pub mod check;
pub mod download;
pub mod keys;
pub mod release;
pub mod sign;
pub mod update;
pub mod verify;

// Common utilities for commands
use crate::cli::context::CliContext;
use crate::cli::RepoArgs;
use crate::config::{AssetTemplate, UpdateConfig};
use crate::core::Context;
use crate::crypto::{PrivateKey, PublicKey};
use anyhow::{Context as _, Result};
use std::path::Path;

/// Key files written by `crypto keys`
pub const PUBLIC_KEY_FILE: &str = "selfupdate.pub";
pub const PRIVATE_KEY_FILE: &str = "selfupdate.key";

/// Load the configuration file and lay command-line flags over it
pub fn resolve_config(repo: &RepoArgs) -> Result<UpdateConfig> {
    let mut config = match CliContext::config_path() {
        Some(path) => UpdateConfig::load(&path)?,
        None => UpdateConfig::load_default()?.unwrap_or_default(),
    };

    if let Some(owner) = &repo.owner {
        config.owner = owner.clone();
    }
    if let Some(name) = &repo.repo {
        config.repo = name.clone();
    }
    if let Some(token) = &repo.token {
        config.token = Some(token.clone());
    }
    if let Some(name) = &repo.name {
        config.name = name.clone();
    }
    if let Some(asset) = &repo.asset {
        // An exact name is a template without placeholders
        config.asset = AssetTemplate::new(asset.clone());
    }

    if config.owner.is_empty() || config.repo.is_empty() {
        anyhow::bail!("Repository not set. Use --owner and --repo or set them in the config file");
    }
    if config.asset.uses_name() && config.name.is_empty() {
        anyhow::bail!("Asset name not set. Use --name or --asset");
    }
    Ok(config)
}

/// Parse a public key from a flag value or a key file
pub fn load_public_key(value: Option<&str>, file: Option<&Path>) -> Result<PublicKey> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read public key from {}", path.display()))?;
        return Ok(PublicKey::from_hex(&content)?);
    }
    match value {
        Some(hex) if !hex.trim().is_empty() => Ok(PublicKey::from_hex(hex)?),
        _ => anyhow::bail!("No public key. Use --public-key, --key-file or set SELF_UPDATE_PUBLIC_KEY"),
    }
}

/// Parse a private key from a flag value or a key file
pub fn load_private_key(value: Option<&str>, file: Option<&Path>) -> Result<PrivateKey> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read private key from {}", path.display()))?;
        return Ok(PrivateKey::from_hex(&content)?);
    }
    match value {
        Some(hex) if !hex.trim().is_empty() => Ok(PrivateKey::from_hex(hex)?),
        _ => anyhow::bail!("No private key. Use --private-key, --key-file or set SELF_UPDATE_PRIVATE_KEY"),
    }
}

/// Network budget for a single command
pub fn command_context(config: &UpdateConfig) -> Context {
    match config.timeout() {
        Some(timeout) => Context::with_timeout(timeout),
        None => Context::background(),
    }
}
