//! Release command implementation

use super::{command_context, load_private_key, resolve_config};
use crate::cli::RepoArgs;
use crate::crypto::Signer;
use crate::release::{github_source, AssetStream, Uploader};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the github release command
pub fn execute(
    repo: RepoArgs,
    version: String,
    title: Option<String>,
    body: String,
    sign: bool,
    private_key: Option<String>,
    input: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(&repo)?;
    let asset = config.asset_name();

    // Parse the key before touching the network
    let signer = if sign {
        Some(Signer::new(load_private_key(private_key.as_deref(), None)?))
    } else {
        None
    };

    let content: AssetStream = match &input {
        Some(path) => Box::new(
            std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(std::io::stdin()),
    };
    let content: AssetStream = match signer {
        Some(signer) => Box::new(signer.sign(content)),
        None => content,
    };

    let source = github_source(&config.owner, &config.repo, config.token.as_deref())?;
    let ctx = command_context(&config);

    if source.exists(&ctx, &version)? {
        eprintln!("  {} Release {} exists", "•".cyan(), version);
    } else {
        let title = title.unwrap_or_else(|| version.clone());
        source.release(&ctx, &version, &title, &body)?;
        eprintln!("  {} Created release {}", "✓".green(), version.bright_green());
    }

    source.upload(&ctx, &asset, &version, content)?;
    eprintln!(
        "{} Uploaded {} to {}/{}@{}",
        "✓".green(),
        asset.bold(),
        config.owner,
        config.repo,
        version
    );

    Ok(())
}
