//! Check command implementation

use super::{command_context, resolve_config};
use crate::cli::RepoArgs;
use crate::core::UpdateDecision;
use crate::release::{github_source, Checker};
use anyhow::Result;
use colored::Colorize;

/// Execute the github check command
pub fn execute(repo: RepoArgs, current_version: Option<String>, json: bool) -> Result<()> {
    let mut config = resolve_config(&repo)?;
    if let Some(version) = current_version {
        config.current_version = version;
    }

    let source = github_source(&config.owner, &config.repo, config.token.as_deref())?;
    let ctx = command_context(&config);
    let asset = config.asset_name();
    let decision = source.check(&ctx, &asset, &config.current_version)?;

    if json {
        let output = match &decision {
            UpdateDecision::UpToDate => serde_json::json!({
                "current_version": config.current_version,
                "update_available": false,
            }),
            UpdateDecision::Available(new) => serde_json::json!({
                "current_version": config.current_version,
                "update_available": true,
                "latest_version": new.version,
                "release_notes": new.description,
                "asset": asset,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match decision {
        UpdateDecision::UpToDate => {
            println!(
                "{} No newer release than {}",
                "✓".green(),
                config.current_version.bright_green()
            );
        },
        UpdateDecision::Available(new) => {
            println!(
                "{} Update available: {} → {}",
                "•".bright_yellow(),
                config.current_version.dimmed(),
                new.version.bright_green().bold()
            );
            if !new.description.trim().is_empty() {
                println!();
                println!("{}", "Release Notes:".bright_cyan().bold());
                println!("{}", new.description.trim());
            }
        },
    }

    Ok(())
}
