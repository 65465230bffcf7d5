//! Update command implementation

use super::{command_context, load_public_key, resolve_config};
use crate::cli::context::CliContext;
use crate::cli::RepoArgs;
use crate::core::UpdateDecision;
use crate::release::github_source;
use crate::update::{cleanup_stale, Handoff, HandoffMode, HandoffResult, Updater};
use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use std::ffi::OsString;
use std::path::PathBuf;

/// Execute the update command
#[allow(clippy::too_many_arguments)]
pub fn execute(
    repo: RepoArgs,
    public_key: Option<String>,
    current_version: Option<String>,
    target: Option<PathBuf>,
    check_only: bool,
    detach: bool,
    run_args: Vec<OsString>,
) -> Result<()> {
    let mut config = resolve_config(&repo)?;
    if let Some(hex) = public_key.as_deref() {
        config.public_key = Some(load_public_key(Some(hex), None)?);
    }
    if config.public_key.is_none() {
        anyhow::bail!("No public key. Use --public-key or set SELF_UPDATE_PUBLIC_KEY");
    }
    if let Some(version) = current_version {
        config.current_version = version;
    }
    if config.current_version.is_empty() {
        config.current_version = crate::VERSION.to_string();
    }
    if let Some(path) = target {
        config.target = Some(path);
    }
    if detach {
        config.handoff = HandoffMode::Detach;
    }
    let mode = config.handoff;

    let source = github_source(&config.owner, &config.repo, config.token.as_deref())?;
    let ctx = command_context(&config);
    let updater = Updater::new(source, config);
    let install_path = updater.target()?;
    cleanup_stale(&install_path);

    println!("{}", "Checking for updates...".bright_blue());
    let new = match updater.check(&ctx)? {
        UpdateDecision::UpToDate => {
            println!(
                "{} You're running the latest version: {}",
                "✓".green(),
                updater.config().current_version.bright_green()
            );
            return Ok(());
        },
        UpdateDecision::Available(new) => new,
    };

    println!(
        "{} Update available: {} → {}",
        "•".bright_yellow(),
        updater.config().current_version.dimmed(),
        new.version.bright_green().bold()
    );
    if !new.description.trim().is_empty() {
        println!();
        println!("{}", "Release Notes:".bright_cyan().bold());
        println!("{}", new.description.trim());
    }

    if check_only {
        return Ok(());
    }

    println!();
    let should_update = if CliContext::is_yes() {
        true
    } else if CliContext::is_non_interactive() {
        false // Don't install in non-interactive mode unless --yes
    } else {
        Confirm::new()
            .with_prompt(format!("Install {} to {}?", new.version, install_path.display()))
            .default(true)
            .interact()?
    };

    if !should_update {
        println!("Update cancelled.");
        return Ok(());
    }

    let path = updater.install(&ctx, &new)?;
    println!(
        "{} Installed {} to {}",
        "✓".green(),
        new.version.bright_green().bold(),
        path.display()
    );

    if run_args.is_empty() {
        return Ok(());
    }

    match Handoff::new(path, mode).args(run_args).run()? {
        HandoffResult::Started { pid } => {
            println!("  {} Started new build (pid {})", "•".cyan(), pid);
            Ok(())
        },
        exited @ HandoffResult::Exited { .. } => std::process::exit(exited.exit_code()),
    }
}
