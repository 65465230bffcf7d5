//! selfupdate CLI
//!
//! Command-line interface for signing, publishing and installing updates.

use anyhow::Result;
use clap::Parser;
use selfupdate::cli::context::CliContext;
use selfupdate::cli::{commands, Cli, Commands, CryptoCommands, GithubCommands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean data channel
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();

    CliContext::set(CliContext {
        yes: cli.yes,
        non_interactive: !atty::is(atty::Stream::Stdin),
        config_path: cli.config.clone(),
    });

    // Execute the command
    match cli.command {
        Commands::Crypto { command } => match command {
            CryptoCommands::Keys { out_dir, force, json } => commands::keys::execute(out_dir, force, json),
            CryptoCommands::Sign { private_key, key_file } => commands::sign::execute(private_key, key_file),
            CryptoCommands::Verify { public_key, key_file } => commands::verify::execute(public_key, key_file),
        },
        Commands::Github { command } => match command {
            GithubCommands::Check {
                repo,
                current_version,
                json,
            } => commands::check::execute(repo, current_version, json),
            GithubCommands::Release {
                repo,
                version,
                title,
                body,
                sign,
                private_key,
                input,
            } => commands::release::execute(repo, version, title, body, sign, private_key, input),
            GithubCommands::Download {
                repo,
                version,
                verify,
                public_key,
                output,
                progress,
            } => commands::download::execute(repo, version, verify, public_key, output, progress),
        },
        Commands::Update {
            repo,
            public_key,
            current_version,
            target,
            check_only,
            detach,
            run_args,
        } => commands::update::execute(repo, public_key, current_version, target, check_only, detach, run_args),
    }
}
