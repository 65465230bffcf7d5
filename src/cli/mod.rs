//! Command-line interface for selfupdate

use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

pub mod commands;
pub mod context;

/// selfupdate - signed self-updates from GitHub releases
#[derive(Parser)]
#[command(
    name = "selfupdate",
    version,
    about = "Sign, publish and install self-updating binaries",
    long_about = "selfupdate signs binaries with Ed25519, publishes them as GitHub release assets and installs verified updates in place."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Auto-answer yes to all prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Configuration file (default: ~/.selfupdate/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Key management and stream signing
    Crypto {
        #[command(subcommand)]
        command: CryptoCommands,
    },

    /// GitHub release operations
    Github {
        #[command(subcommand)]
        command: GithubCommands,
    },

    /// Check for, verify and install a newer release
    Update {
        #[command(flatten)]
        repo: RepoArgs,

        /// Hex-encoded public key
        #[arg(long, env = "SELF_UPDATE_PUBLIC_KEY")]
        public_key: Option<String>,

        /// Version of the installed build
        #[arg(long)]
        current_version: Option<String>,

        /// Path to install to (default: this executable)
        #[arg(long)]
        target: Option<PathBuf>,

        /// Only report whether an update is available
        #[arg(long)]
        check_only: bool,

        /// Start the installed build and return without waiting for it
        #[arg(long)]
        detach: bool,

        /// Run the installed build with these arguments after updating
        #[arg(last = true)]
        run_args: Vec<OsString>,
    },
}

#[derive(Subcommand)]
pub enum CryptoCommands {
    /// Generate a key pair as selfupdate.pub and selfupdate.key
    Keys {
        /// Directory to write the key files to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Overwrite existing key files
        #[arg(short, long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign stdin to stdout
    Sign {
        /// Hex-encoded private key
        #[arg(long, env = "SELF_UPDATE_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,

        /// Read the private key from a file instead
        #[arg(long, conflicts_with = "private_key")]
        key_file: Option<PathBuf>,
    },

    /// Verify signed stdin and write the payload to stdout
    Verify {
        /// Hex-encoded public key
        #[arg(long, env = "SELF_UPDATE_PUBLIC_KEY")]
        public_key: Option<String>,

        /// Read the public key from a file instead
        #[arg(long, conflicts_with = "public_key")]
        key_file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum GithubCommands {
    /// Report whether a newer release exists
    Check {
        #[command(flatten)]
        repo: RepoArgs,

        /// Version to compare against
        #[arg(long)]
        current_version: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a release if needed and upload stdin as its asset
    Release {
        #[command(flatten)]
        repo: RepoArgs,

        /// Release tag
        #[arg(long)]
        version: String,

        /// Release title (default: the tag)
        #[arg(long)]
        title: Option<String>,

        /// Release notes
        #[arg(long, default_value = "")]
        body: String,

        /// Sign the input before uploading
        #[arg(long)]
        sign: bool,

        /// Hex-encoded private key used with --sign
        #[arg(long, env = "SELF_UPDATE_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,

        /// Read the asset from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Download a release asset to stdout or a file
    Download {
        #[command(flatten)]
        repo: RepoArgs,

        /// Release tag
        #[arg(long)]
        version: String,

        /// Verify the signature and strip it
        #[arg(long)]
        verify: bool,

        /// Hex-encoded public key used with --verify
        #[arg(long, env = "SELF_UPDATE_PUBLIC_KEY")]
        public_key: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show a progress bar on stderr
        #[arg(long)]
        progress: bool,
    },
}

/// Repository selection shared by the release commands
#[derive(Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// GitHub token
    #[arg(long, env = "SELF_UPDATE_GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Program name used in the asset template
    #[arg(long)]
    pub name: Option<String>,

    /// Exact asset file name, bypassing the template
    #[arg(long)]
    pub asset: Option<String>,
}
