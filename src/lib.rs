//! selfupdate - signed self-updates for command-line programs
//!
//! A program built with selfupdate checks a GitHub repository for a newer
//! release, downloads the asset for its platform, verifies the Ed25519
//! signature in a single streaming pass and replaces its own executable
//! before handing off to the new build.
//!
//! # Core Features
//!
//! - **Streaming signatures**: `signature || digest || payload`, checked while reading
//! - **Version ordering**: segment-wise numeric comparison of release tags
//! - **Release sources**: GitHub Releases, or an in-memory backend for tests
//! - **Lazy compression**: assets travel compressed over a bounded pipe
//! - **Safe patching**: the new build is staged beside the target and renamed into place
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use selfupdate::{auto_update, PublicKey, UpdateConfig};
//!
//! let config = UpdateConfig::builder()
//!     .repository("acme", "tool")
//!     .name("tool")
//!     .current_version(env!("CARGO_PKG_VERSION"))
//!     .public_key(PublicKey::from_hex(
//!         "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
//!     )?)
//!     .build()?;
//!
//! // Returns when there is nothing to do; exits after a successful update
//! auto_update(&config);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod release;
pub mod stream;
pub mod update;

// Re-export commonly used types
pub use core::{
    error::{Result, UpdateError},
    types::{Asset, NewVersion, Release, UpdateDecision},
    Context,
};

pub use config::{AssetTemplate, UpdateConfig};

pub use crypto::{generate_keys, PrivateKey, PublicKey, Signer, Verifier};

pub use release::{Checker, Downloader, GithubBackend, MemoryBackend, ReleaseSource, Uploader};

pub use update::{auto_update, Handoff, HandoffMode, Patcher, UpdateOutcome, Updater};

/// Current version of selfupdate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
