//! The check, download, verify, patch and hand-off flow

use crate::config::UpdateConfig;
use crate::core::context::Context;
use crate::core::error::{Result, UpdateError};
use crate::core::types::{NewVersion, UpdateDecision};
use crate::crypto::verifier::Verifier;
use crate::release::{Checker, Downloader};
use crate::update::executable;
use crate::update::handoff::{Handoff, HandoffResult};
use crate::update::patcher::{self, Patcher};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    Installed { version: String, path: PathBuf },
}

/// Drives one update against a release source
pub struct Updater<S> {
    source: S,
    config: UpdateConfig,
    patcher: Patcher,
}

impl<S> Updater<S>
where
    S: Checker + Downloader,
{
    pub fn new(source: S, config: UpdateConfig) -> Self {
        Self {
            source,
            config,
            patcher: Patcher::new(),
        }
    }

    pub fn with_patcher(mut self, patcher: Patcher) -> Self {
        self.patcher = patcher;
        self
    }

    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Install path: the configured target or the running executable
    pub fn target(&self) -> Result<PathBuf> {
        match &self.config.target {
            Some(path) => Ok(path.clone()),
            None => executable::current_path(),
        }
    }

    /// Ask the source whether something newer than the running build exists
    pub fn check(&self, ctx: &Context) -> Result<UpdateDecision> {
        self.source
            .check(ctx, &self.config.asset_name(), &self.config.current_version)
    }

    /// Download, verify and install `new` over the target.
    ///
    /// The target is only replaced after the whole payload has been verified.
    pub fn install(&self, ctx: &Context, new: &NewVersion) -> Result<PathBuf> {
        let public_key = self
            .config
            .public_key
            .ok_or_else(|| UpdateError::configuration("a public key is required to install updates"))?;
        let target = self.target()?;
        info!(
            from = %self.config.current_version,
            to = %new.version,
            target = %target.display(),
            "installing update"
        );

        let stream = self.source.download(ctx, &self.config.asset_name(), &new.version)?;
        let verified = Verifier::new(public_key).verify(stream);
        self.patcher.patch(&target, verified)?;
        Ok(target)
    }

    /// Check for a newer release and install it when there is one
    pub fn run(&self, ctx: &Context) -> Result<UpdateOutcome> {
        if self.config.public_key.is_none() {
            return Err(UpdateError::configuration("a public key is required to install updates"));
        }

        match self.check(ctx)? {
            UpdateDecision::UpToDate => {
                info!(version = %self.config.current_version, "already up to date");
                Ok(UpdateOutcome::UpToDate)
            },
            UpdateDecision::Available(new) => {
                let path = self.install(ctx, &new)?;
                Ok(UpdateOutcome::Installed {
                    version: new.version,
                    path,
                })
            },
        }
    }

    /// Run, and on a fresh install start the new build with this process's
    /// arguments.
    ///
    /// Returns the exit code the caller should terminate with, or `None` when
    /// nothing was installed.
    pub fn run_and_handoff(&self, ctx: &Context) -> Result<Option<i32>> {
        match self.run(ctx)? {
            UpdateOutcome::UpToDate => Ok(None),
            UpdateOutcome::Installed { path, .. } => {
                let handoff = Handoff::new(path, self.config.handoff).args(std::env::args_os().skip(1));
                let result = handoff.run()?;
                if let HandoffResult::Started { pid } = result {
                    info!(pid, "new build started");
                }
                Ok(Some(result.exit_code()))
            },
        }
    }
}

/// Best-effort update for host programs, meant to run first thing in `main`.
///
/// Does nothing for builds without a version. Failures are logged and the
/// current build keeps running; after a successful install the process exits
/// with the new build's exit code.
pub fn auto_update(config: &UpdateConfig) {
    if config.current_version.is_empty() {
        return;
    }

    match executable::current_path() {
        Ok(path) => patcher::cleanup_stale(&path),
        Err(err) => warn!(error = %err, "could not locate running executable"),
    }
    if let Some(target) = &config.target {
        patcher::cleanup_stale(target);
    }

    let ctx = match config.timeout() {
        Some(timeout) => Context::with_timeout(timeout),
        None => Context::background(),
    };

    let source = match crate::release::github_source(&config.owner, &config.repo, config.token.as_deref()) {
        Ok(source) => source,
        Err(err) => {
            warn!(error = %err, "self-update disabled");
            return;
        },
    };

    match Updater::new(source, config.clone()).run_and_handoff(&ctx) {
        Ok(Some(code)) => std::process::exit(code),
        Ok(None) => {},
        Err(err) if err.is_security_event() => {
            error!(error = %err, "downloaded update failed verification; keeping current build");
        },
        Err(err) => warn!(error = %err, "self-update failed; keeping current build"),
    }
}
