//! Download command implementation

use super::{command_context, load_public_key, resolve_config};
use crate::cli::RepoArgs;
use crate::crypto::Verifier;
use crate::release::{github_source, AssetStream, Downloader};
use crate::UpdateError;
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Execute the github download command
pub fn execute(
    repo: RepoArgs,
    version: String,
    verify: bool,
    public_key: Option<String>,
    output: Option<PathBuf>,
    progress: bool,
) -> Result<()> {
    let config = resolve_config(&repo)?;
    let asset = config.asset_name();
    let key = if verify {
        Some(load_public_key(public_key.as_deref(), None)?)
    } else {
        None
    };

    let source = github_source(&config.owner, &config.repo, config.token.as_deref())?;
    let ctx = command_context(&config);
    let stream = source.download(&ctx, &asset, &version)?;

    let progress_bar = if progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.cyan} {bytes} ({bytes_per_sec}) {msg}",
        )?);
        bar.set_message(asset.clone());
        Some(bar)
    } else {
        None
    };

    let stream: AssetStream = match &progress_bar {
        Some(bar) => Box::new(bar.wrap_read(stream)),
        None => stream,
    };
    let mut stream: Box<dyn Read> = match key {
        Some(key) => Box::new(Verifier::new(key).verify(stream)),
        None => stream,
    };

    let written = match &output {
        Some(path) => write_file(path, &mut stream)?,
        None => {
            let mut stdout = io::stdout().lock();
            let written = io::copy(&mut stream, &mut stdout).map_err(UpdateError::from)?;
            stdout.flush()?;
            written
        },
    };

    if let Some(bar) = progress_bar {
        bar.finish_and_clear();
    }
    if let Some(path) = &output {
        eprintln!(
            "{} Downloaded {} ({} bytes) to {}",
            "✓".green(),
            asset.bold(),
            written,
            path.display()
        );
    }

    Ok(())
}

/// Stage next to `path` so a failed check never leaves a partial file
fn write_file(path: &Path, stream: &mut dyn Read) -> Result<u64> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
    let written = io::copy(stream, &mut temp).map_err(UpdateError::from)?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(written)
}
