//! Replace an executable with the bytes of a stream
//!
//! The stream is drained into a temporary sibling of the destination which is
//! only renamed into place once every byte has arrived. A stream error, such
//! as a failed signature check at end of input, leaves the destination as it
//! was.

use crate::core::error::{Result, UpdateError};
use crate::update::permissions::{platform_permissions, MakeExecutable};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Suffix for the previous executable moved aside on Windows
pub const STALE_SUFFIX: &str = "old";

/// Writes streams over executables
#[derive(Debug)]
pub struct Patcher {
    permissions: Box<dyn MakeExecutable>,
}

impl Default for Patcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Patcher {
    pub fn new() -> Self {
        Self::with_permissions(platform_permissions())
    }

    pub fn with_permissions(permissions: Box<dyn MakeExecutable>) -> Self {
        Self { permissions }
    }

    /// Drain `source` into `dest` and make it executable.
    ///
    /// Returns the number of bytes written.
    pub fn patch<R: Read>(&self, dest: &Path, mut source: R) -> Result<u64> {
        let parent = parent_dir(dest)?;
        if !parent.exists() {
            fs::create_dir_all(&parent)?;
        }

        let mut temp = NamedTempFile::new_in(&parent)?;
        debug!(temp = %temp.path().display(), dest = %dest.display(), "staging patch");

        // Dropping `temp` on any error below removes the partial file
        let written = io::copy(&mut source, &mut temp)?;
        temp.flush()?;
        temp.as_file().sync_all()?;
        self.permissions.make_executable(temp.path())?;

        move_aside(dest)?;
        temp.persist(dest).map_err(|err| UpdateError::Io(err.error))?;

        info!(dest = %dest.display(), bytes = written, "executable replaced");
        Ok(written)
    }
}

fn parent_dir(dest: &Path) -> Result<PathBuf> {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        Some(_) => Ok(PathBuf::from(".")),
        None => Err(UpdateError::configuration(format!(
            "{} has no parent directory",
            dest.display()
        ))),
    }
}

/// Path the previous executable is moved to before being replaced
pub fn stale_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".");
    name.push(STALE_SUFFIX);
    PathBuf::from(name)
}

// A running executable can be renamed but not overwritten on Windows
#[cfg(windows)]
fn move_aside(dest: &Path) -> Result<()> {
    if !dest.exists() {
        return Ok(());
    }
    let stale = stale_path(dest);
    if stale.exists() {
        if let Err(err) = fs::remove_file(&stale) {
            warn!(path = %stale.display(), error = %err, "could not remove previous backup");
        }
    }
    fs::rename(dest, &stale)?;
    debug!(from = %dest.display(), to = %stale.display(), "moved running executable aside");
    Ok(())
}

#[cfg(not(windows))]
fn move_aside(_dest: &Path) -> Result<()> {
    Ok(())
}

/// Remove a backup left by a previous patch of `dest`.
///
/// Failures are logged; the backup may still be locked by an old process.
pub fn cleanup_stale(dest: &Path) {
    let stale = stale_path(dest);
    if !stale.exists() {
        return;
    }
    match fs::remove_file(&stale) {
        Ok(()) => debug!(path = %stale.display(), "removed stale executable"),
        Err(err) => warn!(path = %stale.display(), error = %err, "failed to remove stale executable"),
    }
}
