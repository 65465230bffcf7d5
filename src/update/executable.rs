//! Locating the running executable

use crate::core::error::Result;
use std::path::PathBuf;

/// Absolute path of the running executable with symlinks resolved
pub fn current_path() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(std::fs::canonicalize(exe)?)
}
