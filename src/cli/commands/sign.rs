//! Sign command implementation

use super::load_private_key;
use crate::crypto::Signer;
use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;

/// Execute the crypto sign command: stdin to signed stdout
pub fn execute(private_key: Option<String>, key_file: Option<PathBuf>) -> Result<()> {
    let key = load_private_key(private_key.as_deref(), key_file.as_deref())?;

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut signed = Signer::new(key).sign(stdin);
    let written = io::copy(&mut signed, &mut stdout).map_err(crate::UpdateError::from)?;
    stdout.flush()?;

    tracing::debug!(bytes = written, "signed stream written");
    Ok(())
}
