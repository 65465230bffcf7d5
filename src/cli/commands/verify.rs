//! Verify command implementation

use super::load_public_key;
use crate::crypto::Verifier;
use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;

/// Execute the crypto verify command: signed stdin to payload on stdout.
///
/// A failed check exits non-zero; anything already written is untrusted.
pub fn execute(public_key: Option<String>, key_file: Option<PathBuf>) -> Result<()> {
    let key = load_public_key(public_key.as_deref(), key_file.as_deref())?;

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut payload = Verifier::new(key).verify(stdin);
    let written = io::copy(&mut payload, &mut stdout).map_err(crate::UpdateError::from)?;
    stdout.flush()?;

    tracing::debug!(bytes = written, "verified payload written");
    Ok(())
}
