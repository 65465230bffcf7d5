//! Key generation command implementation

use super::{PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
use crate::crypto::generate_keys;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the crypto keys command
pub fn execute(out_dir: PathBuf, force: bool, json: bool) -> Result<()> {
    let public_path = out_dir.join(PUBLIC_KEY_FILE);
    let private_path = out_dir.join(PRIVATE_KEY_FILE);

    if !force {
        for path in [&public_path, &private_path] {
            if path.exists() {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite",
                    path.display()
                );
            }
        }
    }

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let (public_key, private_key) = generate_keys();
    std::fs::write(&public_path, public_key.to_hex())?;
    write_private(&private_path, &private_key.to_hex())?;

    if json {
        let output = serde_json::json!({
            "public_key": public_key.to_hex(),
            "public_key_file": public_path,
            "private_key_file": private_path,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} Generated key pair", "✓".green());
        println!("  {} Public key:  {}", "•".cyan(), public_path.display());
        println!("  {} Private key: {}", "•".cyan(), private_path.display());
        println!();
        println!("{}", "Keep the private key secret; ship the public key with your binary.".yellow());
    }

    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, hex: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(hex.as_bytes())?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, hex: &str) -> Result<()> {
    std::fs::write(path, hex)?;
    Ok(())
}
