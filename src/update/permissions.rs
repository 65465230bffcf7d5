//! Making a freshly written file executable
//!
//! One implementation per OS family, chosen once by [`platform_permissions`].

use crate::core::error::{Result, UpdateError};
use std::fmt;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Grants execute permission on a file
pub trait MakeExecutable: fmt::Debug + Send + Sync {
    fn make_executable(&self, path: &Path) -> Result<()>;
}

/// Runs the system `chmod +x`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChmodCommand;

impl MakeExecutable for ChmodCommand {
    fn make_executable(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "chmod +x");
        let status = Command::new("chmod").arg("+x").arg(path).status()?;
        if !status.success() {
            return Err(UpdateError::internal(format!(
                "chmod +x {} exited with {}",
                path.display(),
                status
            )));
        }
        Ok(())
    }
}

/// Sets mode bits in-process
#[derive(Debug, Clone, Copy)]
pub struct ModeBits {
    pub mode: u32,
}

impl Default for ModeBits {
    fn default() -> Self {
        Self { mode: 0o755 }
    }
}

impl MakeExecutable for ModeBits {
    #[cfg(unix)]
    fn make_executable(&self, path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(self.mode);
        std::fs::set_permissions(path, perms)?;
        debug!(path = %path.display(), mode = format!("{:o}", self.mode), "permissions set");
        Ok(())
    }

    #[cfg(not(unix))]
    fn make_executable(&self, _path: &Path) -> Result<()> {
        Err(UpdateError::internal("mode bits are not supported on this platform"))
    }
}

/// Executability comes from the file name; nothing to do
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPermissions;

impl MakeExecutable for NoPermissions {
    fn make_executable(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// The permission strategy for the running platform
pub fn platform_permissions() -> Box<dyn MakeExecutable> {
    if cfg!(target_os = "macos") {
        Box::new(ChmodCommand)
    } else if cfg!(unix) {
        Box::new(ModeBits::default())
    } else {
        Box::new(NoPermissions)
    }
}
