//! Launching the replacement process

use crate::core::error::{Result, UpdateError};
use crate::update::executable;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// How the parent relates to the launched child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffMode {
    /// Return as soon as the child is running; its exit code is never seen
    Detach,
    /// Block until the child exits and report its code
    #[default]
    Wait,
}

impl fmt::Display for HandoffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoffMode::Detach => write!(f, "detach"),
            HandoffMode::Wait => write!(f, "wait"),
        }
    }
}

impl std::str::FromStr for HandoffMode {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "detach" => Ok(HandoffMode::Detach),
            "wait" => Ok(HandoffMode::Wait),
            other => Err(UpdateError::configuration(format!("unknown hand-off mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffResult {
    Started { pid: u32 },
    /// `code` is `None` when the child was ended by a signal
    Exited { code: Option<i32> },
}

impl HandoffResult {
    /// Exit code the parent should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            HandoffResult::Started { .. } => 0,
            HandoffResult::Exited { code } => code.unwrap_or(1),
        }
    }
}

/// A program to start with the parent's standard streams
#[derive(Debug, Clone)]
pub struct Handoff {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub mode: HandoffMode,
}

impl Handoff {
    pub fn new(program: impl Into<PathBuf>, mode: HandoffMode) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            mode,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Rerun the current executable with the arguments it was given
    pub fn current_process(mode: HandoffMode) -> Result<Self> {
        Ok(Self::new(executable::current_path()?, mode).args(std::env::args_os().skip(1)))
    }

    pub fn run(&self) -> Result<HandoffResult> {
        info!(program = %self.program.display(), mode = %self.mode, "handing off");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        match self.mode {
            HandoffMode::Detach => {
                let pid = child.id();
                debug!(pid, "child started");
                Ok(HandoffResult::Started { pid })
            },
            HandoffMode::Wait => {
                let status = child.wait()?;
                debug!(status = %status, "child exited");
                Ok(HandoffResult::Exited { code: status.code() })
            },
        }
    }
}
