//! CLI context for storing global options during command execution

use std::cell::RefCell;
use std::path::PathBuf;

thread_local! {
    static CLI_CONTEXT: RefCell<Option<CliContext>> = const { RefCell::new(None) };
}

/// Context containing global CLI options
#[derive(Debug, Clone, Default)]
pub struct CliContext {
    pub yes: bool,
    pub non_interactive: bool,
    pub config_path: Option<PathBuf>,
}

impl CliContext {
    /// Set the global CLI context for the current thread
    pub fn set(context: CliContext) {
        CLI_CONTEXT.with(|c| {
            *c.borrow_mut() = Some(context);
        });
    }

    /// Get the current CLI context
    pub fn get() -> Option<CliContext> {
        CLI_CONTEXT.with(|c| c.borrow().clone())
    }

    pub fn is_yes() -> bool {
        Self::get().map(|ctx| ctx.yes).unwrap_or(false)
    }

    /// True when stdin is not a terminal
    pub fn is_non_interactive() -> bool {
        Self::get().map(|ctx| ctx.non_interactive).unwrap_or(false)
    }

    /// Explicit `--config` file, if any
    pub fn config_path() -> Option<PathBuf> {
        Self::get().and_then(|ctx| ctx.config_path)
    }
}
