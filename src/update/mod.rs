//! Installing a verified build and handing off to it
//!
//! [`Updater`] drives the whole flow; [`Patcher`] and [`Handoff`] are usable
//! on their own by programs that manage the steps themselves.

pub mod executable;
pub mod handoff;
pub mod patcher;
pub mod permissions;
pub mod updater;

pub use handoff::{Handoff, HandoffMode, HandoffResult};
pub use patcher::{cleanup_stale, Patcher};
pub use permissions::{platform_permissions, ChmodCommand, MakeExecutable, ModeBits, NoPermissions};
pub use updater::{auto_update, UpdateOutcome, Updater};
