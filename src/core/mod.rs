//! Core types and utilities for the update pipeline
//!
//! This module contains the fundamental data types, error handling,
//! version ordering and hashing used throughout the system.

pub mod context;
pub mod error;
pub mod hash;
pub mod types;
pub mod version;

// Re-export commonly used items
pub use context::Context;
pub use error::{Result, UpdateError};
pub use hash::{sha256, Digest, HashingReader, DIGEST_SIZE};
pub use types::{Asset, NewVersion, Release, UpdateDecision};
