//! Core data types shared by the release source and the updater

use crate::core::error::{Result, UpdateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named binary object attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Backing-store identifier, opaque to the core
    pub id: u64,
    /// Unique within its release
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// A tagged publication record owning zero or more assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Find an asset by exact name
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Outcome of a successful check: a newer build exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVersion {
    pub version: String,
    pub description: String,
}

/// Transient result of asking the release service for something newer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    UpToDate,
    Available(NewVersion),
}

impl UpdateDecision {
    /// The new version, or `NoNewerVersion` when already up to date
    pub fn into_available(self) -> Result<NewVersion> {
        match self {
            UpdateDecision::Available(new) => Ok(new),
            UpdateDecision::UpToDate => Err(UpdateError::NoNewerVersion),
        }
    }
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateDecision::UpToDate => write!(f, "up to date"),
            UpdateDecision::Available(new) => write!(f, "{} available", new.version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_lookup_is_exact() {
        let release = Release {
            id: 1,
            tag: "1.0.0".to_string(),
            name: None,
            body: String::new(),
            assets: vec![Asset {
                id: 7,
                name: "tool-linux-amd64.sign".to_string(),
                size: 10,
            }],
        };

        assert_eq!(release.asset("tool-linux-amd64.sign").map(|a| a.id), Some(7));
        assert!(release.asset("tool-linux-amd64").is_none());
    }
}
