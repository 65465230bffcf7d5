//! Update configuration
//!
//! One explicit value built at process start and passed to every component.
//! It can be loaded from `~/.selfupdate/config.toml`; every field is optional
//! in the file so command-line flags can fill in the rest.

use crate::core::error::{Result, UpdateError};
use crate::crypto::keys::PublicKey;
use crate::update::handoff::HandoffMode;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default asset naming: `<name>-<os>-<arch>.sign`
pub const DEFAULT_ASSET_TEMPLATE: &str = "{name}-{os}-{arch}.sign";

/// Asset file name with `{name}`, `{os}` and `{arch}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetTemplate(String);

impl Default for AssetTemplate {
    fn default() -> Self {
        Self(DEFAULT_ASSET_TEMPLATE.to_string())
    }
}

impl AssetTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Whether rendering depends on the program name
    pub fn uses_name(&self) -> bool {
        self.0.contains("{name}")
    }

    /// Asset name for the running platform
    pub fn render(&self, name: &str) -> String {
        self.render_for(name, std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn render_for(&self, name: &str, os: &str, arch: &str) -> String {
        self.0
            .replace("{name}", name)
            .replace("{os}", os)
            .replace("{arch}", arch)
    }
}

impl fmt::Display for AssetTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the update flow needs to know
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Release service token; anonymous access when unset
    pub token: Option<String>,
    /// Program name substituted into the asset template
    pub name: String,
    pub asset: AssetTemplate,
    /// Version of the running build. Empty disables automatic updates.
    pub current_version: String,
    /// Install path; the running executable when unset
    pub target: Option<PathBuf>,
    pub public_key: Option<PublicKey>,
    pub handoff: HandoffMode,
    /// Overall budget for network calls, in seconds
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for UpdateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("asset", &self.asset)
            .field("current_version", &self.current_version)
            .field("target", &self.target)
            .field("public_key", &self.public_key)
            .field("handoff", &self.handoff)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl UpdateConfig {
    pub fn builder() -> UpdateConfigBuilder {
        UpdateConfigBuilder::default()
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|err| match err {
            UpdateError::Configuration { reason } => UpdateError::configuration(format!(
                "{}: {}",
                path.display(),
                reason
            )),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| UpdateError::configuration(e.to_string()))
    }

    /// Load the default config file, or `None` when there is none
    pub fn load_default() -> Result<Option<Self>> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    /// `~/.selfupdate/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or(UpdateError::HomeDirectoryNotFound)?;
        Ok(user_dirs.home_dir().join(".selfupdate").join("config.toml"))
    }

    /// Asset name for the running platform
    pub fn asset_name(&self) -> String {
        self.asset.render(&self.name)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check that the fields the update flow relies on are present
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("owner", self.owner.is_empty()),
            ("repo", self.repo.is_empty()),
            ("name", self.name.is_empty()),
            ("public_key", self.public_key.is_none()),
        ]
        .iter()
        .filter(|(_, is_missing)| *is_missing)
        .map(|(field, _)| *field)
        .collect();

        if !missing.is_empty() {
            return Err(UpdateError::configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// Builder for [`UpdateConfig`]
#[derive(Debug, Default)]
pub struct UpdateConfigBuilder {
    config: UpdateConfig,
}

impl UpdateConfigBuilder {
    pub fn repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.config.owner = owner.into();
        self.config.repo = repo.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn asset_template(mut self, template: impl Into<String>) -> Self {
        self.config.asset = AssetTemplate::new(template);
        self
    }

    pub fn current_version(mut self, version: impl Into<String>) -> Self {
        self.config.current_version = version.into();
        self
    }

    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.target = Some(path.into());
        self
    }

    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.config.public_key = Some(key);
        self
    }

    pub fn handoff(mut self, mode: HandoffMode) -> Self {
        self.config.handoff = mode;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn build(self) -> Result<UpdateConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::generate_keys;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_asset_template() {
        let template = AssetTemplate::default();
        assert_eq!(
            template.render_for("tool", "linux", "x86_64"),
            "tool-linux-x86_64.sign"
        );
        assert_eq!(AssetTemplate::new("{name}.bin").render_for("tool", "a", "b"), "tool.bin");
    }

    #[test]
    fn test_builder_validates() {
        let err = UpdateConfig::builder()
            .repository("acme", "tool")
            .name("tool")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("public_key"));

        let (public, _) = generate_keys();
        let config = UpdateConfig::builder()
            .repository("acme", "tool")
            .name("tool")
            .public_key(public)
            .current_version("1.0.0")
            .build()
            .unwrap();
        assert_eq!(config.handoff, HandoffMode::Wait);
    }

    #[test]
    fn test_partial_toml() {
        let (public, _) = generate_keys();
        let content = format!(
            r#"
owner = "acme"
repo = "tool"
name = "tool"
public_key = "{}"
handoff = "detach"
timeout_secs = 30
"#,
            public.to_hex()
        );

        let config = UpdateConfig::from_toml(&content).unwrap();
        assert_eq!(config.owner, "acme");
        assert_eq!(config.public_key, Some(public));
        assert_eq!(config.handoff, HandoffMode::Detach);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.asset, AssetTemplate::default());
        assert!(config.token.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_key_in_toml() {
        let err = UpdateConfig::from_toml(r#"public_key = "abcd""#).unwrap_err();
        assert!(matches!(err, UpdateError::Configuration { .. }));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "owner = 5").unwrap();

        let err = UpdateConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = UpdateConfig::builder().token("ghp_secret").config;
        assert!(!format!("{:?}", config).contains("ghp_secret"));
    }
}
