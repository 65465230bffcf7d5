//! Configuration for the update flow
//!
//! Settings live in an explicit [`UpdateConfig`] value, optionally loaded
//! from ~/.selfupdate/config.toml

pub mod update_config;

pub use update_config::{AssetTemplate, UpdateConfig, UpdateConfigBuilder, DEFAULT_ASSET_TEMPLATE};
