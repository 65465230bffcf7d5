//! Release discovery, retrieval and publication
//!
//! The core consumes three narrow capabilities: [`Checker`] to learn whether
//! something newer exists, [`Downloader`] to fetch an asset as plain bytes and
//! [`Uploader`] to publish one. [`ReleaseSource`] implements all three over a
//! [`ReleaseBackend`], which is the only part that knows about a concrete
//! service.

pub mod backend;
pub mod github;
pub mod memory;
pub mod source;

pub use backend::{AssetStream, NewRelease, ReleaseBackend};
pub use github::{GithubBackend, GithubBackendBuilder};
pub use memory::MemoryBackend;
pub use source::ReleaseSource;

use crate::core::context::Context;
use crate::core::error::Result;
use crate::core::types::UpdateDecision;

/// Ask whether a newer release than `current_version` carries `asset_name`
pub trait Checker {
    fn check(&self, ctx: &Context, asset_name: &str, current_version: &str) -> Result<UpdateDecision>;
}

/// Fetch an asset of a tagged release, already decompressed
pub trait Downloader {
    fn download(&self, ctx: &Context, asset_name: &str, version: &str) -> Result<AssetStream>;
}

/// Publish releases and their assets
pub trait Uploader {
    /// Attach `content` to release `version`, replacing any asset of the same name
    fn upload(&self, ctx: &Context, asset_name: &str, version: &str, content: AssetStream) -> Result<()>;

    fn release(&self, ctx: &Context, tag: &str, title: &str, body: &str) -> Result<()>;

    fn exists(&self, ctx: &Context, tag: &str) -> Result<bool>;
}

/// Release source for a GitHub repository
pub fn github_source(owner: &str, repo: &str, token: Option<&str>) -> Result<ReleaseSource<GithubBackend>> {
    let mut builder = GithubBackend::builder(owner, repo);
    if let Some(token) = token {
        builder = builder.token(token);
    }
    Ok(ReleaseSource::new(builder.build()?))
}
