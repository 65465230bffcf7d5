//! Narrow contract with the hosted release service

use crate::core::context::Context;
use crate::core::error::Result;
use crate::core::types::{Asset, Release};
use serde::Serialize;
use std::io::Read;

/// Owned byte stream handed between pipeline stages
pub type AssetStream = Box<dyn Read + Send>;

/// Request body for a new release record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(rename = "name")]
    pub title: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl NewRelease {
    /// A published (non-draft, non-prerelease) release
    pub fn published(tag: &str, title: &str, body: &str) -> Self {
        Self {
            tag: tag.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            draft: false,
            prerelease: false,
        }
    }
}

/// The operations the core consumes from a release service.
///
/// Implementations perform no retries; every call is checked against `ctx`.
pub trait ReleaseBackend: Send + Sync {
    /// Every release of the repository, in whatever order the service returns
    fn list_releases(&self, ctx: &Context) -> Result<Vec<Release>>;

    fn create_release(&self, ctx: &Context, request: &NewRelease) -> Result<Release>;

    fn delete_asset(&self, ctx: &Context, asset_id: u64) -> Result<()>;

    /// Upload `length` bytes from `content` as asset `name` of `release_id`
    fn upload_asset(
        &self,
        ctx: &Context,
        release_id: u64,
        name: &str,
        content: AssetStream,
        length: u64,
    ) -> Result<Asset>;

    /// Raw (still compressed) asset bytes
    fn download_asset(&self, ctx: &Context, asset_id: u64) -> Result<AssetStream>;
}

impl<B: ReleaseBackend + ?Sized> ReleaseBackend for Box<B> {
    fn list_releases(&self, ctx: &Context) -> Result<Vec<Release>> {
        (**self).list_releases(ctx)
    }

    fn create_release(&self, ctx: &Context, request: &NewRelease) -> Result<Release> {
        (**self).create_release(ctx, request)
    }

    fn delete_asset(&self, ctx: &Context, asset_id: u64) -> Result<()> {
        (**self).delete_asset(ctx, asset_id)
    }

    fn upload_asset(
        &self,
        ctx: &Context,
        release_id: u64,
        name: &str,
        content: AssetStream,
        length: u64,
    ) -> Result<Asset> {
        (**self).upload_asset(ctx, release_id, name, content, length)
    }

    fn download_asset(&self, ctx: &Context, asset_id: u64) -> Result<AssetStream> {
        (**self).download_asset(ctx, asset_id)
    }
}
