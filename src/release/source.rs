//! Release source: check, download and publish over any [`ReleaseBackend`]

use crate::core::context::Context;
use crate::core::error::{Result, UpdateError};
use crate::core::types::{NewVersion, Release, UpdateDecision};
use crate::core::version;
use crate::release::backend::{AssetStream, NewRelease, ReleaseBackend};
use crate::release::{Checker, Downloader, Uploader};
use crate::stream::compress::{compress, decompress};
use std::io::{self, Seek, SeekFrom};
use tracing::{debug, info};

/// Implements the check/download/upload contract against a backend.
///
/// Assets travel compressed; callers only ever see the plain bytes.
#[derive(Debug, Clone)]
pub struct ReleaseSource<B> {
    backend: B,
}

impl<B: ReleaseBackend> ReleaseSource<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn releases(&self, ctx: &Context) -> Result<Vec<Release>> {
        ctx.check()?;
        self.backend.list_releases(ctx)
    }

    fn release_by_tag(&self, ctx: &Context, tag: &str) -> Result<Release> {
        self.releases(ctx)?
            .into_iter()
            .find(|release| release.tag == tag)
            .ok_or_else(|| UpdateError::release_not_found(tag))
    }
}

impl<B: ReleaseBackend> Checker for ReleaseSource<B> {
    fn check(&self, ctx: &Context, asset_name: &str, current_version: &str) -> Result<UpdateDecision> {
        let mut releases = self.releases(ctx)?;
        version::sort_newest_first(&mut releases, |release| release.tag.as_str());

        let newest = match releases.into_iter().next() {
            Some(release) => release,
            None => {
                debug!("no releases published");
                return Ok(UpdateDecision::UpToDate);
            },
        };

        if newest.tag == current_version {
            debug!(newest = %newest.tag, current = %current_version, "already up to date");
            return Ok(UpdateDecision::UpToDate);
        }

        if newest.asset(asset_name).is_none() {
            return Err(UpdateError::asset_not_found(asset_name, &newest.tag));
        }

        info!(newest = %newest.tag, current = %current_version, "newer release available");
        Ok(UpdateDecision::Available(NewVersion {
            version: newest.tag,
            description: newest.body,
        }))
    }
}

impl<B: ReleaseBackend> Downloader for ReleaseSource<B> {
    fn download(&self, ctx: &Context, asset_name: &str, version: &str) -> Result<AssetStream> {
        let release = self.release_by_tag(ctx, version)?;
        let asset = release
            .asset(asset_name)
            .ok_or_else(|| UpdateError::asset_not_found(asset_name, version))?;

        ctx.check()?;
        debug!(asset = %asset.name, id = asset.id, size = asset.size, "downloading asset");
        let raw = self.backend.download_asset(ctx, asset.id)?;
        Ok(Box::new(decompress(raw)))
    }
}

impl<B: ReleaseBackend> Uploader for ReleaseSource<B> {
    fn upload(&self, ctx: &Context, asset_name: &str, version: &str, content: AssetStream) -> Result<()> {
        let release = self.release_by_tag(ctx, version)?;

        // The upload needs a known length, so the compressed bytes are spooled
        // first. A failing source leaves any existing asset in place.
        let mut spool = tempfile::tempfile()?;
        let length = io::copy(&mut compress(content), &mut spool)?;
        spool.seek(SeekFrom::Start(0))?;

        if let Some(existing) = release.asset(asset_name) {
            ctx.check()?;
            info!(asset = %asset_name, tag = %version, "replacing existing asset");
            self.backend.delete_asset(ctx, existing.id)?;
        }

        ctx.check()?;
        let uploaded = self
            .backend
            .upload_asset(ctx, release.id, asset_name, Box::new(spool), length)?;
        info!(asset = %uploaded.name, tag = %version, bytes = length, "asset uploaded");
        Ok(())
    }

    fn release(&self, ctx: &Context, tag: &str, title: &str, body: &str) -> Result<()> {
        ctx.check()?;
        let created = self
            .backend
            .create_release(ctx, &NewRelease::published(tag, title, body))?;
        info!(tag = %created.tag, id = created.id, "release created");
        Ok(())
    }

    fn exists(&self, ctx: &Context, tag: &str) -> Result<bool> {
        Ok(self.releases(ctx)?.iter().any(|release| release.tag == tag))
    }
}
