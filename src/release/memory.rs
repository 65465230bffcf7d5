//! In-memory release backend for tests and offline use

use crate::core::context::Context;
use crate::core::error::{Result, UpdateError};
use crate::core::types::{Asset, Release};
use crate::release::backend::{AssetStream, NewRelease, ReleaseBackend};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{Cursor, Read};

#[derive(Debug, Default)]
struct MemoryState {
    releases: Vec<Release>,
    blobs: HashMap<u64, Vec<u8>>,
    next_id: u64,
    calls: usize,
}

impl MemoryState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A release service held entirely in memory.
///
/// Behaves like the hosted service for the operations the core uses,
/// including rejecting duplicate tags and unknown asset ids.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every release
    pub fn releases(&self) -> Vec<Release> {
        self.state.lock().releases.clone()
    }

    /// Stored (compressed) bytes of an asset
    pub fn raw_asset(&self, tag: &str, name: &str) -> Option<Vec<u8>> {
        let state = self.state.lock();
        let release = state.releases.iter().find(|r| r.tag == tag)?;
        let asset = release.asset(name)?;
        state.blobs.get(&asset.id).cloned()
    }

    /// Replace the stored bytes of an asset
    pub fn set_raw_asset(&self, tag: &str, name: &str, bytes: Vec<u8>) -> Result<()> {
        let mut state = self.state.lock();
        let id = state
            .releases
            .iter()
            .find(|r| r.tag == tag)
            .ok_or_else(|| UpdateError::release_not_found(tag))?
            .asset(name)
            .ok_or_else(|| UpdateError::asset_not_found(name, tag))?
            .id;
        state.blobs.insert(id, bytes);
        Ok(())
    }

    /// Number of backend operations served so far
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    fn not_found(what: &str, id: u64) -> UpdateError {
        UpdateError::Http {
            status: 404,
            url: format!("memory://{}/{}", what, id),
        }
    }
}

impl ReleaseBackend for MemoryBackend {
    fn list_releases(&self, ctx: &Context) -> Result<Vec<Release>> {
        ctx.check()?;
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.releases.clone())
    }

    fn create_release(&self, ctx: &Context, request: &NewRelease) -> Result<Release> {
        ctx.check()?;
        let mut state = self.state.lock();
        state.calls += 1;
        if state.releases.iter().any(|r| r.tag == request.tag) {
            return Err(UpdateError::Http {
                status: 422,
                url: format!("memory://releases/{}", request.tag),
            });
        }

        let release = Release {
            id: state.allocate_id(),
            tag: request.tag.clone(),
            name: Some(request.title.clone()),
            body: request.body.clone(),
            assets: Vec::new(),
        };
        state.releases.push(release.clone());
        Ok(release)
    }

    fn delete_asset(&self, ctx: &Context, asset_id: u64) -> Result<()> {
        ctx.check()?;
        let mut state = self.state.lock();
        state.calls += 1;
        if state.blobs.remove(&asset_id).is_none() {
            return Err(Self::not_found("assets", asset_id));
        }
        for release in &mut state.releases {
            release.assets.retain(|asset| asset.id != asset_id);
        }
        Ok(())
    }

    fn upload_asset(
        &self,
        ctx: &Context,
        release_id: u64,
        name: &str,
        mut content: AssetStream,
        length: u64,
    ) -> Result<Asset> {
        ctx.check()?;
        let mut bytes = Vec::with_capacity(length as usize);
        content.read_to_end(&mut bytes)?;
        if bytes.len() as u64 != length {
            return Err(UpdateError::ShortRead {
                expected: length as usize,
                actual: bytes.len(),
            });
        }

        let mut state = self.state.lock();
        state.calls += 1;
        let id = state.allocate_id();
        let release = state
            .releases
            .iter_mut()
            .find(|r| r.id == release_id)
            .ok_or_else(|| Self::not_found("releases", release_id))?;
        if release.asset(name).is_some() {
            return Err(UpdateError::Http {
                status: 422,
                url: format!("memory://releases/{}/assets/{}", release_id, name),
            });
        }

        let asset = Asset {
            id,
            name: name.to_string(),
            size: length,
        };
        release.assets.push(asset.clone());
        state.blobs.insert(id, bytes);
        Ok(asset)
    }

    fn download_asset(&self, ctx: &Context, asset_id: u64) -> Result<AssetStream> {
        ctx.check()?;
        let mut state = self.state.lock();
        state.calls += 1;
        let bytes = state
            .blobs
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| Self::not_found("assets", asset_id))?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}
