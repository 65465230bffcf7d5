//! GitHub Releases backend

use crate::core::context::Context;
use crate::core::error::{Result, UpdateError};
use crate::core::types::{Asset, Release};
use crate::release::backend::{AssetStream, NewRelease, ReleaseBackend};
use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{redirect, StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com";

const USER_AGENT: &str = concat!("selfupdate/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const BINARY_MEDIA_TYPE: &str = "application/octet-stream";
const PAGE_SIZE: usize = 100;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    id: u64,
    tag_name: String,
    name: Option<String>,
    body: Option<String>,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    id: u64,
    name: String,
    #[serde(default)]
    size: u64,
}

impl From<GitHubAsset> for Asset {
    fn from(asset: GitHubAsset) -> Self {
        Asset {
            id: asset.id,
            name: asset.name,
            size: asset.size,
        }
    }
}

impl From<GitHubRelease> for Release {
    fn from(release: GitHubRelease) -> Self {
        Release {
            id: release.id,
            tag: release.tag_name,
            name: release.name,
            body: release.body.unwrap_or_default(),
            assets: release.assets.into_iter().map(Asset::from).collect(),
        }
    }
}

/// Builder for [`GithubBackend`]
#[derive(Debug, Clone)]
pub struct GithubBackendBuilder {
    owner: String,
    repo: String,
    token: Option<String>,
    api_url: String,
    upload_url: String,
    client: Option<Client>,
}

impl GithubBackendBuilder {
    /// Bearer token; omit for anonymous read-only access
    pub fn token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    /// Preconfigured client; it must not follow redirects itself
    #[cfg(test)]
    pub(crate) fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<GithubBackend> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(UpdateError::configuration("repository owner and name are required"));
        }

        // Redirects are followed by hand so credentials never leave the API host
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(USER_AGENT)
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(None)
                .redirect(redirect::Policy::none())
                .build()?,
        };

        Ok(GithubBackend {
            api_url: parse_base(&self.api_url)?,
            upload_url: parse_base(&self.upload_url)?,
            owner: self.owner,
            repo: self.repo,
            token: self.token,
            client,
        })
    }
}

fn parse_base(url: &str) -> Result<Url> {
    Url::parse(url.trim_end_matches('/'))
        .map_err(|e| UpdateError::configuration(format!("invalid base URL {}: {}", url, e)))
}

/// Talks to the GitHub REST API for one repository
pub struct GithubBackend {
    owner: String,
    repo: String,
    token: Option<String>,
    api_url: Url,
    upload_url: Url,
    client: Client,
}

impl fmt::Debug for GithubBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubBackend")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url.as_str())
            .finish()
    }
}

impl GithubBackend {
    pub fn builder(owner: impl Into<String>, repo: impl Into<String>) -> GithubBackendBuilder {
        GithubBackendBuilder {
            owner: owner.into(),
            repo: repo.into(),
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            client: None,
        }
    }

    fn endpoint(&self, base: &Url, path: &str) -> Result<Url> {
        let full = format!(
            "{}/repos/{}/{}/{}",
            base.as_str().trim_end_matches('/'),
            self.owner,
            self.repo,
            path
        );
        Url::parse(&full).map_err(|e| UpdateError::internal(format!("bad endpoint {}: {}", full, e)))
    }

    /// Attach auth and API headers, then bound the request by the context
    fn prepare(&self, ctx: &Context, request: RequestBuilder, accept: &str) -> Result<RequestBuilder> {
        ctx.check()?;
        let mut request = request
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(remaining) = ctx.remaining() {
            request = request.timeout(remaining);
        }
        Ok(request)
    }

    fn send(&self, ctx: &Context, request: RequestBuilder) -> Result<Response> {
        let response = self.prepare(ctx, request, JSON_MEDIA_TYPE)?.send()?;
        ensure_success(response)
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!(status = %status, url = %response.url(), "GitHub request failed");
    Err(UpdateError::Http {
        status: status.as_u16(),
        url: response.url().to_string(),
    })
}

/// Where a response redirects to, if anywhere.
///
/// A redirect status without a usable `Location` is an error rather than a
/// silent stop.
pub(crate) fn redirect_target(
    base: &Url,
    status: StatusCode,
    location: Option<&HeaderValue>,
) -> Result<Option<Url>> {
    if !status.is_redirection() {
        return Ok(None);
    }
    let location = location
        .ok_or_else(|| UpdateError::redirect(format!("{} without Location header", status)))?
        .to_str()
        .map_err(|_| UpdateError::redirect("Location header is not valid text"))?;
    let target = base
        .join(location)
        .map_err(|e| UpdateError::redirect(format!("invalid Location {}: {}", location, e)))?;
    match target.scheme() {
        "http" | "https" => Ok(Some(target)),
        other => Err(UpdateError::redirect(format!("unsupported redirect scheme {}", other))),
    }
}

impl ReleaseBackend for GithubBackend {
    fn list_releases(&self, ctx: &Context) -> Result<Vec<Release>> {
        let url = self.endpoint(&self.api_url, "releases")?;
        let mut releases = Vec::new();

        for page in 1.. {
            let request = self
                .client
                .get(url.clone())
                .query(&[("per_page", PAGE_SIZE), ("page", page)]);
            let batch: Vec<GitHubRelease> = self.send(ctx, request)?.json()?;
            let count = batch.len();
            trace!(page, count, "fetched release page");
            releases.extend(batch.into_iter().map(Release::from));
            if count < PAGE_SIZE {
                break;
            }
        }

        debug!(owner = %self.owner, repo = %self.repo, count = releases.len(), "listed releases");
        Ok(releases)
    }

    fn create_release(&self, ctx: &Context, request: &NewRelease) -> Result<Release> {
        let url = self.endpoint(&self.api_url, "releases")?;
        let created: GitHubRelease = self.send(ctx, self.client.post(url).json(request))?.json()?;
        Ok(created.into())
    }

    fn delete_asset(&self, ctx: &Context, asset_id: u64) -> Result<()> {
        let url = self.endpoint(&self.api_url, &format!("releases/assets/{}", asset_id))?;
        self.send(ctx, self.client.delete(url))?;
        Ok(())
    }

    fn upload_asset(
        &self,
        ctx: &Context,
        release_id: u64,
        name: &str,
        content: AssetStream,
        length: u64,
    ) -> Result<Asset> {
        let url = self.endpoint(&self.upload_url, &format!("releases/{}/assets", release_id))?;
        let request = self
            .client
            .post(url)
            .query(&[("name", name)])
            .header(CONTENT_TYPE, BINARY_MEDIA_TYPE)
            .body(Body::sized(content, length));
        let uploaded: GitHubAsset = self.send(ctx, request)?.json()?;
        Ok(uploaded.into())
    }

    fn download_asset(&self, ctx: &Context, asset_id: u64) -> Result<AssetStream> {
        let url = self.endpoint(&self.api_url, &format!("releases/assets/{}", asset_id))?;
        let response = self
            .prepare(ctx, self.client.get(url.clone()), BINARY_MEDIA_TYPE)?
            .send()?;

        let target = match redirect_target(&url, response.status(), response.headers().get(LOCATION))? {
            Some(target) => target,
            None => return Ok(Box::new(ensure_success(response)?)),
        };

        // Storage hosts reject (and must not see) the API token
        debug!(host = target.host_str().unwrap_or_default(), "following asset redirect");
        ctx.check()?;
        let mut follow = self
            .client
            .get(target.clone())
            .header(ACCEPT, BINARY_MEDIA_TYPE);
        if let Some(remaining) = ctx.remaining() {
            follow = follow.timeout(remaining);
        }
        let response = follow.send()?;
        if redirect_target(&target, response.status(), response.headers().get(LOCATION))?.is_some() {
            return Err(UpdateError::redirect("asset download redirected more than once"));
        }
        Ok(Box::new(ensure_success(response)?))
    }
}
