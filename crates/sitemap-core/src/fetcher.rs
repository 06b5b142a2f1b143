//! Retrieval of raw sitemap bytes from HTTP(S) URLs and local files.
//!
//! The [`ContentFetcher`] trait is the seam between traversal and transport.
//! [`HttpFetcher`] is the production implementation; tests and embedders can
//! supply their own (for example to serve fixtures from memory or count
//! requests).
//!
//! Fetching does not interpret the body. Automatic response decompression is
//! switched off so that `Content-Type` and `Content-Encoding` reach the
//! [`decode`](crate::decode) step exactly as the server sent them. There are
//! no retries: a single failed attempt is final.

use crate::config::FetchConfig;
use crate::error::TransportCause;
use crate::location::{LocationKind, classify};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName};
use reqwest::{Client, redirect};
use std::path::Path;
use tracing::{debug, instrument};
use url::Url;

/// Where a [`RawContent`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOrigin {
    /// Fetched over HTTP(S); transport headers are meaningful.
    Http,
    /// Read from the local filesystem; there are no transport headers.
    File,
}

/// Undecoded bytes plus the transport metadata needed to decode them.
#[derive(Debug, Clone)]
pub struct RawContent {
    /// Response body or file contents.
    pub body: Vec<u8>,
    /// `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// `Content-Encoding` header, if the server sent one.
    pub content_encoding: Option<String>,
    /// Transport the bytes came from.
    pub origin: ContentOrigin,
}

impl RawContent {
    /// Content read from disk.
    pub const fn from_file(body: Vec<u8>) -> Self {
        Self {
            body,
            content_type: None,
            content_encoding: None,
            origin: ContentOrigin::File,
        }
    }

    /// Content received over HTTP with the given headers.
    pub fn from_http(
        body: Vec<u8>,
        content_type: Option<&str>,
        content_encoding: Option<&str>,
    ) -> Self {
        Self {
            body,
            content_type: content_type.map(ToString::to_string),
            content_encoding: content_encoding.map(ToString::to_string),
            origin: ContentOrigin::Http,
        }
    }
}

/// Capability to fetch the bytes behind a sitemap location.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `location`, following HTTP redirects when `follow_redirects` is set.
    ///
    /// Fails with [`Error::Transport`] when the location is unrecognised,
    /// unreachable, unreadable, or answers with a non-2xx status.
    async fn fetch(&self, location: &str, follow_redirects: bool) -> Result<RawContent>;
}

/// `reqwest`-backed fetcher for URLs, with `tokio::fs` for local files.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    no_redirect_client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with [`FetchConfig::default`].
    pub fn new() -> Result<Self> {
        Self::with_config(&FetchConfig::default())
    }

    /// Creates a fetcher with explicit transport settings.
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(config, redirect::Policy::limited(config.max_redirects))?;
        let no_redirect_client = build_client(config, redirect::Policy::none())?;
        Ok(Self {
            client,
            no_redirect_client,
        })
    }

    async fn fetch_remote(
        &self,
        location: &str,
        url: Url,
        follow_redirects: bool,
    ) -> Result<RawContent> {
        let client = if follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        };

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(location, TransportCause::Request(e)))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Sitemap request failed");
            return Err(Error::transport(
                location,
                TransportCause::Status(status.as_u16()),
            ));
        }

        let content_type = header_value(response.headers(), &CONTENT_TYPE);
        let content_encoding = header_value(response.headers(), &CONTENT_ENCODING);

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(location, TransportCause::Request(e)))?;

        debug!(
            bytes = body.len(),
            content_type = content_type.as_deref().unwrap_or(""),
            content_encoding = content_encoding.as_deref().unwrap_or(""),
            "Fetched sitemap"
        );

        Ok(RawContent::from_http(
            body.to_vec(),
            content_type.as_deref(),
            content_encoding.as_deref(),
        ))
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    #[instrument(skip(self), fields(location = %location))]
    async fn fetch(&self, location: &str, follow_redirects: bool) -> Result<RawContent> {
        match classify(location)? {
            LocationKind::Remote(url) => self.fetch_remote(location, url, follow_redirects).await,
            LocationKind::LocalFile(path) => read_local(location, &path).await,
        }
    }
}

async fn read_local(location: &str, path: &Path) -> Result<RawContent> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| Error::transport(location, TransportCause::Io(e)))?;
    debug!(bytes = body.len(), "Read local sitemap");
    Ok(RawContent::from_file(body))
}

// `HeaderMap` lookups are case-insensitive.
fn header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn build_client(config: &FetchConfig, policy: redirect::Policy) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .redirect(policy)
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}
