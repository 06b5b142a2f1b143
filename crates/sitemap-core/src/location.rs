//! Classification of sitemap locations into remote URLs and local files.

use crate::error::TransportCause;
use crate::{Error, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use url::Url;

#[allow(clippy::unwrap_used)]
static REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\Ahttp").unwrap());

#[allow(clippy::unwrap_used)]
static LOCAL_SITEMAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\\/]sitemap\.xml\z").unwrap());

/// Where the bytes for a location come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationKind {
    /// An `http` or `https` URL.
    Remote(Url),
    /// An existing file whose name is `sitemap.xml` (any case).
    LocalFile(PathBuf),
}

/// Decide how `location` should be fetched.
///
/// A location is remote when it starts with `http` (any case) and parses as
/// an `http`/`https` URL. Otherwise it is local when it names an existing
/// path ending in a `/` or `\` separator followed by `sitemap.xml`.
/// Anything else is a transport error.
///
/// ```rust
/// use sitemap_core::location::{classify, LocationKind};
///
/// let kind = classify("https://example.com/sitemap.xml")?;
/// assert!(matches!(kind, LocationKind::Remote(_)));
/// assert!(classify("ftp://example.com/sitemap.xml").is_err());
/// # Ok::<(), sitemap_core::Error>(())
/// ```
pub fn classify(location: &str) -> Result<LocationKind> {
    if REMOTE_RE.is_match(location) {
        if let Ok(url) = Url::parse(location) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(LocationKind::Remote(url));
            }
        }
    }

    let path = PathBuf::from(location);
    if LOCAL_SITEMAP_RE.is_match(location) && path.exists() {
        return Ok(LocationKind::LocalFile(path));
    }

    Err(Error::transport(
        location,
        TransportCause::UnrecognizedLocation,
    ))
}
