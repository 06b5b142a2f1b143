//! Per-call options and transport configuration.
//!
//! Two layers are kept apart:
//!
//! - [`ParseOptions`] is the options bag handed to every traversal
//!   (`recurse`, `follow_redirects`).
//! - [`FetchConfig`] configures the HTTP transport once per fetcher: timeout,
//!   redirect limit, user agent and how many child sitemaps are fetched at
//!   once. It can be loaded from TOML and overridden through `SITEMAP_*`
//!   environment variables.
//!
//! ## Example Configuration File
//!
//! ```toml
//! timeout_secs = 15
//! max_redirects = 5
//! user_agent = "my-crawler/1.0"
//! child_concurrency = 8
//! ```
//!
//! ```rust
//! use sitemap_core::{FetchConfig, ParseOptions};
//!
//! let config = FetchConfig::from_toml_str("timeout_secs = 15")?;
//! assert_eq!(config.timeout_secs, 15);
//! assert_eq!(config.child_concurrency, 4);
//!
//! let options = ParseOptions::default().with_recurse(true);
//! assert!(options.recurse);
//! assert!(options.follow_redirects);
//! # Ok::<(), sitemap_core::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`FetchConfig::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "SITEMAP_TIMEOUT_SECS";
/// Environment variable overriding [`FetchConfig::max_redirects`].
pub const ENV_MAX_REDIRECTS: &str = "SITEMAP_MAX_REDIRECTS";
/// Environment variable overriding [`FetchConfig::user_agent`].
pub const ENV_USER_AGENT: &str = "SITEMAP_USER_AGENT";
/// Environment variable overriding [`FetchConfig::child_concurrency`].
pub const ENV_CHILD_CONCURRENCY: &str = "SITEMAP_CHILD_CONCURRENCY";

/// Options controlling a single traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Follow HTTP redirects when fetching. Defaults to `true`.
    pub follow_redirects: bool,
    /// Expand a sitemap index into its child sitemaps. Defaults to `false`.
    ///
    /// Expansion is one level deep: children are always traversed with
    /// `recurse` disabled, so an index nested inside an index contributes
    /// no entries.
    pub recurse: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            recurse: false,
        }
    }
}

impl ParseOptions {
    /// Return a copy with `recurse` set.
    #[must_use]
    pub const fn with_recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    /// Return a copy with `follow_redirects` set.
    #[must_use]
    pub const fn with_follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self
    }

    /// Options used for every child of an expanded index.
    pub(crate) const fn for_child(self) -> Self {
        self.with_recurse(false)
    }
}

/// Transport settings shared by every request a fetcher makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Overall per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum redirect hops when redirects are followed.
    pub max_redirects: usize,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Upper bound on child sitemaps fetched concurrently during expansion.
    pub child_concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 10,
            user_agent: concat!("sitemap-parser/", env!("CARGO_PKG_VERSION")).to_string(),
            child_concurrency: 4,
        }
    }
}

impl FetchConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Apply `SITEMAP_*` environment overrides on top of the current values.
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// [`apply_env_overrides`](Self::apply_env_overrides) is this function
    /// over the process environment.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_override(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_REDIRECTS) {
            self.max_redirects = parse_override(ENV_MAX_REDIRECTS, &value)?;
        }
        if let Some(value) = lookup(ENV_USER_AGENT) {
            self.user_agent = value;
        }
        if let Some(value) = lookup(ENV_CHILD_CONCURRENCY) {
            self.child_concurrency = parse_override(ENV_CHILD_CONCURRENCY, &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the transport cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
        }
        if self.child_concurrency == 0 {
            return Err(Error::Config(
                "child_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value '{value}'")))
}
