//! Error types for sitemap retrieval, decoding, parsing and field access.
//!
//! Failures fall into three classes that callers usually want to tell apart:
//!
//! - **Document failures**: the sitemap itself could not be fetched, decoded,
//!   parsed or recognised ([`Error::Transport`], [`Error::ContentType`],
//!   [`Error::Parse`], [`Error::MalformedSitemap`]). These surface from
//!   [`SitemapParser::urls`](crate::SitemapParser::urls) unrecovered.
//! - **Child failures** inside a sitemap index are not errors at all from the
//!   caller's perspective; they are recorded as messages in
//!   [`TraversalResult::errors`](crate::TraversalResult::errors).
//! - **Field failures** ([`Error::FieldMissing`], [`Error::FieldFormat`])
//!   surface lazily, only when the corresponding
//!   [`UrlEntry`](crate::UrlEntry) accessor is called.
//!
//! ```rust
//! use sitemap_core::{Error, Field};
//!
//! let err = Error::FieldMissing(Field::Loc);
//! assert!(err.is_field_error());
//! assert_eq!(err.category(), "field_missing");
//! assert_eq!(err.to_string(), "No 'loc' element found");
//! ```

use crate::entry::Field;
use thiserror::Error;

/// The main error type for sitemap-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The location could not be read over the network or from disk.
    ///
    /// Carries the location that was requested so that failures recorded for
    /// child sitemaps stay attributable.
    #[error("Transport error for '{location}': {cause}")]
    Transport {
        /// Location that was being fetched.
        location: String,
        /// What went wrong.
        #[source]
        cause: TransportCause,
    },

    /// The transport metadata did not describe XML, or the compressed body
    /// could not be decompressed.
    #[error(
        "{reason} (Content-Type: {}, Content-Encoding: {})",
        .content_type.as_deref().unwrap_or("none"),
        .content_encoding.as_deref().unwrap_or("none")
    )]
    ContentType {
        /// `Content-Type` header as transmitted, if any.
        content_type: Option<String>,
        /// `Content-Encoding` header as transmitted, if any.
        content_encoding: Option<String>,
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The decoded bytes are not well-formed XML.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed XML whose root is neither `<urlset>` nor `<sitemapindex>`.
    #[error("Malformed sitemap at '{location}': root element <{root}> is neither <urlset> nor <sitemapindex>")]
    MalformedSitemap {
        /// Location of the offending document.
        location: String,
        /// Local name of the root element that was found.
        root: String,
    },

    /// A required child element is absent.
    #[error("No '{0}' element found")]
    FieldMissing(Field),

    /// A child element is present but its text cannot be interpreted.
    #[error("Invalid '{field}' value '{value}': {reason}")]
    FieldFormat {
        /// Field being read.
        field: Field,
        /// Raw text content of the element.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Fetch configuration is invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O outside of sitemap retrieval (configuration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Underlying reason for an [`Error::Transport`].
#[derive(Error, Debug)]
pub enum TransportCause {
    /// The server answered with a non-2xx status.
    #[error("HTTP request failed with status {0}")]
    Status(u16),

    /// The request could not be completed (DNS, TLS, timeout, redirects...).
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The local file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[source] std::io::Error),

    /// The location is neither an HTTP(S) URL nor an existing `sitemap.xml` path.
    #[error("unrecognized location")]
    UnrecognizedLocation,
}

impl Error {
    /// Build a transport error for `location`.
    pub fn transport(location: impl Into<String>, cause: TransportCause) -> Self {
        Self::Transport {
            location: location.into(),
            cause,
        }
    }

    /// Whether retrying the same request later could plausibly succeed.
    ///
    /// Only transport failures qualify: timeouts, connection failures,
    /// `429` and `5xx` responses, and interrupted reads. Nothing in this
    /// crate retries on its own.
    ///
    /// ```rust
    /// use sitemap_core::{Error, TransportCause};
    ///
    /// let flaky = Error::transport("https://example.com/sitemap.xml", TransportCause::Status(503));
    /// let gone = Error::transport("https://example.com/sitemap.xml", TransportCause::Status(404));
    /// assert!(flaky.is_recoverable());
    /// assert!(!gone.is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { cause, .. } => match cause {
                TransportCause::Status(status) => *status == 429 || *status >= 500,
                TransportCause::Request(e) => e.is_timeout() || e.is_connect(),
                TransportCause::Io(e) => matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
                ),
                TransportCause::UnrecognizedLocation => false,
            },
            _ => false,
        }
    }

    /// Whether this error came from a [`UrlEntry`](crate::UrlEntry) accessor
    /// rather than from retrieving the document.
    #[must_use]
    pub const fn is_field_error(&self) -> bool {
        matches!(self, Self::FieldMissing(_) | Self::FieldFormat { .. })
    }

    /// Stable identifier for the error class, for logs and exit codes.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::ContentType { .. } => "content_type",
            Self::Parse(_) => "parse",
            Self::MalformedSitemap { .. } => "malformed_sitemap",
            Self::FieldMissing(_) => "field_missing",
            Self::FieldFormat { .. } => "field_format",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience alias for `std::result::Result<T, sitemap_core::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
