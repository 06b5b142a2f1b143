//! # sitemap-core
//!
//! Fetch, decode and traverse [sitemaps.org](https://www.sitemaps.org/protocol.html)
//! XML sitemaps and sitemap indexes.
//!
//! A sitemap location is either an `http(s)` URL or a local `sitemap.xml`
//! path. Its bytes pass through a short pipeline:
//!
//! 1. **Fetch** ([`fetcher`]): raw body plus `Content-Type` / `Content-Encoding`.
//! 2. **Decode** ([`decode`]): gunzip or pass through, based on those headers.
//! 3. **Parse** ([`document`]): well-formed XML into an element tree.
//! 4. **Traverse** ([`traversal`]): `<urlset>` yields entries; `<sitemapindex>`
//!    optionally expands into its children, one level deep.
//!
//! Every `<url>` becomes a [`UrlEntry`] whose fields are read lazily.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitemap_core::{ParseOptions, SitemapParser};
//!
//! # async fn run() -> sitemap_core::Result<()> {
//! let parser = SitemapParser::new("https://example.com/sitemap.xml", ParseOptions::default())?;
//! for entry in parser.to_list().await? {
//!     println!("{} {}", entry.loc()?, entry.priority().unwrap_or(0.5));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Failures of the requested document are returned as [`Error`]. Failures of
//! individual children of a sitemap index are collected in
//! [`TraversalResult::errors`] and never abort the traversal. Field errors
//! surface from the [`UrlEntry`] accessors.

/// Per-call options and transport configuration
pub mod config;
/// Gzip / plain XML transport decoding
pub mod decode;
/// XML element tree
pub mod document;
/// Lazily evaluated `<url>` records
pub mod entry;
/// Error types and result aliases
pub mod error;
/// Raw content retrieval over HTTP and from disk
pub mod fetcher;
/// Remote / local location classification
pub mod location;
/// High-level memoizing parser
pub mod parser;
/// Sitemap and sitemap index traversal
pub mod traversal;

pub use config::{FetchConfig, ParseOptions};
pub use document::{Element, RootKind, SitemapDocument};
pub use entry::{ChangeFrequency, Field, UrlEntry, UrlRecord};
pub use error::{Error, Result, TransportCause};
pub use fetcher::{ContentFetcher, ContentOrigin, HttpFetcher, RawContent};
pub use parser::SitemapParser;
pub use traversal::TraversalResult;
