//! High-level entry point: one [`SitemapParser`] per sitemap location.
//!
//! The parser fetches nothing until it is asked for something. The parsed
//! document and the traversal result are each computed at most once and
//! then reused; a failed attempt is not remembered, so calling again after
//! a transport error retries the fetch.

use crate::config::{FetchConfig, ParseOptions};
use crate::document::SitemapDocument;
use crate::entry::UrlEntry;
use crate::fetcher::{ContentFetcher, HttpFetcher};
use crate::traversal::{TraversalResult, expand, load_document};
use crate::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Parser for the sitemap or sitemap index at a single location.
///
/// ```rust,no_run
/// use sitemap_core::{ParseOptions, SitemapParser};
///
/// # async fn run() -> sitemap_core::Result<()> {
/// let parser = SitemapParser::new(
///     "https://example.com/sitemap_index.xml",
///     ParseOptions::default().with_recurse(true),
/// )?;
///
/// for entry in parser.to_list().await? {
///     println!("{}", entry.loc()?);
/// }
/// for (child, message) in parser.errors().await? {
///     eprintln!("{child}: {message}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct SitemapParser {
    location: String,
    options: ParseOptions,
    fetcher: Arc<dyn ContentFetcher>,
    child_concurrency: usize,
    document: OnceCell<SitemapDocument>,
    result: OnceCell<TraversalResult>,
}

impl SitemapParser {
    /// Creates a parser that fetches with a default [`HttpFetcher`].
    pub fn new(location: impl Into<String>, options: ParseOptions) -> Result<Self> {
        Self::with_config(location, options, &FetchConfig::default())
    }

    /// Creates a parser whose HTTP client and child concurrency come from `config`.
    pub fn with_config(
        location: impl Into<String>,
        options: ParseOptions,
        config: &FetchConfig,
    ) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::with_config(config)?);
        Ok(Self::with_fetcher(location, options, fetcher)
            .with_child_concurrency(config.child_concurrency))
    }

    /// Creates a parser that fetches through `fetcher`.
    pub fn with_fetcher(
        location: impl Into<String>,
        options: ParseOptions,
        fetcher: Arc<dyn ContentFetcher>,
    ) -> Self {
        Self {
            location: location.into(),
            options,
            fetcher,
            child_concurrency: FetchConfig::default().child_concurrency,
            document: OnceCell::new(),
            result: OnceCell::new(),
        }
    }

    /// Maximum number of index children fetched at once. Values below one
    /// are treated as one.
    #[must_use]
    pub const fn with_child_concurrency(mut self, child_concurrency: usize) -> Self {
        self.child_concurrency = child_concurrency;
        self
    }

    /// Location this parser reads.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Options this parser was created with.
    pub const fn options(&self) -> ParseOptions {
        self.options
    }

    /// The parsed document at [`location`](Self::location).
    pub async fn document(&self) -> Result<&SitemapDocument> {
        self.document
            .get_or_try_init(|| async {
                debug!(location = %self.location, "Loading sitemap document");
                load_document(
                    self.fetcher.as_ref(),
                    &self.location,
                    self.options.follow_redirects,
                )
                .await
            })
            .await
    }

    /// All URL entries reachable under the configured options, plus the
    /// errors of any index children that could not be read.
    #[instrument(skip(self), fields(location = %self.location))]
    pub async fn urls(&self) -> Result<&TraversalResult> {
        self.result
            .get_or_try_init(|| async {
                let document = self.document().await?;
                expand(
                    self.fetcher.as_ref(),
                    &self.location,
                    document,
                    self.options,
                    self.child_concurrency,
                )
                .await
            })
            .await
    }

    /// Entries in document order.
    pub async fn to_list(&self) -> Result<Vec<&UrlEntry>> {
        Ok(self.urls().await?.entries().iter().collect())
    }

    /// Entries for which `predicate` holds, in document order.
    pub async fn to_list_filtered<F>(&self, predicate: F) -> Result<Vec<&UrlEntry>>
    where
        F: Fn(&UrlEntry) -> bool,
    {
        Ok(self
            .urls()
            .await?
            .entries()
            .iter()
            .filter(|entry| predicate(entry))
            .collect())
    }

    /// Child location to error message for every index child that failed.
    pub async fn errors(&self) -> Result<&BTreeMap<String, String>> {
        Ok(self.urls().await?.errors())
    }
}

impl fmt::Debug for SitemapParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SitemapParser")
            .field("location", &self.location)
            .field("options", &self.options)
            .field("child_concurrency", &self.child_concurrency)
            .field("document_loaded", &self.document.initialized())
            .field("urls_loaded", &self.result.initialized())
            .finish_non_exhaustive()
    }
}
