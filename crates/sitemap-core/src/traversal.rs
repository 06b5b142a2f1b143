//! The fetch, decode, parse and recurse pipeline.
//!
//! A `<urlset>` yields its `<url>` children. A `<sitemapindex>` yields
//! nothing unless recursion is requested; with recursion every child
//! `<sitemap>` is traversed once, non-recursively, and its entries appended
//! in index order. A child that fails is recorded in
//! [`TraversalResult::errors`] and skipped; it never aborts its siblings.
//!
//! Children are fetched concurrently (bounded by `child_concurrency`) but
//! merged in the order the index lists them.

use crate::config::ParseOptions;
use crate::decode::decode;
use crate::document::{RootKind, SitemapDocument, parse};
use crate::entry::{Field, UrlEntry};
use crate::fetcher::ContentFetcher;
use crate::{Error, Result};
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Entries found by a traversal plus the children that could not be read.
#[derive(Debug, Default)]
pub struct TraversalResult {
    entries: Vec<UrlEntry>,
    errors: BTreeMap<String, String>,
}

impl TraversalResult {
    /// URL entries in document order (index order, then within-child order).
    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }

    /// Child location to error message, for every child of an expanded
    /// index that failed. Always empty for a `<urlset>`.
    pub const fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any child failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Split into entries and error map.
    pub fn into_parts(self) -> (Vec<UrlEntry>, BTreeMap<String, String>) {
        (self.entries, self.errors)
    }
}

/// Fetch, decode and parse `location` into a document.
#[instrument(skip(fetcher), fields(location = %location))]
pub async fn load_document(
    fetcher: &dyn ContentFetcher,
    location: &str,
    follow_redirects: bool,
) -> Result<SitemapDocument> {
    let raw = fetcher.fetch(location, follow_redirects).await?;
    let xml = decode(raw)?;
    parse(&xml)
}

/// Traverse the sitemap at `location`.
///
/// Fetch, decode, parse and root-classification failures of `location`
/// itself are returned as errors. Failures of index children are collected
/// into the result instead.
pub fn traverse<'a>(
    fetcher: &'a dyn ContentFetcher,
    location: &'a str,
    options: ParseOptions,
    child_concurrency: usize,
) -> BoxFuture<'a, Result<TraversalResult>> {
    Box::pin(async move {
        debug!(location = %location, recurse = options.recurse, "Traversing sitemap");
        let document = load_document(fetcher, location, options.follow_redirects).await?;
        expand(fetcher, location, &document, options, child_concurrency).await
    })
}

/// Turn an already parsed document into a [`TraversalResult`].
///
/// `location` is only used for error reporting.
pub async fn expand(
    fetcher: &dyn ContentFetcher,
    location: &str,
    document: &SitemapDocument,
    options: ParseOptions,
    child_concurrency: usize,
) -> Result<TraversalResult> {
    match document.root_kind() {
        RootKind::UrlSet => {
            let entries: Vec<UrlEntry> = document
                .root()
                .children_named("url")
                .cloned()
                .map(UrlEntry::new)
                .collect();
            debug!(location = %location, entries = entries.len(), "Read urlset");
            Ok(TraversalResult {
                entries,
                errors: BTreeMap::new(),
            })
        },
        RootKind::SitemapIndex if !options.recurse => {
            debug!(location = %location, "Sitemap index not expanded (recursion disabled)");
            Ok(TraversalResult::default())
        },
        RootKind::SitemapIndex => {
            expand_index(fetcher, location, document, options, child_concurrency).await
        },
        RootKind::Malformed => Err(Error::MalformedSitemap {
            location: location.to_string(),
            root: document.root().name().to_string(),
        }),
    }
}

#[instrument(skip(fetcher, document, options), fields(location = %location))]
async fn expand_index(
    fetcher: &dyn ContentFetcher,
    location: &str,
    document: &SitemapDocument,
    options: ParseOptions,
    child_concurrency: usize,
) -> Result<TraversalResult> {
    // A <sitemap> without <loc> cannot be enumerated at all.
    let child_locations = document
        .root()
        .children_named("sitemap")
        .map(|sitemap| {
            sitemap
                .find_child(Field::Loc.as_str())
                .map(|loc| loc.trimmed_text().to_string())
                .ok_or(Error::FieldMissing(Field::Loc))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(children = child_locations.len(), "Expanding sitemap index");

    let child_options = options.for_child();
    let outcomes: Vec<(String, Result<TraversalResult>)> = stream::iter(child_locations)
        .map(|child| async move {
            let outcome = traverse(fetcher, &child, child_options, child_concurrency).await;
            (child, outcome)
        })
        .buffered(child_concurrency.max(1))
        .collect()
        .await;

    let mut result = TraversalResult::default();
    for (child, outcome) in outcomes {
        match outcome {
            Ok(child_result) => {
                let (entries, _) = child_result.into_parts();
                result.entries.extend(entries);
            },
            Err(e) => {
                warn!(child = %child, error = %e, "Failed to traverse child sitemap");
                result.errors.insert(child, e.to_string());
            },
        }
    }

    info!(
        entries = result.entries.len(),
        failed_children = result.errors.len(),
        "Expanded sitemap index"
    );
    Ok(result)
}
