//! Command-line arguments for `sitemap`.
//!
//! ```bash
//! # List the URLs of a single sitemap
//! sitemap https://example.com/sitemap.xml
//!
//! # Expand an index and emit JSON
//! sitemap https://example.com/sitemap_index.xml --recurse --output json
//!
//! # Only weekly pages of a local file
//! sitemap ./public/sitemap.xml --changefreq weekly
//! ```

use clap::{ArgAction, Parser};
use sitemap_core::ChangeFrequency;
use std::path::PathBuf;

/// List the URLs in an XML sitemap or sitemap index.
#[derive(Parser, Clone, Debug)]
#[command(name = "sitemap", version, about, long_about = None)]
pub struct Cli {
    /// Sitemap URL (http/https) or path to an existing local file named
    /// sitemap.xml; local paths need a directory part, e.g. ./sitemap.xml
    pub location: String,

    /// Expand a sitemap index into its child sitemaps (one level)
    #[arg(short, long)]
    pub recurse: bool,

    /// Treat HTTP redirects as errors instead of following them
    #[arg(long = "no-follow-redirects", action = ArgAction::SetFalse)]
    pub follow_redirects: bool,

    /// Only list entries whose `<changefreq>` matches
    #[arg(long, value_name = "FREQ")]
    pub changefreq: Option<ChangeFrequency>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// TOML file with fetch settings (timeout, redirects, user agent, concurrency)
    #[arg(long, value_name = "PATH", env = "SITEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors and omit per-child error lines
    #[arg(short, long)]
    pub quiet: bool,
}

/// How listed entries are written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One tab-separated line per entry
    Text,
    /// A single JSON object with `urls` and `errors`
    Json,
}
