//! sitemap CLI - list the URLs of XML sitemaps and sitemap indexes
//!
//! Entries go to stdout, one per line or as a single JSON document. Child
//! sitemaps of an index that fail are reported on stderr (or in the JSON
//! `errors` map) without failing the command.

use anyhow::Result;
use clap::Parser;
use sitemap_core::{ChangeFrequency, FetchConfig, ParseOptions, SitemapParser, UrlEntry};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod error;
mod output;

use cli::{Cli, OutputFormat};
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = initialize_logging(&cli) {
        eprintln!("error: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.as_exit_code()
        },
    }
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    let options = ParseOptions::default()
        .with_recurse(cli.recurse)
        .with_follow_redirects(cli.follow_redirects);
    let parser = SitemapParser::with_config(cli.location.as_str(), options, &config)?;

    let entries = match cli.changefreq {
        Some(wanted) => {
            parser
                .to_list_filtered(|entry| changefreq_of(entry) == Some(wanted))
                .await?
        },
        None => parser.to_list().await?,
    };
    let errors = parser.errors().await?;

    info!(
        location = %cli.location,
        entries = entries.len(),
        failed_children = errors.len(),
        "Listed sitemap"
    );

    output::write_entries(&mut io::stdout().lock(), cli.output, &entries, errors)?;
    if cli.output == OutputFormat::Text && !cli.quiet {
        output::write_errors(&mut io::stderr().lock(), errors)?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<FetchConfig, CliError> {
    let config = match path {
        Some(path) => FetchConfig::load(path).map_err(|e| match e {
            sitemap_core::Error::Io(io) => CliError::usage(anyhow::anyhow!(
                "failed to read config {}: {io}",
                path.display()
            )),
            other => CliError::usage(other),
        })?,
        None => FetchConfig::default(),
    };
    config.apply_env_overrides().map_err(CliError::usage)
}

fn changefreq_of(entry: &UrlEntry) -> Option<ChangeFrequency> {
    entry.changefreq().ok()?.parse().ok()
}
