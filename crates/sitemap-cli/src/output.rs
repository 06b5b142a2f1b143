//! Rendering listed entries to stdout and child failures to stderr.

use crate::cli::OutputFormat;
use serde::Serialize;
use sitemap_core::{UrlEntry, UrlRecord};
use std::collections::BTreeMap;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    urls: Vec<UrlRecord>,
    errors: &'a BTreeMap<String, String>,
}

/// Write `entries` to `out` in `format`.
///
/// In JSON mode the child errors are part of the document; in text mode
/// they belong on stderr (see [`write_errors`]).
pub fn write_entries<W: Write>(
    out: &mut W,
    format: OutputFormat,
    entries: &[&UrlEntry],
    errors: &BTreeMap<String, String>,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for entry in entries {
                writeln!(out, "{entry}")?;
            }
        },
        OutputFormat::Json => {
            let report = JsonReport {
                urls: entries.iter().map(|entry| entry.snapshot()).collect(),
                errors,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        },
    }
    out.flush()
}

/// Write one `error: <location>: <message>` line per failed child.
pub fn write_errors<W: Write>(err: &mut W, errors: &BTreeMap<String, String>) -> io::Result<()> {
    for (location, message) in errors {
        writeln!(err, "error: {location}: {message}")?;
    }
    err.flush()
}
