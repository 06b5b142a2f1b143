//! Transport decoding: turning fetched bytes into plain XML bytes.
//!
//! Servers advertise compressed sitemaps inconsistently: some send
//! `Content-Type: application/x-gzip`, others send an XML content type with
//! `Content-Encoding: gzip`. Both signals are checked.
//!
//! | Content-Type              | Content-Encoding | Result           |
//! |---------------------------|------------------|------------------|
//! | contains `gzip`           | anything         | gunzip           |
//! | XML-ish                   | contains `gzip`  | gunzip           |
//! | XML-ish                   | anything else    | pass through     |
//! | anything else / missing   | anything         | `ContentType` error |
//!
//! "XML-ish" means the header contains one of [`ACCEPTED_CONTENT_TYPES`]
//! (case-sensitive substring match). Local files carry no headers and are
//! always passed through.

use crate::fetcher::{ContentOrigin, RawContent};
use crate::{Error, Result};
use flate2::read::MultiGzDecoder;
use std::io::Read;
use tracing::{debug, instrument};

/// Content types accepted as (possibly compressed) XML.
pub static ACCEPTED_CONTENT_TYPES: &[&str] =
    &["text/xml", "application/xml", "text/plain", "text/html"];

/// How a response body must be treated before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEncoding {
    /// Gzip-compressed XML.
    Gzip,
    /// XML as-is.
    PlainXml,
    /// Not something this crate can parse.
    Invalid,
}

/// Classify the transport metadata of an HTTP response.
///
/// ```rust
/// use sitemap_core::decode::{classify_transport, TransportEncoding};
///
/// assert_eq!(classify_transport(Some("text/xml"), None), TransportEncoding::PlainXml);
/// assert_eq!(classify_transport(Some("text/xml"), Some("gzip")), TransportEncoding::Gzip);
/// assert_eq!(classify_transport(Some("application/x-gzip"), None), TransportEncoding::Gzip);
/// assert_eq!(classify_transport(Some("application/json"), None), TransportEncoding::Invalid);
/// ```
pub fn classify_transport(
    content_type: Option<&str>,
    content_encoding: Option<&str>,
) -> TransportEncoding {
    let content_type = content_type.unwrap_or("");
    let type_matches = ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| content_type.contains(accepted));
    let encoding_is_gzip = content_encoding.is_some_and(|e| e.contains("gzip"));

    if content_type.contains("gzip") || (encoding_is_gzip && type_matches) {
        TransportEncoding::Gzip
    } else if type_matches {
        TransportEncoding::PlainXml
    } else {
        TransportEncoding::Invalid
    }
}

/// Decode fetched content into plain XML bytes.
#[instrument(skip(raw), fields(bytes = raw.body.len()))]
pub fn decode(raw: RawContent) -> Result<Vec<u8>> {
    if raw.origin == ContentOrigin::File {
        return Ok(raw.body);
    }

    match classify_transport(raw.content_type.as_deref(), raw.content_encoding.as_deref()) {
        TransportEncoding::PlainXml => Ok(raw.body),
        TransportEncoding::Gzip => {
            let decoded = gunzip(&raw.body).map_err(|e| Error::ContentType {
                content_type: raw.content_type.clone(),
                content_encoding: raw.content_encoding.clone(),
                reason: format!("Failed to decompress gzip body: {e}"),
            })?;
            debug!(
                compressed = raw.body.len(),
                decompressed = decoded.len(),
                "Decompressed sitemap"
            );
            Ok(decoded)
        },
        TransportEncoding::Invalid => Err(Error::ContentType {
            content_type: raw.content_type,
            content_encoding: raw.content_encoding,
            reason: "Unexpected content type".to_string(),
        }),
    }
}

/// Upper bound on the output buffer reserved before decompressing.
const GUNZIP_RESERVE_LIMIT: usize = 1 << 20;

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut out = Vec::with_capacity(gunzip_reserve(bytes.len()));
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

// Sitemaps usually compress around 4:1; the buffer grows past this as needed.
const fn gunzip_reserve(compressed_len: usize) -> usize {
    let estimate = compressed_len.saturating_mul(4);
    if estimate < GUNZIP_RESERVE_LIMIT {
        estimate
    } else {
        GUNZIP_RESERVE_LIMIT
    }
}
