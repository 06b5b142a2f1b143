//! Typed, lazily evaluated view over a single `<url>` element.
//!
//! Constructing a [`UrlEntry`] never fails and never inspects the element.
//! Each accessor looks up its child element on first use and reports a
//! missing or unreadable field only then, so an entry without `<lastmod>`
//! still yields its `<loc>`.
//!
//! ```rust
//! use sitemap_core::document::parse;
//! use sitemap_core::UrlEntry;
//!
//! let doc = parse(br#"<urlset><url>
//!     <loc>https://example.com/about/</loc>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.7</priority>
//! </url></urlset>"#)?;
//! let entry = UrlEntry::new(doc.root().children()[0].clone());
//!
//! assert_eq!(entry.loc()?, "https://example.com/about/");
//! assert_eq!(entry.changefreq()?, "weekly");
//! assert_eq!(entry.priority()?, 0.7);
//! assert!(entry.lastmod().is_err());
//! # Ok::<(), sitemap_core::Error>(())
//! ```

use crate::document::Element;
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, OnceLock, PoisonError};

#[allow(clippy::unwrap_used)]
static NUMERIC_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A\s*[+-]?(?:\d+(?:\.\d+)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
});

/// The four per-URL fields of the sitemaps.org protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// `<loc>`
    Loc,
    /// `<lastmod>`
    Lastmod,
    /// `<changefreq>`
    Changefreq,
    /// `<priority>`
    Priority,
}

impl Field {
    /// XML element name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loc => "loc",
            Self::Lastmod => "lastmod",
            Self::Changefreq => "changefreq",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change frequency hints from sitemap.
///
/// [`UrlEntry::changefreq`] returns the raw text; parse it into this enum
/// when a typed value is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// The page changes every time it is accessed.
    Always,
    /// The page changes hourly.
    Hourly,
    /// The page changes daily.
    Daily,
    /// The page changes weekly.
    Weekly,
    /// The page changes monthly.
    Monthly,
    /// The page changes yearly.
    Yearly,
    /// The page is archived and will not change.
    Never,
}

impl ChangeFrequency {
    /// Lowercase protocol spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(Error::FieldFormat {
                field: Field::Changefreq,
                value: s.to_string(),
                reason: "expected one of always, hourly, daily, weekly, monthly, yearly, never"
                    .to_string(),
            }),
        }
    }
}

/// A lazily evaluated `<url>` record.
///
/// `loc`, `lastmod` and `priority` are computed once and cached for the life
/// of the entry; failures are not cached. `changefreq` is looked up again on
/// every call and its cache slot overwritten with the result, so a
/// legitimately empty `<changefreq></changefreq>` still counts as cached.
#[derive(Debug)]
pub struct UrlEntry {
    node: Arc<Element>,
    loc: OnceLock<String>,
    lastmod: OnceLock<DateTime<FixedOffset>>,
    changefreq: Mutex<Option<String>>,
    priority: OnceLock<f64>,
    lookups: AtomicUsize,
}

impl UrlEntry {
    /// Wrap a `<url>` element. Nothing is read until an accessor is called.
    pub const fn new(node: Arc<Element>) -> Self {
        Self {
            node,
            loc: OnceLock::new(),
            lastmod: OnceLock::new(),
            changefreq: Mutex::new(None),
            priority: OnceLock::new(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// The wrapped element.
    pub fn node(&self) -> &Arc<Element> {
        &self.node
    }

    /// Text of `<loc>`.
    pub fn loc(&self) -> Result<&str> {
        if let Some(loc) = self.loc.get() {
            return Ok(loc);
        }
        let value = self.lookup(Field::Loc)?.trimmed_text().to_string();
        Ok(self.loc.get_or_init(|| value))
    }

    /// `<lastmod>` parsed as a W3C datetime.
    ///
    /// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, and
    /// `YYYY-MM-DDThh:mm[:ss[.fff]]` with an optional `Z` or `±hh:mm`
    /// offset. Values without an offset are taken as UTC.
    pub fn lastmod(&self) -> Result<DateTime<FixedOffset>> {
        if let Some(lastmod) = self.lastmod.get() {
            return Ok(*lastmod);
        }
        let text = self.lookup(Field::Lastmod)?.trimmed_text();
        let parsed = parse_lastmod(text).ok_or_else(|| Error::FieldFormat {
            field: Field::Lastmod,
            value: text.to_string(),
            reason: "expected a W3C datetime such as 2024-01-15 or 2024-01-15T10:30:00+00:00"
                .to_string(),
        })?;
        Ok(*self.lastmod.get_or_init(|| parsed))
    }

    /// Raw text of `<changefreq>`, not validated against the protocol values.
    pub fn changefreq(&self) -> Result<String> {
        let value = self.lookup(Field::Changefreq)?.text().to_string();
        let mut slot = self
            .changefreq
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(value.clone());
        Ok(value)
    }

    /// `<priority>` coerced to a float.
    ///
    /// The longest numeric prefix is used and text without one is `0.0`;
    /// the nominal 0.0-1.0 range is not enforced.
    pub fn priority(&self) -> Result<f64> {
        if let Some(priority) = self.priority.get() {
            return Ok(*priority);
        }
        let value = coerce_float(self.lookup(Field::Priority)?.trimmed_text());
        Ok(*self.priority.get_or_init(|| value))
    }

    /// Whether a value for `field` has been computed and cached.
    pub fn is_cached(&self, field: Field) -> bool {
        match field {
            Field::Loc => self.loc.get().is_some(),
            Field::Lastmod => self.lastmod.get().is_some(),
            Field::Changefreq => self
                .changefreq
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some(),
            Field::Priority => self.priority.get().is_some(),
        }
    }

    /// Number of child-element lookups performed by the accessors so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Serialisable copy of every readable field; unreadable ones are `None`.
    pub fn snapshot(&self) -> UrlRecord {
        UrlRecord {
            loc: self.loc().ok().map(ToString::to_string),
            lastmod: self.lastmod().ok(),
            changefreq: self.changefreq().ok(),
            priority: self.priority().ok(),
        }
    }

    fn lookup(&self, field: Field) -> Result<&Arc<Element>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.node
            .find_child(field.as_str())
            .ok_or(Error::FieldMissing(field))
    }
}

impl fmt::Display for UrlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.snapshot();
        write!(
            f,
            "{}\t{}\t{}\t{}",
            record.loc.as_deref().unwrap_or("-"),
            record
                .lastmod
                .map_or_else(|| "-".to_string(), |d| d.to_rfc3339()),
            record.changefreq.as_deref().map_or("-", str::trim),
            record
                .priority
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
        )
    }
}

/// Plain-data copy of a [`UrlEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    /// Page URL.
    pub loc: Option<String>,
    /// Last modification time.
    pub lastmod: Option<DateTime<FixedOffset>>,
    /// Raw change frequency text.
    pub changefreq: Option<String>,
    /// Priority as coerced by [`UrlEntry::priority`].
    pub priority: Option<f64>,
}

fn parse_lastmod(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    // W3C allows minutes precision: 2024-01-15T10:30+01:00 / 2024-01-15T10:30Z
    let with_offset = s
        .strip_suffix('Z')
        .map_or_else(|| s.to_string(), |rest| format!("{rest}+00:00"));
    if let Ok(dt) = DateTime::parse_from_str(&with_offset, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt);
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().fixed_offset());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset());
    }

    tracing::debug!(date_str = %s, "Could not parse lastmod date");
    None
}

fn coerce_float(s: &str) -> f64 {
    NUMERIC_PREFIX_RE
        .find(s)
        .and_then(|m| m.as_str().trim_start().parse().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::document::parse;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn entry(inner: &str) -> UrlEntry {
        let xml = format!("<urlset><url>{inner}</url></urlset>");
        let doc = parse(xml.as_bytes()).unwrap();
        UrlEntry::new(doc.root().children()[0].clone())
    }

    #[test]
    fn test_reads_all_fields() {
        let entry = entry(
            "<loc>http://ben.balter.com/</loc>
             <lastmod>2014-02-08T18:45:54-05:00</lastmod>
             <changefreq>daily</changefreq>
             <priority>1.0</priority>",
        );
        let expected = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2014, 2, 8, 18, 45, 54)
            .unwrap();

        assert_eq!(entry.loc().unwrap(), "http://ben.balter.com/");
        assert_eq!(entry.lastmod().unwrap(), expected);
        assert_eq!(entry.changefreq().unwrap(), "daily");
        assert_eq!(entry.priority().unwrap(), 1.0);
    }

    #[test]
    fn test_construction_is_lazy() {
        let entry = entry("<lastmod>2024-01-15</lastmod>");
        assert_eq!(entry.lookup_count(), 0);
        for field in [Field::Loc, Field::Lastmod, Field::Changefreq, Field::Priority] {
            assert!(!entry.is_cached(field));
        }

        match entry.loc() {
            Err(Error::FieldMissing(Field::Loc)) => {},
            other => panic!("expected missing loc, got {other:?}"),
        }
        assert!(entry.lastmod().is_ok());
    }

    #[test]
    fn test_missing_fields_name_the_element() {
        let entry = entry("<loc>https://example.com/</loc>");
        assert_eq!(entry.lastmod().unwrap_err().to_string(), "No 'lastmod' element found");
        assert_eq!(
            entry.changefreq().unwrap_err().to_string(),
            "No 'changefreq' element found"
        );
        assert_eq!(entry.priority().unwrap_err().to_string(), "No 'priority' element found");
    }

    #[test]
    fn test_cached_fields_are_looked_up_once() {
        let entry = entry(
            "<loc>https://example.com/</loc>
             <lastmod>2024-01-15</lastmod>
             <priority>0.5</priority>",
        );

        assert_eq!(entry.loc().unwrap(), entry.loc().unwrap());
        assert_eq!(entry.lookup_count(), 1);

        assert_eq!(entry.lastmod().unwrap(), entry.lastmod().unwrap());
        assert_eq!(entry.lookup_count(), 2);

        assert_eq!(entry.priority().unwrap(), entry.priority().unwrap());
        assert_eq!(entry.lookup_count(), 3);
    }

    #[test]
    fn test_changefreq_is_reassigned_on_every_call() {
        let entry = entry("<changefreq></changefreq>");

        assert_eq!(entry.changefreq().unwrap(), "");
        assert!(entry.is_cached(Field::Changefreq));
        assert_eq!(entry.changefreq().unwrap(), "");
        assert_eq!(entry.lookup_count(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let entry = entry("<priority>0.3</priority>");
        assert!(entry.loc().is_err());
        assert!(entry.loc().is_err());
        assert_eq!(entry.lookup_count(), 2);
        assert!(!entry.is_cached(Field::Loc));
    }

    #[test]
    fn test_unparsable_lastmod_is_format_error() {
        let entry = entry("<lastmod>last tuesday</lastmod>");
        match entry.lastmod().unwrap_err() {
            Error::FieldFormat { field, value, .. } => {
                assert_eq!(field, Field::Lastmod);
                assert_eq!(value, "last tuesday");
            },
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_lastmod_w3c_variants() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let cases = [
            ("2024-01-15", utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()),
            ("2024-01-15T10:30:00Z", utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
            ("2024-01-15T10:30Z", utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
            ("2024-01-15T10:30:00", utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
            (
                "2024-01-15T10:30+01:00",
                FixedOffset::east_opt(3600)
                    .unwrap()
                    .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
                    .unwrap(),
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_lastmod(text), Some(expected), "{text}");
        }
        assert!(parse_lastmod("2024-01-15T10:30:00.123Z").is_some());
        assert!(parse_lastmod("15/01/2024").is_none());
    }

    #[test]
    fn test_priority_is_coerced_leniently() {
        assert_eq!(coerce_float("0.7"), 0.7);
        assert_eq!(coerce_float("  0.5  "), 0.5);
        assert_eq!(coerce_float("0.7abc"), 0.7);
        assert_eq!(coerce_float(".5"), 0.5);
        assert_eq!(coerce_float("-1"), -1.0);
        assert_eq!(coerce_float("1.5"), 1.5);
        assert_eq!(coerce_float("1e-1"), 0.1);
        assert_eq!(coerce_float("high"), 0.0);
        assert_eq!(coerce_float(""), 0.0);

        let entry = entry("<priority>not-a-number</priority>");
        assert_eq!(entry.priority().unwrap(), 0.0);
    }

    #[test]
    fn test_changefreq_is_not_validated() {
        let entry = entry("<changefreq>fortnightly</changefreq>");
        assert_eq!(entry.changefreq().unwrap(), "fortnightly");
        assert!(entry.changefreq().unwrap().parse::<ChangeFrequency>().is_err());
    }

    #[test]
    fn test_changefreq_is_raw_while_other_fields_are_trimmed() {
        let entry = entry(
            "<loc> http://a/ </loc>
             <lastmod>\n 2024-01-15 </lastmod>
             <changefreq> daily\n</changefreq>
             <priority> 0.4 </priority>",
        );
        assert_eq!(entry.loc().unwrap(), "http://a/");
        assert_eq!(entry.changefreq().unwrap(), " daily\n");
        assert_eq!(entry.priority().unwrap(), 0.4);
        assert!(entry.lastmod().is_ok());

        assert_eq!(
            entry.changefreq().unwrap().parse::<ChangeFrequency>().unwrap(),
            ChangeFrequency::Daily
        );
        assert_eq!(entry.to_string().split('\t').nth(2), Some("daily"));
    }

    #[test]
    fn test_change_frequency_parsing() {
        let cases = [
            ("always", ChangeFrequency::Always),
            ("hourly", ChangeFrequency::Hourly),
            ("daily", ChangeFrequency::Daily),
            ("weekly", ChangeFrequency::Weekly),
            ("monthly", ChangeFrequency::Monthly),
            ("yearly", ChangeFrequency::Yearly),
            ("never", ChangeFrequency::Never),
            ("WEEKLY", ChangeFrequency::Weekly),
        ];
        for (value, expected) in cases {
            assert_eq!(value.parse::<ChangeFrequency>().unwrap(), expected);
            assert_eq!(expected.to_string(), value.to_lowercase());
        }
    }

    #[test]
    fn test_snapshot_and_display_tolerate_missing_fields() {
        let entry = entry("<loc>https://example.com/a</loc><priority>0.8</priority>");
        let record = entry.snapshot();
        assert_eq!(record.loc.as_deref(), Some("https://example.com/a"));
        assert!(record.lastmod.is_none());
        assert!(record.changefreq.is_none());
        assert_eq!(record.priority, Some(0.8));

        assert_eq!(entry.to_string(), "https://example.com/a\t-\t-\t0.8");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = entry("<loc>https://example.com/</loc><lastmod>2024-01-15T10:30:00Z</lastmod>")
            .snapshot();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["loc"], "https://example.com/");
        assert!(json["lastmod"].as_str().unwrap().starts_with("2024-01-15T10:30:00"));
        assert!(json["priority"].is_null());
    }

    proptest! {
        #[test]
        fn prop_priority_ignores_trailing_text(tenths in 0u8..=10, suffix in "[a-z %]{0,8}") {
            let value = f64::from(tenths) / 10.0;
            let entry = entry(&format!("<priority>{value:.1}{suffix}</priority>"));
            prop_assert!((entry.priority().unwrap() - value).abs() < 1e-9);
        }

        #[test]
        fn prop_non_numeric_priority_is_zero(text in "[a-df-z][a-z]{0,10}") {
            let entry = entry(&format!("<priority>{text}</priority>"));
            prop_assert_eq!(entry.priority().unwrap(), 0.0);
        }
    }
}
