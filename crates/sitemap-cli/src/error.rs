//! CLI error handling with semantic exit codes.
//!
//! | Code | Category    | Description |
//! |------|-------------|-------------|
//! | 0    | Success     | Entries listed (child sitemap failures included) |
//! | 1    | `Internal`  | Unexpected error |
//! | 2    | `Usage`     | Invalid arguments or configuration |
//! | 5    | `Network`   | The sitemap could not be fetched or read |
//! | 7    | `Integrity` | Not XML, invalid XML, unknown root, index without `<loc>` |
//!
//! ```bash
//! sitemap https://example.com/sitemap.xml > urls.txt
//! case $? in
//!     0) echo "ok" ;;
//!     5) echo "fetch failed, retry later" ;;
//!     *) echo "giving up" ;;
//! esac
//! ```

use std::fmt;
use std::process::ExitCode;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or configuration (exit code 2).
    Usage = 2,

    /// The sitemap could not be fetched (exit code 5).
    Network = 5,

    /// The sitemap was fetched but is not a readable sitemap (exit code 7).
    Integrity = 7,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::Network => "network error",
            Self::Integrity => "invalid sitemap",
        }
    }

    /// Category for a library error.
    #[must_use]
    pub const fn from_core(err: &sitemap_core::Error) -> Self {
        use sitemap_core::Error;
        match err {
            Error::Transport { .. } | Error::Io(_) => Self::Network,
            Error::ContentType { .. }
            | Error::Parse(_)
            | Error::MalformedSitemap { .. }
            | Error::FieldMissing(_)
            | Error::FieldFormat { .. } => Self::Integrity,
            Error::Config(_) => Self::Usage,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }

    /// Create an `ExitCode` from this error.
    #[must_use]
    pub fn as_exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }
}

impl From<sitemap_core::Error> for CliError {
    fn from(err: sitemap_core::Error) -> Self {
        Self::new(ErrorCategory::from_core(&err), err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorCategory::Internal, err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCategory::Internal, err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
