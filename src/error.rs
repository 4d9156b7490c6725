//! Error taxonomy for the drift-detection engine
//!
//! Expected, routine outcomes of a multi-repository scan (an unreachable
//! remote, a malformed pipeline file, a missing file) are explicit result
//! types here, never panics. Per-repository errors isolate; only
//! [`ConfigError`], [`ResolutionError`] and [`RenderError`] abort a run.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fatal pre-flight configuration problems.
///
/// Raised before any network activity takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential file is absent
    #[error("missing credential file: {0} (create it with the token as its only content)")]
    MissingCredential(PathBuf),

    /// A configuration or credential file exists but could not be read
    #[error("unreadable configuration file {path}: {source}")]
    Unreadable {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The settings file exists but is not valid TOML
    #[error("invalid settings file {path}: {source}")]
    InvalidSettings {
        /// Path of the settings file
        path: PathBuf,
        /// Underlying parse error
        source: toml::de::Error,
    },

    /// The home directory could not be determined
    #[error("cannot determine the user configuration directory")]
    NoConfigDir,
}

/// Per-repository network, filesystem or auth failure.
///
/// Isolated: recorded as a Finding, the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A file was not present in the snapshot
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// A git operation failed
    #[error("git {action} failed for {repo}: {detail}")]
    Git {
        /// The git subcommand that failed (clone, pull, ...)
        action: String,
        /// The repository the operation was for
        repo: String,
        /// Captured stderr or error text
        detail: String,
    },

    /// An HTTP request failed or returned a non-success status
    #[error("request to {url} failed: {detail}")]
    Http {
        /// Request URL
        url: String,
        /// Error text or status line
        detail: String,
    },

    /// A network-bound operation exceeded its deadline
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The run was cancelled while this operation was pending
    #[error("cancelled")]
    Cancelled,

    /// Local IO failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Build an [`FetchError::Http`] from a reqwest error.
    #[must_use]
    pub fn from_http(url: &str, err: &reqwest::Error) -> Self {
        Self::Http {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }
}

/// A pipeline definition file could not be parsed.
///
/// Only structurally invalid input produces this; a file without any matrix
/// section extracts to an empty matrix instead.
#[derive(Debug, Error)]
#[error("failed to parse pipeline definition: {reason}")]
pub struct ExtractionError {
    /// Parser diagnostic
    pub reason: String,
}

impl ExtractionError {
    /// Wrap a parser diagnostic.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The canonical state could not be computed.
///
/// Fatal for the whole run: every comparison depends on it.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The reference repository or its pipeline file was unreachable
    #[error("reference pipeline unavailable: {0}")]
    ReferenceUnavailable(#[from] FetchError),

    /// The reference pipeline file did not parse
    #[error("reference pipeline unparseable: {0}")]
    ReferenceUnparseable(#[from] ExtractionError),

    /// The registry listed no tag that parses as a numeric version
    #[error("no numeric tag published for image {image}")]
    NoNumericTag {
        /// The container image whose tags were listed
        image: String,
    },
}

/// Output formatting failure, the last step of a run.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The report could not be serialized
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
