//! Findings produced by the drift comparator
//!
//! A finding carries enough structured detail to act on without re-running
//! the tool. Findings are immutable once created and only the comparator and
//! the audit runner produce them.

use serde::{Deserialize, Serialize};

use super::repo::RepositoryRef;

/// Finding severity.
///
/// Only `Warning` findings affect the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, may be intentional on the repository's side
    Info,
    /// Actionable drift
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// What kind of drift or failure a finding reports.
///
/// Variant declaration order is the sort order used for reports; derived
/// ordering within a variant starts with the platform where one exists, which
/// gives the (kind, platform) ordering the report relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    /// A platform's highest tested language version trails the reference
    StaleMatrixEntry {
        /// Platform the entry is for
        platform: String,
        /// Highest version the repository tests
        observed_max: String,
        /// Highest version the reference tests
        canonical_max: String,
    },
    /// The reference tests a platform this repository does not
    MissingPlatform {
        /// The untested platform
        platform: String,
        /// Highest version the reference tests for it
        canonical_max: String,
    },
    /// The pinned container tag trails the latest published tag
    StaleContainerTag {
        /// Tag the repository pins
        observed: String,
        /// Latest published numeric tag
        canonical: String,
    },
    /// The container pin uses a non-numeric tag such as `latest`
    UnpinnedContainerTag {
        /// The non-numeric tag in use
        observed: String,
    },
    /// The repository could not be fetched after all retry attempts
    FetchFailure {
        /// What failed
        detail: String,
    },
    /// The pipeline definition could not be parsed
    ExtractionFailure {
        /// Parser diagnostic
        detail: String,
    },
}

impl FindingKind {
    /// The platform a finding is about, when it has one.
    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        match self {
            Self::StaleMatrixEntry { platform, .. } | Self::MissingPlatform { platform, .. } => {
                Some(platform)
            },
            _ => None,
        }
    }

    /// Short machine-readable name of the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StaleMatrixEntry { .. } => "stale_matrix_entry",
            Self::MissingPlatform { .. } => "missing_platform",
            Self::StaleContainerTag { .. } => "stale_container_tag",
            Self::UnpinnedContainerTag { .. } => "unpinned_container_tag",
            Self::FetchFailure { .. } => "fetch_failure",
            Self::ExtractionFailure { .. } => "extraction_failure",
        }
    }
}

/// One reported instance of drift or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The repository the finding is about
    pub repository: RepositoryRef,
    /// Severity, derived from the kind
    pub severity: Severity,
    /// Structured payload
    #[serde(flatten)]
    pub kind: FindingKind,
}

impl Finding {
    /// A stale matrix entry for one platform.
    #[must_use]
    pub fn stale_matrix_entry(
        repository: RepositoryRef,
        platform: impl Into<String>,
        observed_max: impl Into<String>,
        canonical_max: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            severity: Severity::Warning,
            kind: FindingKind::StaleMatrixEntry {
                platform: platform.into(),
                observed_max: observed_max.into(),
                canonical_max: canonical_max.into(),
            },
        }
    }

    /// A reference platform the repository does not test. May be intentional.
    #[must_use]
    pub fn missing_platform(
        repository: RepositoryRef,
        platform: impl Into<String>,
        canonical_max: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            severity: Severity::Info,
            kind: FindingKind::MissingPlatform {
                platform: platform.into(),
                canonical_max: canonical_max.into(),
            },
        }
    }

    /// A container pin behind the latest published tag.
    #[must_use]
    pub fn stale_container_tag(
        repository: RepositoryRef,
        observed: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            severity: Severity::Warning,
            kind: FindingKind::StaleContainerTag {
                observed: observed.into(),
                canonical: canonical.into(),
            },
        }
    }

    /// A container pin with a non-numeric tag.
    #[must_use]
    pub fn unpinned_container_tag(repository: RepositoryRef, observed: impl Into<String>) -> Self {
        Self {
            repository,
            severity: Severity::Warning,
            kind: FindingKind::UnpinnedContainerTag {
                observed: observed.into(),
            },
        }
    }

    /// A repository that stayed unreachable through every retry.
    #[must_use]
    pub fn fetch_failure(repository: RepositoryRef, detail: impl Into<String>) -> Self {
        Self {
            repository,
            severity: Severity::Info,
            kind: FindingKind::FetchFailure {
                detail: detail.into(),
            },
        }
    }

    /// A pipeline definition that did not parse.
    #[must_use]
    pub fn extraction_failure(repository: RepositoryRef, detail: impl Into<String>) -> Self {
        Self {
            repository,
            severity: Severity::Info,
            kind: FindingKind::ExtractionFailure {
                detail: detail.into(),
            },
        }
    }
}
