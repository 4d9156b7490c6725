//! Test matrix snapshot types

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::repo::RepositoryRef;
use super::version::compare_versions;

/// One row of a CI test matrix.
///
/// Rows are unique within a matrix; duplicates found during extraction are
/// dropped, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PipelineMatrixEntry {
    /// Platform axis, e.g. `fedora` or `rhel`
    pub platform: String,
    /// Language-version axis, e.g. `3.11`; empty when the entry has none
    pub language_version: String,
    /// Remaining axes, including the originating job name under `job`
    pub extra_axes: BTreeMap<String, String>,
}

/// Immutable snapshot of the matrix one pipeline definition declares.
///
/// Entry order is source-document order, so extraction is deterministic and
/// diffs stay reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMatrix {
    /// The repository the definition was read from
    pub repository: RepositoryRef,
    /// Path of the definition file within the snapshot
    pub source: String,
    /// Matrix rows in document order
    pub entries: Vec<PipelineMatrixEntry>,
}

impl TestMatrix {
    /// Create an empty matrix for a source file.
    pub fn empty(repository: RepositoryRef, source: impl Into<String>) -> Self {
        Self {
            repository,
            source: source.into(),
            entries: Vec::new(),
        }
    }

    /// Whether no entries were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The distinct platforms this matrix tests, in sorted order.
    #[must_use]
    pub fn platforms(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.platform.as_str()).collect()
    }

    /// The highest language version tested for a platform.
    ///
    /// Returns `None` when the platform is absent from the matrix.
    #[must_use]
    pub fn max_version(&self, platform: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|e| e.platform == platform)
            .map(|e| e.language_version.as_str())
            .max_by(|a, b| compare_versions(a, b))
    }
}
