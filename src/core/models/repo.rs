//! Repository identity and mirrored snapshot handles

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A unique fetchable unit: one branch of one remote repository.
///
/// `name` is the `org/repo` form, e.g. `ansible-collections/community.general`.
/// `(name, branch)` addresses exactly one mirrored snapshot on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Repository name in `org/repo` form
    pub name: String,
    /// Branch name
    pub branch: String,
}

impl RepositoryRef {
    /// Create a ref from name and branch.
    pub fn new(name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch: branch.into(),
        }
    }

    /// The organization part of the name, when present.
    #[must_use]
    pub fn org(&self) -> Option<&str> {
        self.name.split_once('/').map(|(org, _)| org)
    }

    /// The repository part of the name.
    #[must_use]
    pub fn repo(&self) -> &str {
        self.name.split_once('/').map_or(self.name.as_str(), |(_, repo)| repo)
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.branch)
    }
}

/// Handle to an up-to-date local snapshot produced by the mirror.
///
/// `root` is the working-tree root the pipeline file path is relative to;
/// for collections this is the in-place `ansible_collections/<ns>/<name>`
/// subtree of the checkout.
#[derive(Debug, Clone)]
pub struct LocalSnapshot {
    /// The ref this snapshot was produced for
    pub repository: RepositoryRef,
    /// Working-tree root
    pub root: PathBuf,
    /// HEAD commit of the snapshot, when it could be determined
    pub head: Option<String>,
}
