//! Repository discovery port

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::FetchError;

/// Discovers the set of repositories and branches the audit should cover.
///
/// The real implementation walks the CI platform's pipeline inventory and the
/// source host's branch lists; the result maps `org/repo` names to their
/// relevant branch names, sorted.
#[async_trait]
pub trait RepositoryDiscovery: Send + Sync {
    /// Discover repositories and the branches worth mirroring for each.
    async fn discover(&self) -> Result<BTreeMap<String, Vec<String>>, FetchError>;
}
