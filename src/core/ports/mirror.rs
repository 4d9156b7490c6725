//! Repository mirror port

use std::path::Path;

use async_trait::async_trait;

use crate::core::models::{LocalSnapshot, RepositoryRef};
use crate::error::FetchError;

/// Maintains local, up-to-date snapshots of remote repositories.
///
/// Implementations own persistent on-disk state. Fetches for distinct refs
/// are safely parallelizable; two fetches for the same ref must serialize.
#[async_trait]
pub trait RepositoryMirror: Send + Sync {
    /// Idempotently fetch or update the snapshot for `repository`.
    ///
    /// A failed update of an existing snapshot falls back to the last good
    /// local state with a recorded warning; only a failed initial fetch is an
    /// error, and it is isolated to this ref.
    async fn ensure_present(&self, repository: &RepositoryRef)
    -> Result<LocalSnapshot, FetchError>;

    /// Read a file at `path` relative to the snapshot's working-tree root.
    fn read_file(&self, snapshot: &LocalSnapshot, path: &Path) -> Result<Vec<u8>, FetchError>;

    /// Every ref currently mirrored on disk, filtered by the configured
    /// allow/deny lists, in sorted order.
    fn list_known_refs(&self) -> Result<Vec<RepositoryRef>, FetchError>;
}
