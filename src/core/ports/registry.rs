//! Container registry port

use async_trait::async_trait;

use crate::error::FetchError;

/// Lists published tags for a container image.
#[async_trait]
pub trait ContainerRegistry: Send + Sync {
    /// All active tag names for `image` (`namespace/name` form).
    async fn list_tags(&self, image: &str) -> Result<Vec<String>, FetchError>;
}
