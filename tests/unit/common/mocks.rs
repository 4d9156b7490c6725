//! In-memory port implementations for testing without real IO

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use azp_audit::core::models::{LocalSnapshot, RepositoryRef};
use azp_audit::core::ports::{ContainerRegistry, RepositoryMirror};
use azp_audit::error::FetchError;

/// Mirror serving pipeline bytes from memory, with configurable failures.
pub struct MockMirror {
    pipelines: HashMap<RepositoryRef, Vec<u8>>,
    unreachable: Vec<RepositoryRef>,
    fetches: Mutex<Vec<RepositoryRef>>,
}

impl MockMirror {
    pub fn new() -> Self {
        Self {
            pipelines: HashMap::new(),
            unreachable: Vec::new(),
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pipeline(mut self, repository: RepositoryRef, yaml: &str) -> Self {
        self.pipelines.insert(repository, yaml.as_bytes().to_vec());
        self
    }

    pub fn with_unreachable(mut self, repository: RepositoryRef) -> Self {
        self.unreachable.push(repository);
        self
    }

    /// How many `ensure_present` calls were made for `repository`.
    pub fn fetch_count(&self, repository: &RepositoryRef) -> usize {
        self.fetches.lock().unwrap().iter().filter(|r| *r == repository).count()
    }
}

impl Default for MockMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryMirror for MockMirror {
    async fn ensure_present(
        &self,
        repository: &RepositoryRef,
    ) -> Result<LocalSnapshot, FetchError> {
        self.fetches.lock().unwrap().push(repository.clone());
        if self.unreachable.contains(repository) {
            return Err(FetchError::Http {
                url: format!("https://github.com/{}", repository.name),
                detail: "unreachable".to_string(),
            });
        }
        Ok(LocalSnapshot {
            repository: repository.clone(),
            root: PathBuf::from("/mock"),
            head: None,
        })
    }

    fn read_file(&self, snapshot: &LocalSnapshot, path: &Path) -> Result<Vec<u8>, FetchError> {
        self.pipelines
            .get(&snapshot.repository)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_path_buf()))
    }

    fn list_known_refs(&self) -> Result<Vec<RepositoryRef>, FetchError> {
        let mut refs: Vec<RepositoryRef> = self
            .pipelines
            .keys()
            .chain(self.unreachable.iter())
            .cloned()
            .collect();
        refs.sort();
        refs.dedup();
        Ok(refs)
    }
}

/// Registry serving a fixed tag list.
pub struct MockRegistry {
    pub tags: Vec<String>,
}

impl MockRegistry {
    pub fn new(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(ToString::to_string).collect(),
        }
    }
}

#[async_trait]
impl ContainerRegistry for MockRegistry {
    async fn list_tags(&self, _image: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.tags.clone())
    }
}
