//! Git-backed repository mirror
//!
//! Owns the persistent on-disk snapshot tree (see [`crate::paths`] for the
//! layout). Fetches shell out to the git CLI; snapshot inspection uses
//! `git2`. Updates fail soft: when a pull breaks, the last good checkout is
//! served with a recorded warning, so one unreachable remote never takes the
//! rest of a run down.
//!
//! Collection repositories are cloned in place under
//! `ansible_collections/<ns>/<name>` inside the branch directory, which keeps
//! the checkout directly usable by collection tooling.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::process::Command;
use tokio::sync::Mutex;
use walkdir::WalkDir;

use crate::config::Config;
use crate::core::models::{LocalSnapshot, RepositoryRef};
use crate::core::ports::RepositoryMirror;
use crate::error::FetchError;

/// Repository mirror backed by git checkouts under the state directory.
#[derive(Debug)]
pub struct GitMirror {
    cfg: Config,
    timeout: Duration,
    // One lock per ref: concurrent fetches of the same snapshot would corrupt
    // a partially-updated checkout.
    locks: StdMutex<HashMap<RepositoryRef, Arc<Mutex<()>>>>,
}

impl GitMirror {
    /// Create a mirror rooted at the configured repos directory.
    #[must_use]
    pub fn new(cfg: &Config) -> Self {
        Self {
            cfg: cfg.clone(),
            timeout: cfg.network_timeout(),
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Working-tree root for a ref.
    ///
    /// Collection checkouts live below `ansible_collections/<ns>/<name>`; the
    /// core repository's tree is the branch directory itself.
    #[must_use]
    pub fn work_dir(&self, repository: &RepositoryRef) -> PathBuf {
        let checkout = self
            .cfg
            .repos_dir
            .join(&repository.name)
            .join(&repository.branch);
        if repository.org() == Some(self.cfg.settings.collections_org.as_str()) {
            checkout
                .join("ansible_collections")
                .join(repository.repo().replace('.', "/"))
        } else {
            checkout
        }
    }

    /// Delete local branch directories for `name` that are not in `keep`.
    ///
    /// Returns the purged branch names.
    pub fn purge_stale_branches(
        &self,
        name: &str,
        keep: &[String],
    ) -> Result<Vec<String>, FetchError> {
        let repo_dir = self.cfg.repos_dir.join(name);
        if !repo_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut purged = Vec::new();
        for entry in fs::read_dir(&repo_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let branch = entry.file_name().to_string_lossy().to_string();
            if !keep.contains(&branch) {
                fs::remove_dir_all(entry.path())?;
                purged.push(branch);
            }
        }
        purged.sort();
        Ok(purged)
    }

    fn lock_for(&self, repository: &RepositoryRef) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(repository.clone()).or_default())
    }

    fn clone_url(&self, repository: &RepositoryRef) -> String {
        format!("{}/{}", self.cfg.settings.clone_base, repository.name)
    }

    async fn run_git(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        action: &str,
        repository: &RepositoryRef,
    ) -> Result<(), FetchError> {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
            .map_err(FetchError::Io)?;

        if output.status.success() {
            Ok(())
        } else {
            Err(FetchError::Git {
                action: action.to_string(),
                repo: repository.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn update(&self, repository: &RepositoryRef, work_dir: &Path) -> Result<(), FetchError> {
        self.run_git(&["checkout", "."], Some(work_dir), "checkout", repository)
            .await?;
        self.run_git(&["clean", "-fxd"], Some(work_dir), "clean", repository)
            .await?;
        self.run_git(&["pull"], Some(work_dir), "pull", repository).await
    }

    async fn clone_fresh(
        &self,
        repository: &RepositoryRef,
        work_dir: &Path,
    ) -> Result<(), FetchError> {
        if let Some(parent) = work_dir.parent() {
            fs::create_dir_all(parent)?;
        }
        let url = self.clone_url(repository);
        let target = work_dir.to_string_lossy().to_string();
        self.run_git(
            &["clone", &url, "--branch", &repository.branch, &target],
            None,
            "clone",
            repository,
        )
        .await
    }

    fn head_commit(work_dir: &Path) -> Option<String> {
        let repo = git2::Repository::open(work_dir).ok()?;
        let head = repo.head().ok()?;
        head.target().map(|oid| oid.to_string())
    }
}

#[async_trait]
impl RepositoryMirror for GitMirror {
    async fn ensure_present(
        &self,
        repository: &RepositoryRef,
    ) -> Result<LocalSnapshot, FetchError> {
        let lock = self.lock_for(repository);
        let _guard = lock.lock().await;

        let work_dir = self.work_dir(repository);

        if work_dir.join(".git").exists() {
            if let Err(err) = self.update(repository, &work_dir).await {
                // Fail soft: the last good snapshot is better than no result.
                warn!("{repository}: update failed, using last good snapshot: {err}");
            }
        } else {
            self.clone_fresh(repository, &work_dir).await?;
            debug!("{repository}: cloned into {}", work_dir.display());
        }

        Ok(LocalSnapshot {
            repository: repository.clone(),
            head: Self::head_commit(&work_dir),
            root: work_dir,
        })
    }

    fn read_file(&self, snapshot: &LocalSnapshot, path: &Path) -> Result<Vec<u8>, FetchError> {
        let full = snapshot.root.join(path);
        if !full.is_file() {
            return Err(FetchError::NotFound(full));
        }
        Ok(fs::read(full)?)
    }

    fn list_known_refs(&self) -> Result<Vec<RepositoryRef>, FetchError> {
        let repos_dir = &self.cfg.repos_dir;
        if !repos_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut refs = Vec::new();
        for entry in WalkDir::new(repos_dir).min_depth(3).max_depth(3) {
            let entry = entry.map_err(|e| FetchError::Io(e.into()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(repos_dir) else {
                continue;
            };
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            let [org, repo, branch] = parts.as_slice() else {
                continue;
            };
            let name = format!("{org}/{repo}");
            if self.cfg.is_repository_allowed(&name) {
                refs.push(RepositoryRef::new(name, branch.clone()));
            }
        }

        refs.sort();
        Ok(refs)
    }
}
