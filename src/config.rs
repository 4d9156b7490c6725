//! Runtime configuration
//!
//! All configuration is loaded once at startup into an explicit [`Config`]
//! object and passed by reference into every component. Settings come from
//! `~/.config/azp-audit/config.toml` (every key optional, see [`Settings`]);
//! credentials from fixed key files next to it. A missing required token is a
//! fatal [`ConfigError`] reported before any network activity.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths;

/// User-tunable settings, deserialized from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Azure DevOps organization URL
    pub organization_url: String,
    /// Reference repository in `org/name` form
    pub core_repository: String,
    /// Development branch of the reference repository
    pub core_branch: String,
    /// GitHub organization hosting collection repositories
    pub collections_org: String,
    /// Shared test-container image, in `namespace/name` registry form
    pub container_image: String,
    /// Container registry API base URL
    pub registry_api: String,
    /// GitHub API base URL
    pub github_api: String,
    /// Base URL repositories are cloned from
    pub clone_base: String,
    /// Maximum number of repositories processed concurrently
    pub concurrency: usize,
    /// Per-request network timeout in seconds
    pub network_timeout_secs: u64,
    /// Attempts per network-bound operation before recording a failure
    pub retry_attempts: u32,
    /// Repository names to audit; empty means every known repository
    pub allow: Vec<String>,
    /// Repository names excluded from the audit
    pub deny: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            organization_url: "https://dev.azure.com/ansible".to_string(),
            core_repository: "ansible/ansible".to_string(),
            core_branch: "devel".to_string(),
            collections_org: "ansible-collections".to_string(),
            container_image: "ansible/azure-pipelines-test-container".to_string(),
            registry_api: "https://quay.io/api/v1".to_string(),
            github_api: "https://api.github.com".to_string(),
            clone_base: "https://github.com".to_string(),
            concurrency: 8,
            network_timeout_secs: 30,
            retry_attempts: 3,
            allow: Vec::new(),
            deny: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from disk, falling back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = paths::settings_file()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(&path).map_err(|source| ConfigError::Unreadable {
                path: path.clone(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| ConfigError::InvalidSettings { path, source })
    }
}

/// Fully-resolved runtime configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// User settings
    pub settings: Settings,
    /// Resolved repository mirror directory
    pub repos_dir: PathBuf,
    /// Azure DevOps token, when its key file exists
    azure_devops_token: Option<String>,
    /// GitHub token, when its key file exists
    github_token: Option<String>,
}

impl Config {
    /// Load settings and credentials from their fixed locations.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Settings::load()?;
        Ok(Self {
            settings,
            repos_dir: paths::repos_dir(),
            azure_devops_token: read_key(paths::azure_devops_key()?)?,
            github_token: read_key(paths::github_key()?)?,
        })
    }

    /// Build a config from explicit parts, for tests and embedding.
    #[must_use]
    pub const fn from_parts(
        settings: Settings,
        repos_dir: PathBuf,
        azure_devops_token: Option<String>,
        github_token: Option<String>,
    ) -> Self {
        Self {
            settings,
            repos_dir,
            azure_devops_token,
            github_token,
        }
    }

    /// Azure DevOps token, or the fatal pre-flight error naming its path.
    pub fn require_azure_devops_token(&self) -> Result<&str, ConfigError> {
        match self.azure_devops_token.as_deref() {
            Some(token) => Ok(token),
            None => Err(ConfigError::MissingCredential(paths::azure_devops_key()?)),
        }
    }

    /// GitHub token, or the fatal pre-flight error naming its path.
    pub fn require_github_token(&self) -> Result<&str, ConfigError> {
        match self.github_token.as_deref() {
            Some(token) => Ok(token),
            None => Err(ConfigError::MissingCredential(paths::github_key()?)),
        }
    }

    /// Per-request network timeout.
    #[must_use]
    pub const fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.network_timeout_secs)
    }

    /// Whether a repository name passes the allow/deny lists.
    #[must_use]
    pub fn is_repository_allowed(&self, name: &str) -> bool {
        if self.settings.deny.iter().any(|d| d == name) {
            return false;
        }
        self.settings.allow.is_empty() || self.settings.allow.iter().any(|a| a == name)
    }
}

fn read_key(path: PathBuf) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)
        .map_err(|source| ConfigError::Unreadable { path, source })?;
    Ok(Some(content.trim().to_string()))
}
