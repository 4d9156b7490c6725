//! Centralized path definitions for azp-audit
//!
//! Single source of truth for every filesystem location the tool touches.
//!
//! ## Storage Layout
//!
//! ### State (mirror, reconstructible)
//!
//! ```text
//! ~/.ansible/azp-audit/              # or $AZP_AUDIT_HOME
//! └── repos/
//!     ├── ansible/ansible/devel/                    # core repo checkout
//!     └── ansible-collections/<ns>.<name>/<branch>/
//!         └── ansible_collections/<ns>/<name>/      # in-place collection tree
//! ```
//!
//! ### Configuration (user-provided)
//!
//! ```text
//! ~/.config/azp-audit/
//! ├── config.toml          # optional settings, all keys have defaults
//! ├── azure-devops.key     # Azure DevOps personal access token
//! └── github.key           # GitHub token
//! ```
//!
//! The state directory is safe to delete; `azp-audit sync` rebuilds it.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Environment variable overriding the state directory
pub const HOME_ENV: &str = "AZP_AUDIT_HOME";

/// Pipeline definition path relative to a repository working tree
pub const PIPELINE_FILE: &str = ".azure-pipelines/azure-pipelines.yml";

const STATE_DIR: &str = ".ansible/azp-audit";
const REPOS_DIR: &str = "repos";
const CONFIG_DIR: &str = "azp-audit";
const CONFIG_FILE: &str = "config.toml";
const AZURE_DEVOPS_KEY: &str = "azure-devops.key";
const GITHUB_KEY: &str = "github.key";

/// Get the state directory.
///
/// `$AZP_AUDIT_HOME` wins when set; otherwise `~/.ansible/azp-audit`.
#[must_use]
pub fn state_dir() -> PathBuf {
    std::env::var_os(HOME_ENV).map_or_else(
        || {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(STATE_DIR)
        },
        PathBuf::from,
    )
}

/// Get the repository mirror directory (`<state>/repos`).
#[must_use]
pub fn repos_dir() -> PathBuf {
    state_dir().join(REPOS_DIR)
}

/// Get the user configuration directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|d| d.join(CONFIG_DIR))
        .ok_or(ConfigError::NoConfigDir)
}

/// Get the settings file path (`config.toml`).
pub fn settings_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Get the Azure DevOps token file path.
pub fn azure_devops_key() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(AZURE_DEVOPS_KEY))
}

/// Get the GitHub token file path.
pub fn github_key() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(GITHUB_KEY))
}

/// Glob patterns matching every mirrored pipeline definition file.
///
/// One pattern for in-place collection trees, one for the core repository.
#[must_use]
pub fn pipeline_globs(repos_dir: &std::path::Path, collections_org: &str, core_repository: &str) -> Vec<String> {
    let root = repos_dir.display();
    vec![
        format!("{root}/{collections_org}/*/*/ansible_collections/*/*/{PIPELINE_FILE}"),
        format!("{root}/{core_repository}/*/{PIPELINE_FILE}"),
    ]
}
