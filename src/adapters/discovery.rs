//! Repository discovery
//!
//! Walks the CI organization's pipeline inventory to find which source
//! repositories are wired into Azure Pipelines, then asks the source host
//! which branches of each are worth mirroring. Only repositories under the
//! configured orgs count; anything else a pipeline happens to build is
//! logged and skipped.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use log::{debug, info};

use crate::adapters::azdo::AzureDevOpsClient;
use crate::adapters::github::GitHubClient;
use crate::config::Config;
use crate::core::models::VersionNumber;
use crate::core::ports::RepositoryDiscovery;
use crate::error::FetchError;

/// How many newest stable branches of the core repository to track.
const CORE_STABLE_BRANCHES: usize = 4;

/// Discovery backed by the Azure DevOps and GitHub APIs.
#[derive(Debug)]
pub struct ApiDiscovery {
    azdo: AzureDevOpsClient,
    github: GitHubClient,
    clone_base: String,
    core_repository: String,
    collections_org: String,
}

impl ApiDiscovery {
    /// Create a discovery client. Requires both API tokens.
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            azdo: AzureDevOpsClient::new(cfg)?,
            github: GitHubClient::new(cfg)?,
            clone_base: cfg.settings.clone_base.trim_end_matches('/').to_string(),
            core_repository: cfg.settings.core_repository.clone(),
            collections_org: cfg.settings.collections_org.clone(),
        })
    }

    /// Map a pipeline's repository URL to an `org/repo` name, when it lives
    /// under one of the configured orgs.
    fn repo_name_from_url(&self, url: &str) -> Option<String> {
        let name = url
            .strip_prefix(&format!("{}/", self.clone_base))?
            .strip_suffix(".git")?;
        let is_collection = name
            .strip_prefix(&self.collections_org)
            .is_some_and(|rest| rest.starts_with('/'));
        (name == self.core_repository || is_collection).then(|| name.to_string())
    }

    fn keep_branches(&self, name: &str, all: Vec<String>) -> Vec<String> {
        if name == self.core_repository {
            filter_core_branches(&all)
        } else {
            filter_collection_branches(&all)
        }
    }
}

#[async_trait]
impl RepositoryDiscovery for ApiDiscovery {
    async fn discover(&self) -> Result<BTreeMap<String, Vec<String>>, FetchError> {
        let mut names = BTreeSet::new();

        for project in self.azdo.projects().await? {
            for pipeline in self.azdo.pipelines(&project.name).await? {
                let Some(url) = self.azdo.repository_url(&project.name, pipeline.id).await?
                else {
                    continue;
                };
                if let Some(name) = self.repo_name_from_url(&url) {
                    names.insert(name);
                } else {
                    debug!(
                        "{}: pipeline {} builds unrecognized repository {url}",
                        project.name, pipeline.name
                    );
                }
            }
        }

        info!("discovered {} repositories", names.len());

        let mut repos = BTreeMap::new();
        for name in names {
            let branches = self.github.branch_names(&name).await?;
            let kept = self.keep_branches(&name, branches);
            if kept.is_empty() {
                debug!("{name}: no relevant branches");
            }
            repos.insert(name, kept);
        }

        Ok(repos)
    }
}

/// The core repository tracks devel plus its newest stable branches.
fn filter_core_branches(all: &[String]) -> Vec<String> {
    let mut stable: Vec<(VersionNumber, &String)> = all
        .iter()
        .filter_map(|b| {
            b.strip_prefix("stable-")
                .and_then(VersionNumber::parse)
                .map(|v| (v, b))
        })
        .collect();
    stable.sort_by(|a, b| b.0.cmp(&a.0));

    let mut kept: Vec<String> = std::iter::once("devel".to_string())
        .chain(stable.into_iter().take(CORE_STABLE_BRANCHES).map(|(_, b)| b.clone()))
        .collect();
    kept.sort();
    kept
}

/// Collections track their development and release branches.
fn filter_collection_branches(all: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = all
        .iter()
        .filter(|b| {
            matches!(b.as_str(), "devel" | "main" | "master") || b.starts_with("stable-")
        })
        .cloned()
        .collect();
    kept.sort();
    kept
}
