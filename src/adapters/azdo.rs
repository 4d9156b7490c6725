//! Azure DevOps REST client
//!
//! Covers the slice of the API the audit needs: the organization's projects,
//! each project's pipelines, and the source repository a pipeline builds.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::FetchError;

const API_VERSION: &str = "api-version=6.0";

/// Client for one Azure DevOps organization, authenticated with a PAT.
pub struct AzureDevOpsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for AzureDevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token.
        f.debug_struct("AzureDevOpsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// A team project within the organization.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Project name, used as the URL segment for further queries
    pub name: String,
}

/// A pipeline definition within a project.
#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    /// Definition id, shared with the build-definitions API
    pub id: u64,
    /// Pipeline display name
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct BuildDefinition {
    repository: Option<BuildRepository>,
}

#[derive(Debug, Deserialize)]
struct BuildRepository {
    url: Option<String>,
}

impl AzureDevOpsClient {
    /// Create a client for the configured organization.
    ///
    /// Requires the Azure DevOps token; its absence is a pre-flight
    /// [`crate::error::ConfigError`].
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let token = cfg.require_azure_devops_token()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(cfg.network_timeout())
            .user_agent(concat!("azp-audit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.settings.organization_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .basic_auth("", Some(&self.token))
            .send()
            .await
            .map_err(|e| FetchError::from_http(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                detail: format!("status {status}"),
            });
        }

        response.json().await.map_err(|e| FetchError::from_http(url, &e))
    }

    /// List the organization's team projects.
    pub async fn projects(&self) -> Result<Vec<Project>, FetchError> {
        let url = format!("{}/_apis/projects?{API_VERSION}", self.base_url);
        let list: ListResponse<Project> = self.get_json(&url).await?;
        Ok(list.value)
    }

    /// List the pipelines defined in a project.
    pub async fn pipelines(&self, project: &str) -> Result<Vec<Pipeline>, FetchError> {
        let url = format!("{}/{project}/_apis/pipelines?{API_VERSION}", self.base_url);
        let list: ListResponse<Pipeline> = self.get_json(&url).await?;
        Ok(list.value)
    }

    /// The source repository URL a pipeline builds, when one is recorded.
    pub async fn repository_url(
        &self,
        project: &str,
        definition_id: u64,
    ) -> Result<Option<String>, FetchError> {
        let url = format!(
            "{}/{project}/_apis/build/definitions/{definition_id}?{API_VERSION}",
            self.base_url
        );
        let definition: BuildDefinition = self.get_json(&url).await?;
        Ok(definition.repository.and_then(|r| r.url))
    }
}
