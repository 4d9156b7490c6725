//! GitHub REST client
//!
//! Only branch listing is needed: discovery decides which branches of each
//! repository are worth mirroring.

use serde::Deserialize;

use crate::config::Config;
use crate::error::FetchError;

const PER_PAGE: usize = 100;

/// Minimal authenticated GitHub API client.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token.
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

impl GitHubClient {
    /// Create a client.
    ///
    /// Requires the GitHub token; its absence is a pre-flight
    /// [`crate::error::ConfigError`].
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let token = cfg.require_github_token()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(cfg.network_timeout())
            .user_agent(concat!("azp-audit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: cfg.settings.github_api.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// All branch names of `full_name` (`org/repo`), paginated.
    pub async fn branch_names(&self, full_name: &str) -> Result<Vec<String>, FetchError> {
        let mut names = Vec::new();

        for page in 1.. {
            let url = format!(
                "{}/repos/{full_name}/branches?per_page={PER_PAGE}&page={page}",
                self.api_base
            );
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .header("Accept", "application/vnd.github+json")
                .send()
                .await
                .map_err(|e| FetchError::from_http(&url, &e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Http {
                    url,
                    detail: format!("status {status}"),
                });
            }

            let branches: Vec<Branch> =
                response.json().await.map_err(|e| FetchError::from_http(&url, &e))?;
            let page_len = branches.len();
            names.extend(branches.into_iter().map(|b| b.name));
            if page_len < PER_PAGE {
                break;
            }
        }

        Ok(names)
    }
}
