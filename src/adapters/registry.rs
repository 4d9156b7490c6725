//! Container-registry tag listing
//!
//! Speaks the Quay-style repository API the shared test container is
//! published to. Anonymous access is sufficient for tag listing.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::core::ports::ContainerRegistry;
use crate::error::FetchError;

const PAGE_LIMIT: usize = 100;

/// Tag-listing client for the configured registry API.
#[derive(Debug)]
pub struct RegistryClient {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TagPage {
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    has_additional: bool,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

impl RegistryClient {
    /// Create a client against the configured registry API base.
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.network_timeout())
            .user_agent(concat!("azp-audit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: cfg.settings.registry_api.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContainerRegistry for RegistryClient {
    async fn list_tags(&self, image: &str) -> Result<Vec<String>, FetchError> {
        let mut names = Vec::new();

        for page in 1.. {
            let url = format!(
                "{}/repository/{image}/tag/?limit={PAGE_LIMIT}&page={page}&onlyActiveTags=true",
                self.api_base
            );
            let response = self
                .http
                .get(&url)
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

            let listing: TagPage =
                response.json().await.map_err(|e| FetchError::from_http(&url, &e))?;
            names.extend(listing.tags.into_iter().map(|t| t.name));
            if !listing.has_additional {
                break;
            }
        }

        Ok(names)
    }
}
