//! Container image pin

use serde::{Deserialize, Serialize};

/// An observed or canonical container pin, split into image and tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerReference {
    /// Image name without the tag, e.g. `quay.io/ansible/azure-pipelines-test-container`
    pub image: String,
    /// Tag, `latest` when the pin carries none
    pub tag: String,
}

impl ContainerReference {
    /// Parse an `image[:tag]` pin.
    ///
    /// A colon inside the registry host (port numbers) is not mistaken for a
    /// tag separator; only a colon after the last `/` counts.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let tag_start = spec.rfind(':').filter(|&i| i > spec.rfind('/').unwrap_or(0));
        match tag_start {
            Some(i) => Self {
                image: spec[..i].to_string(),
                tag: spec[i + 1..].to_string(),
            },
            None => Self {
                image: spec.to_string(),
                tag: "latest".to_string(),
            },
        }
    }
}

impl std::fmt::Display for ContainerReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.image, self.tag)
    }
}
