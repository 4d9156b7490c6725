//! Canonical-state resolution
//!
//! Computes the single baseline every comparison in a run reads: the test
//! matrix actually exercised on the reference devel branch, and (for
//! container-mode runs) the latest published numeric tag of the shared test
//! container. Failure here is fatal for the whole run.

use std::path::Path;

use log::{debug, info};

use crate::config::Config;
use crate::core::models::{CanonicalState, RepositoryRef, VersionNumber};
use crate::core::ports::{ContainerRegistry, RepositoryMirror};
use crate::core::services::audit::CheckMode;
use crate::error::ResolutionError;
use crate::extract;
use crate::paths;

/// Compute the canonical state for one run.
///
/// The reference matrix comes from mirroring the reference repository's devel
/// branch and extracting its own pipeline definition, so the baseline tracks
/// upstream automatically instead of a hand-maintained list. The registry is
/// only consulted in container mode.
pub async fn resolve_canonical(
    cfg: &Config,
    mirror: &dyn RepositoryMirror,
    registry: &dyn ContainerRegistry,
    mode: CheckMode,
) -> Result<CanonicalState, ResolutionError> {
    let reference = RepositoryRef::new(&cfg.settings.core_repository, &cfg.settings.core_branch);

    let snapshot = mirror.ensure_present(&reference).await?;
    let bytes = mirror.read_file(&snapshot, Path::new(paths::PIPELINE_FILE))?;
    let reference_matrix = extract::extract(&bytes, reference.clone(), paths::PIPELINE_FILE)?;
    info!(
        "canonical matrix from {reference}: {} entries across {} platforms",
        reference_matrix.len(),
        reference_matrix.platforms().len()
    );

    let reference_container_tag = match mode {
        CheckMode::Matrix => None,
        CheckMode::Container => {
            let image = &cfg.settings.container_image;
            let tags = registry.list_tags(image).await?;
            debug!("registry lists {} tags for {image}", tags.len());
            let tag = select_latest_tag(&tags).ok_or_else(|| ResolutionError::NoNumericTag {
                image: image.clone(),
            })?;
            info!("canonical container tag for {image}: {tag}");
            Some(tag)
        },
    };

    Ok(CanonicalState {
        reference_matrix,
        reference_container_tag,
    })
}

/// Pick the highest numeric tag from a registry listing.
///
/// Non-numeric tags such as `latest` never win selection.
#[must_use]
pub fn select_latest_tag(tags: &[String]) -> Option<String> {
    tags.iter()
        .filter_map(|tag| VersionNumber::parse(tag).map(|version| (version, tag)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, tag)| tag.clone())
}
