//! Drift comparator
//!
//! Pure functions diffing observed state against the canonical baseline.
//! The comparison is intentionally asymmetric: platforms a repository tests
//! beyond the reference produce no finding, because the tool exists to catch
//! staleness, not non-conformance.

use std::cmp::Ordering;

use crate::core::models::{
    CanonicalState, ContainerReference, Finding, RepositoryRef, TestMatrix, VersionNumber,
    compare_versions,
};

/// Diff an observed test matrix against the canonical one.
///
/// For each canonical platform: a strictly lower observed maximum language
/// version yields one `StaleMatrixEntry`; a platform entirely untested yields
/// one `MissingPlatform`. A repository testing no recognized platform at all
/// is skipped outright, matching the report's `Skipped` status.
#[must_use]
pub fn compare_matrix(
    observed: &TestMatrix,
    canonical: &TestMatrix,
    repository: &RepositoryRef,
) -> Vec<Finding> {
    if observed.is_empty() {
        return Vec::new();
    }

    let mut findings = Vec::new();

    for platform in canonical.platforms() {
        let Some(canonical_max) = canonical.max_version(platform) else {
            continue;
        };

        match observed.max_version(platform) {
            Some(observed_max) => {
                if compare_versions(observed_max, canonical_max) == Ordering::Less {
                    findings.push(Finding::stale_matrix_entry(
                        repository.clone(),
                        platform,
                        observed_max,
                        canonical_max,
                    ));
                }
            },
            None => {
                findings.push(Finding::missing_platform(
                    repository.clone(),
                    platform,
                    canonical_max,
                ));
            },
        }
    }

    findings
}

/// Diff an observed container pin against the canonical tag.
///
/// Non-numeric tags are unpinned; numeric tags strictly below the canonical
/// one are stale. An observed tag ahead of the canonical one is left alone.
#[must_use]
pub fn compare_container(
    observed: &ContainerReference,
    canonical_tag: &str,
    repository: &RepositoryRef,
) -> Vec<Finding> {
    if VersionNumber::parse(&observed.tag).is_none() {
        return vec![Finding::unpinned_container_tag(
            repository.clone(),
            observed.tag.as_str(),
        )];
    }

    if compare_versions(&observed.tag, canonical_tag) == Ordering::Less {
        return vec![Finding::stale_container_tag(
            repository.clone(),
            observed.tag.as_str(),
            canonical_tag,
        )];
    }

    Vec::new()
}

/// Diff every container pin in a definition against the canonical tag.
#[must_use]
pub fn compare_containers(
    observed: &[ContainerReference],
    canonical: &CanonicalState,
    repository: &RepositoryRef,
) -> Vec<Finding> {
    let Some(canonical_tag) = canonical.reference_container_tag.as_deref() else {
        return Vec::new();
    };
    observed
        .iter()
        .flat_map(|pin| compare_container(pin, canonical_tag, repository))
        .collect()
}

/// Sort findings by (repository name, branch, kind, platform) for
/// deterministic, diff-friendly reports.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.repository
            .cmp(&b.repository)
            .then_with(|| a.kind.cmp(&b.kind))
    });
}
