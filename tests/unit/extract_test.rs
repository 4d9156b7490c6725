//! Extraction tests against realistic pipeline fixtures

use azp_audit::core::models::{FindingKind, RepositoryRef};
use azp_audit::core::services::comparator;
use azp_audit::extract;

use super::common::fixtures;

fn extract_fixture(yaml: &str, name: &str, branch: &str) -> azp_audit::core::models::TestMatrix {
    extract::extract(
        yaml.as_bytes(),
        RepositoryRef::new(name, branch),
        ".azure-pipelines/azure-pipelines.yml",
    )
    .unwrap()
}

#[test]
fn collection_pipeline_extracts_devel_platform_entries() {
    let matrix = extract_fixture(
        fixtures::COLLECTION_PIPELINE,
        "ansible-collections/community.general",
        "main",
    );

    // fedora/37 and rhel/9.1 across two groups; sanity, units, the
    // stable-2.14 stage and the coverage template all drop out
    assert_eq!(matrix.len(), 4);
    let platforms: Vec<&str> = matrix.platforms().into_iter().collect();
    assert_eq!(platforms, vec!["fedora", "rhel"]);
    assert_eq!(matrix.max_version("fedora"), Some("37"));
    assert_eq!(matrix.max_version("rhel"), Some("9.1"));
}

#[test]
fn collection_pipeline_container_pin_is_extracted() {
    let containers =
        extract::extract_containers(fixtures::COLLECTION_PIPELINE.as_bytes()).unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].image, "quay.io/ansible/azure-pipelines-test-container");
    assert_eq!(containers[0].tag, "2.0");
}

#[test]
fn core_pipeline_extracts_reference_matrix() {
    let matrix = extract_fixture(fixtures::CORE_PIPELINE, "ansible/ansible", "devel");

    assert_eq!(matrix.len(), 3);
    let platforms: Vec<&str> = matrix.platforms().into_iter().collect();
    assert_eq!(platforms, vec!["alpine", "fedora", "rhel"]);
    assert_eq!(matrix.max_version("fedora"), Some("39"));
}

#[test]
fn collection_drifts_against_core_reference() {
    let observed = extract_fixture(
        fixtures::COLLECTION_PIPELINE,
        "ansible-collections/community.general",
        "main",
    );
    let canonical = extract_fixture(fixtures::CORE_PIPELINE, "ansible/ansible", "devel");
    let repo = observed.repository.clone();

    let mut findings = comparator::compare_matrix(&observed, &canonical, &repo);
    comparator::sort_findings(&mut findings);

    assert_eq!(findings.len(), 3);
    assert_eq!(
        findings[0].kind,
        FindingKind::StaleMatrixEntry {
            platform: "fedora".to_string(),
            observed_max: "37".to_string(),
            canonical_max: "39".to_string(),
        }
    );
    assert_eq!(
        findings[1].kind,
        FindingKind::StaleMatrixEntry {
            platform: "rhel".to_string(),
            observed_max: "9.1".to_string(),
            canonical_max: "9.3".to_string(),
        }
    );
    assert_eq!(
        findings[2].kind,
        FindingKind::MissingPlatform {
            platform: "alpine".to_string(),
            canonical_max: "3.19".to_string(),
        }
    );
}

#[test]
fn identical_bytes_extract_identically() {
    let first = extract_fixture(
        fixtures::COLLECTION_PIPELINE,
        "ansible-collections/community.general",
        "main",
    );
    let second = extract_fixture(
        fixtures::COLLECTION_PIPELINE,
        "ansible-collections/community.general",
        "main",
    );
    assert_eq!(first, second);
}
