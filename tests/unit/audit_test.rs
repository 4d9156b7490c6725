//! End-to-end audit runner tests over in-memory ports

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;

use azp_audit::config::{Config, Settings};
use azp_audit::core::models::{CanonicalState, FindingKind, RepositoryRef, Severity};
use azp_audit::core::ports::RepositoryMirror;
use azp_audit::core::services::{CheckMode, resolver, run_audit};
use azp_audit::error::ResolutionError;
use azp_audit::extract;
use azp_audit::output::Report;

use super::common::fixtures;
use super::common::mocks::{MockMirror, MockRegistry};
use super::common::test_config;

fn canonical_from(yaml: &str, tag: Option<&str>) -> CanonicalState {
    let reference = RepositoryRef::new("ansible/ansible", "devel");
    CanonicalState {
        reference_matrix: extract::extract(
            yaml.as_bytes(),
            reference,
            ".azure-pipelines/azure-pipelines.yml",
        )
        .unwrap(),
        reference_container_tag: tag.map(String::from),
    }
}

fn no_cancel() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

fn collection(n: usize) -> RepositoryRef {
    RepositoryRef::new(format!("ansible-collections/collection.{n}"), "main")
}

#[tokio::test]
async fn stale_matrix_entry_is_reported() {
    let repo = RepositoryRef::new("ansible-collections/community.general", "main");
    let mirror = Arc::new(
        MockMirror::new().with_pipeline(repo.clone(), fixtures::STALE_LINUX_PIPELINE),
    );
    let canonical = Arc::new(canonical_from(fixtures::CANONICAL_LINUX_PIPELINE, None));
    let cfg = test_config(PathBuf::from("/unused"));
    let refs = mirror.list_known_refs().unwrap();

    let outcome =
        run_audit(&cfg, mirror, canonical, refs, CheckMode::Matrix, no_cancel()).await;

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(
        outcome.findings[0].kind,
        FindingKind::StaleMatrixEntry {
            platform: "linux".to_string(),
            observed_max: "3.9".to_string(),
            canonical_max: "3.11".to_string(),
        }
    );
    assert!(outcome.has_warnings());
}

#[tokio::test]
async fn container_drift_fails_the_run() {
    let core = RepositoryRef::new("ansible/ansible", "devel");
    let repo = RepositoryRef::new("ansible-collections/community.general", "main");
    let mirror = MockMirror::new()
        .with_pipeline(core, fixtures::CORE_PIPELINE)
        .with_pipeline(repo.clone(), fixtures::COLLECTION_PIPELINE);
    let registry = MockRegistry::new(&["2.0", "2.1", "latest", "1.9"]);
    let cfg = test_config(PathBuf::from("/unused"));

    let canonical = resolver::resolve_canonical(&cfg, &mirror, &registry, CheckMode::Container)
        .await
        .unwrap();
    assert_eq!(canonical.reference_container_tag.as_deref(), Some("2.1"));

    let refs = vec![repo.clone()];
    let outcome = run_audit(
        &cfg,
        Arc::new(mirror),
        Arc::new(canonical),
        refs.clone(),
        CheckMode::Container,
        no_cancel(),
    )
    .await;

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(
        outcome.findings[0].kind,
        FindingKind::StaleContainerTag {
            observed: "2.0".to_string(),
            canonical: "2.1".to_string(),
        }
    );

    let report = Report::build(CheckMode::Container, &refs, outcome);
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn unpinned_container_is_a_warning() {
    let repo = RepositoryRef::new("ansible-collections/community.dns", "main");
    let mirror = Arc::new(
        MockMirror::new().with_pipeline(repo.clone(), fixtures::UNPINNED_CONTAINER_PIPELINE),
    );
    let canonical = Arc::new(canonical_from(fixtures::CANONICAL_LINUX_PIPELINE, Some("2.1")));
    let cfg = test_config(PathBuf::from("/unused"));

    let outcome = run_audit(
        &cfg,
        mirror,
        canonical,
        vec![repo],
        CheckMode::Container,
        no_cancel(),
    )
    .await;

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].severity, Severity::Warning);
    assert!(matches!(
        outcome.findings[0].kind,
        FindingKind::UnpinnedContainerTag { .. }
    ));
}

#[tokio::test]
async fn one_unreachable_repository_does_not_abort_the_batch() {
    let bad = collection(0);
    let mut mirror = MockMirror::new().with_unreachable(bad.clone());
    for n in 1..10 {
        mirror = mirror.with_pipeline(collection(n), fixtures::STALE_LINUX_PIPELINE);
    }
    let mirror = Arc::new(mirror);
    let canonical = Arc::new(canonical_from(fixtures::CANONICAL_LINUX_PIPELINE, None));
    let cfg = test_config(PathBuf::from("/unused"));
    let refs = mirror.list_known_refs().unwrap();
    assert_eq!(refs.len(), 10);

    let outcome =
        run_audit(&cfg, mirror, canonical, refs, CheckMode::Matrix, no_cancel()).await;

    assert_eq!(outcome.processed, 10);
    assert_eq!(outcome.unreachable, 1);
    assert!(!outcome.cancelled);

    let fetch_failures: Vec<_> = outcome
        .findings
        .iter()
        .filter(|f| matches!(f.kind, FindingKind::FetchFailure { .. }))
        .collect();
    assert_eq!(fetch_failures.len(), 1);
    assert_eq!(fetch_failures[0].repository, bad);

    let stale = outcome
        .findings
        .iter()
        .filter(|f| matches!(f.kind, FindingKind::StaleMatrixEntry { .. }))
        .count();
    assert_eq!(stale, 9);
    // exit status reflects the warnings, not the unreachable repository
    assert!(outcome.has_warnings());
}

#[tokio::test]
async fn fetch_retries_are_bounded() {
    let bad = collection(0);
    let mirror = Arc::new(MockMirror::new().with_unreachable(bad.clone()));
    let canonical = Arc::new(canonical_from(fixtures::CANONICAL_LINUX_PIPELINE, None));
    let settings = Settings {
        retry_attempts: 2,
        ..Settings::default()
    };
    let cfg = Config::from_parts(settings, PathBuf::from("/unused"), None, None);

    let mirror_port: Arc<dyn RepositoryMirror> = mirror.clone();
    let outcome = run_audit(
        &cfg,
        mirror_port,
        canonical,
        vec![bad.clone()],
        CheckMode::Matrix,
        no_cancel(),
    )
    .await;

    assert_eq!(mirror.fetch_count(&bad), 2);
    assert_eq!(outcome.unreachable, 1);
}

#[tokio::test]
async fn cancelled_run_discards_pending_repositories() {
    let repo = collection(1);
    let mirror = Arc::new(
        MockMirror::new().with_pipeline(repo.clone(), fixtures::STALE_LINUX_PIPELINE),
    );
    let canonical = Arc::new(canonical_from(fixtures::CANONICAL_LINUX_PIPELINE, None));
    let cfg = test_config(PathBuf::from("/unused"));

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let outcome = run_audit(&cfg, mirror, canonical, vec![repo], CheckMode::Matrix, rx).await;

    assert!(outcome.cancelled);
    assert_eq!(outcome.processed, 0);
    assert!(outcome.findings.is_empty());
}

#[tokio::test]
async fn repository_without_pipeline_is_clean() {
    let repo = collection(1);
    let mirror = Arc::new(MockMirror::new());
    let canonical = Arc::new(canonical_from(fixtures::CANONICAL_LINUX_PIPELINE, None));
    let cfg = test_config(PathBuf::from("/unused"));

    let outcome = run_audit(&cfg, mirror, canonical, vec![repo], CheckMode::Matrix, no_cancel())
        .await;

    assert_eq!(outcome.processed, 1);
    assert!(outcome.findings.is_empty());
}

#[tokio::test]
async fn matrix_mode_never_consults_the_registry() {
    let core = RepositoryRef::new("ansible/ansible", "devel");
    let mirror = MockMirror::new().with_pipeline(core, fixtures::CORE_PIPELINE);
    // A registry with no numeric tags would be fatal in container mode
    let registry = MockRegistry::new(&["latest"]);
    let cfg = test_config(PathBuf::from("/unused"));

    let canonical = resolver::resolve_canonical(&cfg, &mirror, &registry, CheckMode::Matrix)
        .await
        .unwrap();
    assert!(canonical.reference_container_tag.is_none());
    assert!(!canonical.reference_matrix.is_empty());
}

#[tokio::test]
async fn missing_numeric_tag_is_fatal_for_container_mode() {
    let core = RepositoryRef::new("ansible/ansible", "devel");
    let mirror = MockMirror::new().with_pipeline(core, fixtures::CORE_PIPELINE);
    let registry = MockRegistry::new(&["latest", "edge"]);
    let cfg = test_config(PathBuf::from("/unused"));

    let result = resolver::resolve_canonical(&cfg, &mirror, &registry, CheckMode::Container).await;
    assert!(matches!(result, Err(ResolutionError::NoNumericTag { .. })));
}
