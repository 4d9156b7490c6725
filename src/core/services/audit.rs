//! Audit runner
//!
//! Processes every repository ref on a bounded worker pool. The canonical
//! state is computed before this runs and shared read-only; per-repository
//! work (mirror update, extract, compare) is independent, so tasks only
//! contend on the concurrency semaphore and the mirror's per-ref locks.
//!
//! Failure isolation: a repository that stays unreachable through every retry
//! attempt, or whose pipeline file does not parse, becomes a Finding; it never
//! aborts the batch. Cancellation is cooperative: tasks observe the flag
//! between retry attempts and discard partial findings.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;

use crate::config::Config;
use crate::core::models::{CanonicalState, Finding, RepositoryRef, Severity};
use crate::core::ports::RepositoryMirror;
use crate::core::services::comparator;
use crate::error::FetchError;
use crate::extract;
use crate::paths;

/// Delay before the first retry; doubles on each subsequent attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Which drift dimension a check run compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Compare test matrices against the reference matrix
    Matrix,
    /// Compare container pins against the latest published tag
    Container,
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matrix => write!(f, "matrix"),
            Self::Container => write!(f, "container"),
        }
    }
}

/// Aggregate outcome of one audit run.
#[derive(Debug)]
pub struct AuditOutcome {
    /// All findings, in report order
    pub findings: Vec<Finding>,
    /// Refs whose processing completed (including ones recorded as failures)
    pub processed: usize,
    /// Refs that stayed unreachable through every retry
    pub unreachable: usize,
    /// Whether the run was interrupted before all refs completed
    pub cancelled: bool,
}

impl AuditOutcome {
    /// Whether any warning-severity finding was produced.
    ///
    /// This is the exit-status rule: info findings never fail a run.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Warning)
    }

    /// Number of findings at `severity`.
    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

struct RepoOutcome {
    findings: Vec<Finding>,
    unreachable: bool,
}

/// Run the audit over `refs`, comparing against `canonical`.
///
/// Concurrency is bounded by `cfg.settings.concurrency`; `cancel` flips to
/// `true` when the operator interrupts the run.
pub async fn run_audit(
    cfg: &Config,
    mirror: Arc<dyn RepositoryMirror>,
    canonical: Arc<CanonicalState>,
    refs: Vec<RepositoryRef>,
    mode: CheckMode,
    cancel: watch::Receiver<bool>,
) -> AuditOutcome {
    let semaphore = Arc::new(Semaphore::new(cfg.settings.concurrency.max(1)));
    let attempts = cfg.settings.retry_attempts;
    let total = refs.len();

    let mut join_set = JoinSet::new();
    for repository in refs {
        let mirror = Arc::clone(&mirror);
        let canonical = Arc::clone(&canonical);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            if *cancel.borrow() {
                return None;
            }
            process_repository(repository, mirror.as_ref(), &canonical, mode, attempts, &cancel)
                .await
        });
    }

    let mut findings = Vec::new();
    let mut processed = 0;
    let mut unreachable = 0;
    let mut cancelled = false;

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Some(outcome)) => {
                processed += 1;
                if outcome.unreachable {
                    unreachable += 1;
                }
                findings.extend(outcome.findings);
            },
            Ok(None) => cancelled = true,
            Err(err) => warn!("audit worker task failed: {err}"),
        }
    }

    if cancelled {
        warn!("run interrupted: {processed} of {total} repositories completed");
    }

    comparator::sort_findings(&mut findings);

    AuditOutcome {
        findings,
        processed,
        unreachable,
        cancelled,
    }
}

async fn process_repository(
    repository: RepositoryRef,
    mirror: &dyn RepositoryMirror,
    canonical: &CanonicalState,
    mode: CheckMode,
    attempts: u32,
    cancel: &watch::Receiver<bool>,
) -> Option<RepoOutcome> {
    let snapshot = match with_retries(attempts, RETRY_BASE_DELAY, cancel, || {
        mirror.ensure_present(&repository)
    })
    .await
    {
        Ok(snapshot) => snapshot,
        Err(FetchError::Cancelled) => return None,
        Err(err) => {
            return Some(RepoOutcome {
                findings: vec![Finding::fetch_failure(repository, err.to_string())],
                unreachable: true,
            });
        },
    };

    if *cancel.borrow() {
        return None;
    }

    let bytes = match mirror.read_file(&snapshot, Path::new(paths::PIPELINE_FILE)) {
        Ok(bytes) => bytes,
        Err(FetchError::NotFound(_)) => {
            // Not every repository defines a pipeline; nothing to audit.
            debug!("{repository}: no pipeline definition");
            return Some(RepoOutcome {
                findings: Vec::new(),
                unreachable: false,
            });
        },
        Err(err) => {
            return Some(RepoOutcome {
                findings: vec![Finding::fetch_failure(repository, err.to_string())],
                unreachable: true,
            });
        },
    };

    let findings = match mode {
        CheckMode::Matrix => {
            match extract::extract(&bytes, repository.clone(), paths::PIPELINE_FILE) {
                Ok(observed) => {
                    comparator::compare_matrix(&observed, &canonical.reference_matrix, &repository)
                },
                Err(err) => vec![Finding::extraction_failure(repository, err.reason)],
            }
        },
        CheckMode::Container => match extract::extract_containers(&bytes) {
            Ok(pins) => comparator::compare_containers(&pins, canonical, &repository),
            Err(err) => vec![Finding::extraction_failure(repository, err.reason)],
        },
    };

    Some(RepoOutcome {
        findings,
        unreachable: false,
    })
}

/// Run `op` up to `attempts` times with exponential backoff.
///
/// The cancellation flag is checked before every attempt; a cancelled
/// operation reports [`FetchError::Cancelled`] so callers discard its result
/// instead of recording a failure finding.
pub async fn with_retries<T, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    cancel: &watch::Receiver<bool>,
    op: F,
) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let attempts = attempts.max(1);
    let mut delay = base_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        if *cancel.borrow() {
            return Err(FetchError::Cancelled);
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(err) => {
                if attempt >= attempts {
                    return Err(err);
                }
                warn!("attempt {attempt}/{attempts} failed: {err}; retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                delay *= 2;
            },
        }
    }
}
