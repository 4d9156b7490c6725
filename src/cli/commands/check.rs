//! Drift check command

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::watch;

use crate::adapters::{GitMirror, RegistryClient};
use crate::config::Config;
use crate::core::ports::RepositoryMirror;
use crate::core::services::{CheckMode, resolver, run_audit};
use crate::output::{OutputMode, Report};

/// Run the audit in `mode` over every mirrored repository.
///
/// The canonical state is resolved first; failure there is fatal since every
/// comparison depends on it. Per-repository failures are recorded as findings
/// and never abort the batch.
pub async fn check(cfg: &Config, mode: CheckMode, output: OutputMode) -> anyhow::Result<i32> {
    let mirror: Arc<dyn RepositoryMirror> = Arc::new(GitMirror::new(cfg));
    let registry = RegistryClient::new(cfg)?;

    let canonical = resolver::resolve_canonical(cfg, mirror.as_ref(), &registry, mode).await?;

    let refs = mirror.list_known_refs()?;
    if refs.is_empty() {
        anyhow::bail!("no repositories mirrored; run `azp-audit sync --discover --update` first");
    }
    info!("auditing {} repositories in {mode} mode", refs.len());

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; discarding unfinished repositories");
            let _ = cancel_tx.send(true);
        }
    });

    let outcome = run_audit(
        cfg,
        Arc::clone(&mirror),
        Arc::new(canonical),
        refs.clone(),
        mode,
        cancel_rx,
    )
    .await;

    let report = Report::build(mode, &refs, outcome);
    report.render(output)?;
    Ok(report.exit_code())
}
