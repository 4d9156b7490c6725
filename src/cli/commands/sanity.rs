//! Sanity-test command
//!
//! Runs `ansible-test sanity` in each mirrored default-branch collection
//! checkout. The in-place `ansible_collections/<ns>/<name>` layout makes the
//! checkouts directly usable as the working directory.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::Config;

/// Run sanity tests against every mirrored default-branch collection.
///
/// With `check`, the first failing run aborts and its exit status is
/// propagated; otherwise failures are logged and the sweep continues.
pub async fn sanity(cfg: &Config, check: bool, tests: &[String]) -> anyhow::Result<i32> {
    let pattern = format!(
        "{}/{}/*/*/ansible_collections/*/*",
        cfg.repos_dir.display(),
        cfg.settings.collections_org
    );
    let mut checkouts: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .filter(|p| p.is_dir() && is_default_branch_checkout(p))
        .collect();
    checkouts.sort();

    if checkouts.is_empty() {
        info!("no default-branch collection checkouts mirrored");
        return Ok(0);
    }

    let mut args: Vec<String> =
        vec!["sanity".to_string(), "--docker".to_string(), "-v".to_string()];
    for test in tests {
        args.push("--test".to_string());
        args.push(test.clone());
    }

    for path in checkouts {
        println!("---[ {} ]---", path.display());
        let status = tokio::process::Command::new("ansible-test")
            .args(&args)
            .current_dir(&path)
            .status()
            .await?;
        if !status.success() {
            warn!("sanity run failed for {}", path.display());
            if check {
                return Ok(status.code().unwrap_or(1));
            }
        }
        println!("---[ {} ]---", path.display());
    }

    Ok(0)
}

/// Whether a collection checkout belongs to a default branch.
///
/// Checkout layout is `.../<branch>/ansible_collections/<ns>/<name>`, so the
/// branch is the fourth component from the end.
fn is_default_branch_checkout(path: &Path) -> bool {
    path.components()
        .rev()
        .nth(3)
        .map(|c| c.as_os_str().to_string_lossy())
        .is_some_and(|branch| branch == "main" || branch == "master")
}
