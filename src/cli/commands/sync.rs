//! Repository discovery and mirror update command

use std::collections::BTreeMap;

use log::{info, warn};

use crate::adapters::{ApiDiscovery, GitMirror};
use crate::config::Config;
use crate::core::models::RepositoryRef;
use crate::core::ports::{RepositoryDiscovery, RepositoryMirror};
use crate::output::OutputMode;

/// Discover the repository set and/or update the local mirror.
///
/// Without `--discover` the locally known refs are re-used, so `sync --update`
/// refreshes an existing mirror without touching the inventory APIs (and
/// without needing their tokens).
pub async fn sync(
    cfg: &Config,
    discover: bool,
    update: bool,
    output: OutputMode,
) -> anyhow::Result<i32> {
    let mirror = GitMirror::new(cfg);

    let repos: BTreeMap<String, Vec<String>> = if discover {
        let discovery = ApiDiscovery::new(cfg)?;
        discovery.discover().await?
    } else {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for r in mirror.list_known_refs()? {
            map.entry(r.name).or_default().push(r.branch);
        }
        map
    };

    match output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&repos)?),
        OutputMode::Human => {
            for (name, branches) in &repos {
                println!("{name}:");
                for branch in branches {
                    println!("  {branch}");
                }
            }
        },
    }

    if update {
        for (name, branches) in &repos {
            for branch in branches {
                let repository = RepositoryRef::new(name.clone(), branch.clone());
                match mirror.ensure_present(&repository).await {
                    Ok(snapshot) => info!(
                        "{repository} at {}",
                        snapshot.head.as_deref().unwrap_or("unknown")
                    ),
                    // One unreachable remote must not stop the sync.
                    Err(err) => warn!("{repository}: {err}"),
                }
            }
            for purged in mirror.purge_stale_branches(name, branches)? {
                info!("{name}: purged stale branch {purged}");
            }
        }
    }

    Ok(0)
}
