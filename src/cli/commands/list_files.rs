//! Pipeline definition listing command

use crate::config::Config;
use crate::output::OutputMode;
use crate::paths;

/// Print mirrored pipeline definition paths, or the glob patterns themselves.
pub fn list_pipeline_files(
    cfg: &Config,
    globs_only: bool,
    output: OutputMode,
) -> anyhow::Result<i32> {
    let patterns = paths::pipeline_globs(
        &cfg.repos_dir,
        &cfg.settings.collections_org,
        &cfg.settings.core_repository,
    );

    let results = if globs_only {
        patterns
    } else {
        let mut files = Vec::new();
        for pattern in &patterns {
            for entry in glob::glob(pattern)? {
                files.push(entry?.display().to_string());
            }
        }
        files.sort();
        files
    };

    match output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputMode::Human => println!("{}", results.join(" ")),
    }

    Ok(0)
}
