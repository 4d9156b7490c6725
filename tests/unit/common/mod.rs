//! Shared test utilities

pub mod fixtures;
pub mod mocks;

use std::path::PathBuf;

use azp_audit::config::{Config, Settings};

/// A config suitable for tests: no credentials, fast retries.
pub fn test_config(repos_dir: PathBuf) -> Config {
    let settings = Settings {
        retry_attempts: 1,
        concurrency: 4,
        ..Settings::default()
    };
    Config::from_parts(settings, repos_dir, None, None)
}
