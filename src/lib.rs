//! azp-audit - audit Azure Pipelines configurations across Ansible collection
//! repositories
//!
//! This library provides the drift-detection engine: mirroring repositories,
//! extracting test matrices from pipeline definitions, resolving the canonical
//! matrix and container tag from the `ansible-core` devel branch, and comparing
//! observed state against that baseline.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod extract;
pub mod output;
pub mod paths;
