//! Core domain layer
//!
//! - [`models`] - domain types (refs, matrices, findings, canonical state)
//! - [`ports`] - traits at the IO seams (mirror, discovery, registry)
//! - [`services`] - pure comparison logic and the audit orchestration

pub mod models;
pub mod ports;
pub mod services;
