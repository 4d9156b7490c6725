//! Services - comparison logic and run orchestration
//!
//! - [`comparator`] - pure drift comparison, no IO
//! - [`resolver`] - canonical-state computation
//! - [`audit`] - the bounded-concurrency audit runner

pub mod audit;
pub mod comparator;
pub mod resolver;

pub use audit::{AuditOutcome, CheckMode, run_audit};
