//! Command implementations
//!
//! - [`sync`] - repository discovery and mirror updates
//! - [`check`] - the drift audit itself
//! - [`sanity`] - remote sanity-test runs against default branches
//! - [`list_files`] - pipeline definition path listing

mod check;
mod list_files;
mod sanity;
mod sync;

pub use check::check;
pub use list_files::list_pipeline_files;
pub use sanity::sanity;
pub use sync::sync;
