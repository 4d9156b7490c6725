//! Canonical baseline shared by every comparison in a run

use super::matrix::TestMatrix;

/// The single consistent baseline for one audit run.
///
/// Computed once before the parallel phase, then shared read-only; no
/// comparison may observe a different reference than another.
#[derive(Debug, Clone)]
pub struct CanonicalState {
    /// Union of combinations actually tested on the reference devel branch
    pub reference_matrix: TestMatrix,
    /// Latest published numeric tag of the shared test container.
    ///
    /// `None` for matrix-mode runs, which never consult the registry.
    pub reference_container_tag: Option<String>,
}
