//! Workspace directory resolution.

use std::path::PathBuf;

/// Environment variable for overriding the deliverable workspace directory.
pub const WORKSPACE_ENV_VAR: &str = "QNR_WORKSPACE_DIR";

/// Get the deliverable workspace root.
///
/// Resolution order:
/// 1. `QNR_WORKSPACE_DIR` environment variable
/// 2. `fixtures/workspace/` relative to the repository root
pub fn workspace_root() -> PathBuf {
    if let Ok(root) = std::env::var(WORKSPACE_ENV_VAR) {
        return PathBuf::from(root);
    }
    fixtures_workspace()
}

/// The fixture deliverable shipped with the repository.
pub fn fixtures_workspace() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/workspace")
}
