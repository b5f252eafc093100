use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DIALECTIC_DIR: &str = ".dialectic";
pub const CONFIG_FILE: &str = ".dialectic/config.yaml";

pub const DEFAULT_DOCS_DIR: &str = ".cursor";
pub const DEFAULT_COUNTERS_FILE: &str = ".dialectic/counters.json";
pub const DEFAULT_HISTORY_FILE: &str = ".dialectic/history.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn dialectic_dir(root: &Path) -> PathBuf {
    root.join(DIALECTIC_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root. Absolute paths are
/// returned unchanged.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}
