use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SKILLTREE_DIR: &str = ".skilltree";
pub const CONFIG_FILE: &str = ".skilltree/config.yaml";
pub const DB_FILE: &str = ".skilltree/skills.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn skilltree_dir(root: &Path) -> PathBuf {
    root.join(SKILLTREE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
