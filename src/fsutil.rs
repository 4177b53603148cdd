// src/fsutil.rs

//! Small filesystem helpers shared by the inspectors

use std::path::{Path, PathBuf};

/// True when the path's extension equals `ext` (no leading dot).
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().map(|e| e == ext).unwrap_or(false)
}

/// Directory entries sorted by file name.
///
/// Directory read order is platform-arbitrary; sorting keeps repeated
/// resolutions of the same item deterministic. Unreadable directories list
/// as empty.
pub(crate) fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    };
    entries.sort();
    entries
}
