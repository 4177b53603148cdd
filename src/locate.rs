// src/locate.rs

//! Installer-item location
//!
//! Downloads do not always point straight at the installable unit: software
//! updates arrive as directories holding `.dist` files and `.pkg` payloads,
//! sometimes one level down in a `Packages` directory.

use crate::fsutil::{has_extension, sorted_entries};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decide which sub-path of `path` is the actual installable unit.
///
/// `.pkg`, `.mpkg`, and `.dmg` paths are trusted as-is. A directory directly
/// containing a `.pkg` entry is itself the unit; failing that, a `Packages`
/// subdirectory containing a `.pkg` entry is. `None` means "no metadata
/// obtainable", a normal outcome callers must tolerate.
pub fn find_installer_item(path: &Path) -> Option<PathBuf> {
    if has_extension(path, "pkg") || has_extension(path, "mpkg") || has_extension(path, "dmg") {
        return Some(path.to_path_buf());
    }

    if path.is_dir() {
        if contains_pkg(path) {
            return Some(path.to_path_buf());
        }

        // no pkg at this level, look for a Packages dir
        let packages = path.join("Packages");
        if packages.is_dir() && contains_pkg(&packages) {
            return Some(packages);
        }
    }

    debug!("no installer item found at {}", path.display());
    None
}

fn contains_pkg(dir: &Path) -> bool {
    sorted_entries(dir)
        .iter()
        .any(|entry| has_extension(entry, "pkg"))
}
