// src/packages/flat.rs

//! Flat (xar archive) package inspection
//!
//! Flat packages keep their XML metadata and their payload in one archive.
//! Inspection extracts the metadata members into a private scratch directory
//! and then hunts for descriptors with a three-tier fallback: the top-level
//! `PackageInfo`, then `PackageInfo` files inside nested `.pkg` directories,
//! then the top-level `Distribution`.

use crate::descriptor::parse_pkg_refs;
use crate::fsutil::{has_extension, sorted_entries};
use crate::packages::Receipt;
use crate::tools::ArchiveExtractor;
use std::path::Path;
use tracing::warn;

/// Collect sub-package receipts from a flat package file.
///
/// A fresh uniquely-named scratch subdirectory is created under
/// `scratch_root` and removed on every exit path, extraction failure
/// included. Extraction failure yields an empty result, not an error.
pub fn flat_package_info(
    extractor: &dyn ArchiveExtractor,
    scratch_root: &Path,
    pkg_path: &Path,
) -> Vec<Receipt> {
    let mut receipts = Vec::new();

    let scratch = match tempfile::Builder::new().prefix("flat").tempdir_in(scratch_root) {
        Ok(scratch) => scratch,
        Err(e) => {
            warn!("could not create scratch directory: {}", e);
            return receipts;
        }
    };

    // the extractor runs with the scratch dir as its working directory, so
    // the archive path must survive the cwd change
    let archive = std::fs::canonicalize(pkg_path).unwrap_or_else(|_| pkg_path.to_path_buf());

    if let Err(e) = extractor.extract(&archive, "Payload", scratch.path()) {
        warn!("extraction of {} failed: {}", pkg_path.display(), e);
        return receipts;
    }

    let package_info = scratch.path().join("PackageInfo");
    if package_info.exists() {
        receipts = parse_pkg_refs(&package_info);
    }

    if receipts.is_empty() {
        // no package id info or no PackageInfo file, look for
        // sub-packages at the top level
        for item in sorted_entries(scratch.path()) {
            if has_extension(&item, "pkg") && item.is_dir() {
                let nested = item.join("PackageInfo");
                if nested.exists() {
                    receipts.extend(parse_pkg_refs(&nested));
                }
            }
        }
    }

    if receipts.is_empty() {
        // no PackageInfo files and no sub-packages, look at Distribution
        let distribution = scratch.path().join("Distribution");
        if distribution.exists() {
            receipts = parse_pkg_refs(&distribution);
        }
    }

    receipts
}
