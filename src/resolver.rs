// src/resolver.rs

//! Top-level metadata synthesis
//!
//! [`Resolver`] combines the locator, the inspectors, the installer-info
//! collaborator, and the version heuristics into one canonical
//! [`PackageMetadata`] per installer item. There are a lot of valid package
//! formats and this code may not deal with them all equally well; standard
//! bundle packages are the best understood, so those resolve most reliably.
//!
//! The version reconciliation order in [`Resolver::package_metadata`] is
//! deliberately heuristic; downstream catalog consumers depend on its exact
//! behavior, so it must not be "improved".

use crate::fsutil::has_extension;
use crate::installed::{self, RECEIPTS_DIR};
use crate::locate::find_installer_item;
use crate::naming::name_and_version;
use crate::packages::bundle::{bundle_package_info, extended_version};
use crate::packages::flat::flat_package_info;
use crate::packages::{PackageMetadata, Receipt};
use crate::tools::{
    ArchiveExtractor, InstallerInfo, InstallerTool, PackageRegistry, PkgUtil, XarExtractor,
};
use crate::version::{compare_versions, ZERO_VERSION};
use crate::Result;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Resolution session owning the collaborator handles and the scratch space.
///
/// All state is read-only or confined to uniquely-named per-call scratch
/// subdirectories, so methods take `&self` and calls may run concurrently.
/// The scratch root is removed when the resolver is dropped.
pub struct Resolver {
    extractor: Box<dyn ArchiveExtractor>,
    installer: Box<dyn InstallerInfo>,
    registry: Box<dyn PackageRegistry>,
    receipts_dir: PathBuf,
    scratch: TempDir,
}

impl Resolver {
    /// Resolver backed by the system tools (`xar`, `installer`, `pkgutil`).
    pub fn new() -> Result<Self> {
        Self::with_tools(
            Box::new(XarExtractor),
            Box::new(InstallerTool),
            Box::new(PkgUtil),
        )
    }

    /// Resolver with caller-supplied collaborators.
    pub fn with_tools(
        extractor: Box<dyn ArchiveExtractor>,
        installer: Box<dyn InstallerInfo>,
        registry: Box<dyn PackageRegistry>,
    ) -> Result<Self> {
        Ok(Self {
            extractor,
            installer,
            registry,
            receipts_dir: PathBuf::from(RECEIPTS_DIR),
            scratch: tempfile::tempdir()?,
        })
    }

    /// Override the legacy receipts directory.
    pub fn with_receipts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.receipts_dir = dir.into();
        self
    }

    /// Sub-package receipts for one installer item, chosen by item shape.
    ///
    /// Flat inspection for regular `.pkg`/`.mpkg` files, bundle inspection
    /// for directories, direct descriptor parsing for bare `.dist` files.
    pub fn receipt_info(&self, path: &Path) -> Vec<Receipt> {
        if has_extension(path, "pkg") || has_extension(path, "mpkg") {
            debug!("examining {}", path.display());
            if path.is_file() {
                return flat_package_info(self.extractor.as_ref(), self.scratch.path(), path);
            }
            if path.is_dir() {
                return bundle_package_info(path);
            }
            return Vec::new();
        }

        if has_extension(path, "dist") {
            return crate::descriptor::parse_pkg_refs(path);
        }

        Vec::new()
    }

    /// Resolve one installer item into its canonical identity.
    ///
    /// Never fatal: an unresolvable item path yields the default (empty)
    /// metadata, and every other missing input degrades to an absent field.
    /// Resolving the same unchanged item twice yields identical metadata.
    pub fn package_metadata(&self, item: &Path) -> PackageMetadata {
        // a bare descriptor is already the installable description; only
        // everything else goes through the locator
        let located = if has_extension(item, "dist") {
            Some(item.to_path_buf())
        } else {
            find_installer_item(item)
        };
        let Some(item) = located else {
            return PackageMetadata::default();
        };

        let installer_info = self.installer.pkg_info(&item);
        let receipts = self.receipt_info(&item);

        let stem = item
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut metaversion = extended_version(&item);
        if metaversion == ZERO_VERSION {
            metaversion = name_and_version(&stem).1;
        }

        let mut highest = String::from("0.0");
        let mut receipts_size_kb: u64 = 0;
        for receipt in &receipts {
            if compare_versions(&receipt.version, &highest) == Ordering::Greater {
                highest = receipt.version.clone();
                if let Some(kb) = receipt.installed_size_kb {
                    receipts_size_kb += kb;
                }
            }
        }

        if metaversion == ZERO_VERSION {
            metaversion = highest.clone();
        } else if receipts.len() == 1 {
            // there is only one package in this item
            metaversion = highest.clone();
        } else if highest.starts_with(&metaversion) {
            // e.g. highest is 2.0.3124.0 and the filename carries 2.0
            metaversion = highest.clone();
        }

        let installed_size_kb = match installer_info.installed_size_kb {
            Some(kb) if kb > 0 => Some(kb),
            _ => (receipts_size_kb > 0).then_some(receipts_size_kb),
        };

        PackageMetadata {
            name: name_and_version(&stem).0,
            version: metaversion,
            display_name: installer_info.display_name,
            description: installer_info.description,
            restart_action: installer_info.restart_action,
            installed_size_kb,
            receipts,
        }
    }

    /// Version of the installed package with this id, `""` when absent.
    pub fn installed_version(&self, package_id: &str) -> String {
        installed::installed_version(self.registry.as_ref(), &self.receipts_dir, package_id)
    }
}
