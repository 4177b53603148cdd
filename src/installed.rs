// src/installed.rs

//! Installed-version lookup
//!
//! Answers "is this package id already on the machine, and at what version?"
//! The live package database always wins; machines upgraded from older OS
//! releases may only have a receipt bundle under `/Library/Receipts`, so a
//! legacy scan backs it up.

use crate::fsutil::{has_extension, sorted_entries};
use crate::packages::bundle::bundle_package_info;
use crate::tools::PackageRegistry;
use crate::version::{compare_versions, pad_version, VERSION_COMPONENTS};
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

/// Legacy receipts directory scanned when the registry has no answer.
pub const RECEIPTS_DIR: &str = "/Library/Receipts";

/// Version of the installed package with this id, or `""` when not installed.
///
/// Both probes are read-only; "not installed" is a normal outcome, never an
/// error.
pub fn installed_version(
    registry: &dyn PackageRegistry,
    receipts_dir: &Path,
    package_id: &str,
) -> String {
    // the live package database wins whenever it has an answer
    if let Some(entry) = registry.pkg_info(package_id) {
        debug!(
            "this machine has {}, version {}",
            entry.package_id, entry.version
        );
        return pad_version(Some(&entry.version), VERSION_COMPONENTS);
    }

    // check the legacy receipts directory
    if receipts_dir.exists() {
        let mut highest = String::from("0");
        for item in sorted_entries(receipts_dir) {
            if !has_extension(&item, "pkg") {
                continue;
            }
            let info = bundle_package_info(&item);
            if let Some(receipt) = info.first() {
                if receipt.package_id == package_id
                    && compare_versions(&receipt.version, &highest) == Ordering::Greater
                {
                    highest = receipt.version.clone();
                }
            }
        }
        if highest != "0" {
            debug!("this machine has {}, version {}", package_id, highest);
            return highest;
        }
    }

    debug!("this machine does not have {}", package_id);
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::RegistryEntry;
    use std::fs;

    struct FakeRegistry {
        entry: Option<RegistryEntry>,
    }

    impl PackageRegistry for FakeRegistry {
        fn pkg_info(&self, _package_id: &str) -> Option<RegistryEntry> {
            self.entry.clone()
        }
    }

    fn write_receipt(receipts_dir: &Path, name: &str, id: &str, version: &str) {
        let contents = receipts_dir.join(name).join("Contents");
        fs::create_dir_all(&contents).unwrap();
        fs::write(
            contents.join("Info.plist"),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plist version=\"1.0\">\n<dict>\n\
                 <key>CFBundleIdentifier</key><string>{}</string>\n\
                 <key>CFBundleShortVersionString</key><string>{}</string>\n\
                 </dict>\n</plist>\n",
                id, version
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_registry_answer_wins() {
        let dir = tempfile::tempdir().unwrap();
        // a receipt for the same id at a higher version must be ignored
        write_receipt(dir.path(), "App.pkg", "com.example.app", "9.0");

        let registry = FakeRegistry {
            entry: Some(RegistryEntry {
                package_id: "com.example.app".to_string(),
                version: "2.1".to_string(),
            }),
        };

        let version = installed_version(&registry, dir.path(), "com.example.app");
        assert_eq!(version, "2.1.0.0.0");
    }

    #[test]
    fn test_receipts_fallback_picks_maximum() {
        let dir = tempfile::tempdir().unwrap();
        write_receipt(dir.path(), "App-1.pkg", "com.example.app", "1.0");
        write_receipt(dir.path(), "App-2.pkg", "com.example.app", "2.0.3124.0");
        write_receipt(dir.path(), "Other.pkg", "com.example.other", "8.0");

        let registry = FakeRegistry { entry: None };
        let version = installed_version(&registry, dir.path(), "com.example.app");
        assert_eq!(version, "2.0.3124.0.0");
    }

    #[test]
    fn test_not_installed_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        write_receipt(dir.path(), "Other.pkg", "com.example.other", "1.0");

        let registry = FakeRegistry { entry: None };
        let version = installed_version(&registry, dir.path(), "com.example.missing");
        assert_eq!(version, "");
    }

    #[test]
    fn test_missing_receipts_dir() {
        let registry = FakeRegistry { entry: None };
        let version = installed_version(
            &registry,
            Path::new("/nonexistent/receipts"),
            "com.example.app",
        );
        assert_eq!(version, "");
    }
}
