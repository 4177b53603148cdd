// src/packages/bundle.rs

//! Legacy bundle-style package inspection
//!
//! Bundle packages are directories with a `Contents/Info.plist`. Multi-package
//! bundles (`.mpkg`) nest sub-packages in several historical layouts; this
//! walker tries them in fixed order: `file:` references inside `.dist`
//! descriptors, then an enumerated list of component directories, then the
//! `.dist` descriptor itself as a last resort.

use crate::descriptor::{parse_pkg_refs, pkg_ref_texts};
use crate::fsutil::{has_extension, sorted_entries};
use crate::packages::Receipt;
use crate::version::{pad_version, VERSION_COMPONENTS, ZERO_VERSION};
use std::path::Path;
use tracing::{debug, warn};

/// Real package trees are shallow; anything deeper is a cycle or garbage.
const MAX_DEPTH: usize = 8;

/// Layouts used by bundles that do not declare a component directory.
const LAYOUT_CANDIDATES: [&str; 5] = [
    "Contents",
    "Contents/Installers",
    "Contents/Packages",
    "Contents/Resources",
    "Contents/Resources/Packages",
];

/// Collect sub-package receipts from a bundle-style package directory.
pub fn bundle_package_info(pkg_path: &Path) -> Vec<Receipt> {
    bundle_package_info_at(pkg_path, 0)
}

fn bundle_package_info_at(pkg_path: &Path, depth: usize) -> Vec<Receipt> {
    let mut receipts = Vec::new();

    if depth > MAX_DEPTH {
        warn!(
            "giving up on bundle recursion below {} (depth {})",
            pkg_path.display(),
            depth
        );
        return receipts;
    }

    // a .pkg directory is a single package; fall through to the
    // multi-package walk only when it has no readable Contents/Info.plist
    if has_extension(pkg_path, "pkg") {
        if let Some(receipt) = one_package_info(pkg_path) {
            receipts.push(receipt);
            return receipts;
        }
    }

    let contents = pkg_path.join("Contents");
    if !contents.exists() {
        return receipts;
    }

    // try to find sub-packages from file: references in .dist descriptors;
    // the first descriptor that resolves anything wins
    for dist in sorted_entries(&contents)
        .iter()
        .filter(|p| has_extension(p, "dist"))
    {
        for text in pkg_ref_texts(dist) {
            if let Some(fragment) = text.strip_prefix("file:") {
                let relative = urlencoding::decode(fragment)
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| fragment.to_string());
                let sub_pkg = pkg_path.join(relative);
                if sub_pkg.exists() {
                    receipts.extend(bundle_package_info_at(&sub_pkg, depth + 1));
                }
            }
        }
        if !receipts.is_empty() {
            return receipts;
        }
    }

    // no .dist reference resolved, search the layout candidates
    let mut dirs_to_search: Vec<String> = Vec::new();
    if let Some(component_dir) = declared_component_directory(pkg_path) {
        dirs_to_search.push(component_dir);
    }
    if dirs_to_search.is_empty() {
        dirs_to_search = LAYOUT_CANDIDATES.iter().map(|s| s.to_string()).collect();
    }

    for subdir in &dirs_to_search {
        let search_dir = pkg_path.join(subdir);
        if !search_dir.exists() {
            continue;
        }
        for item in sorted_entries(&search_dir) {
            if !item.is_dir() {
                continue;
            }
            if has_extension(&item, "pkg") {
                if let Some(receipt) = one_package_info(&item) {
                    receipts.push(receipt);
                }
            } else if has_extension(&item, "mpkg") {
                receipts.extend(bundle_package_info_at(&item, depth + 1));
            }
        }
    }

    if !receipts.is_empty() {
        return receipts;
    }

    // couldn't find any sub-packages, fall back to the .dist descriptor itself
    for dist in sorted_entries(&contents)
        .iter()
        .filter(|p| has_extension(p, "dist"))
    {
        receipts.extend(parse_pkg_refs(dist));
    }

    receipts
}

/// Component directory declared by the bundle's own Info.plist, if any.
fn declared_component_directory(pkg_path: &Path) -> Option<String> {
    let plist_path = pkg_path.join("Contents").join("Info.plist");
    if !plist_path.exists() {
        return None;
    }
    let value = plist::Value::from_file(&plist_path).ok()?;
    value
        .as_dictionary()?
        .get("IFPkgFlagComponentDirectory")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

/// Receipt for a single legacy bundle package.
///
/// Identity comes from `CFBundleIdentifier`, falling back to the
/// `Bundle identifier` key written by JAMF Composer, then to the filename.
/// An unreadable plist yields a sentinel identity instead of an error so the
/// surrounding walk keeps going. A missing plist yields no record at all.
pub fn one_package_info(pkg_path: &Path) -> Option<Receipt> {
    let plist_path = pkg_path.join("Contents").join("Info.plist");
    if !plist_path.exists() {
        return None;
    }

    let filename = pkg_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let dict = match plist::Value::from_file(&plist_path) {
        Ok(value) => value.into_dictionary(),
        Err(e) => {
            debug!("unreadable plist {}: {}", plist_path.display(), e);
            None
        }
    };

    let Some(dict) = dict else {
        return Some(Receipt {
            package_id: format!("BAD PLIST in {}", filename),
            version: ZERO_VERSION.to_string(),
            installed_size_kb: None,
        });
    };

    let package_id = dict
        .get("CFBundleIdentifier")
        .and_then(|v| v.as_string())
        // special case for JAMF Composer generated packages
        .or_else(|| dict.get("Bundle identifier").and_then(|v| v.as_string()))
        .map(|s| s.to_string())
        .unwrap_or(filename);

    let installed_size_kb = dict
        .get("IFPkgFlagInstalledSize")
        .and_then(|v| v.as_unsigned_integer());

    Some(Receipt {
        package_id,
        version: extended_version(pkg_path),
        installed_size_kb,
    })
}

/// Five-part version number like Apple uses in distribution and flat packages.
///
/// Looks up `CFBundleShortVersionString`, then `CFBundleVersion`, then the
/// `Bundle versions string, short` key written by JAMF Composer; the first
/// whitespace-separated token is padded to five components. No version found
/// means the all-zero placeholder.
pub fn extended_version(bundle_path: &Path) -> String {
    let info_plist = bundle_path.join("Contents").join("Info.plist");
    if info_plist.exists() {
        if let Ok(value) = plist::Value::from_file(&info_plist) {
            if let Some(dict) = value.as_dictionary() {
                for key in [
                    "CFBundleShortVersionString",
                    "CFBundleVersion",
                    "Bundle versions string, short",
                ] {
                    if let Some(raw) = dict.get(key).and_then(|v| v.as_string()) {
                        let first = raw.split_whitespace().next().unwrap_or("0");
                        return pad_version(Some(first), VERSION_COMPONENTS);
                    }
                }
            }
        }
    }
    ZERO_VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_info_plist(bundle: &Path, entries: &[(&str, &str)]) {
        let contents = bundle.join("Contents");
        fs::create_dir_all(&contents).unwrap();
        let mut body = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plist version=\"1.0\">\n<dict>\n",
        );
        for (key, value) in entries {
            body.push_str(&format!(
                "    <key>{}</key>\n    <string>{}</string>\n",
                key, value
            ));
        }
        body.push_str("</dict>\n</plist>\n");
        fs::write(contents.join("Info.plist"), body).unwrap();
    }

    fn make_pkg(dir: &Path, name: &str, id: &str, version: &str) -> PathBuf {
        let pkg = dir.join(name);
        write_info_plist(
            &pkg,
            &[
                ("CFBundleIdentifier", id),
                ("CFBundleShortVersionString", version),
            ],
        );
        pkg
    }

    #[test]
    fn test_extended_version_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("App.pkg");

        write_info_plist(&bundle, &[("CFBundleVersion", "2.1")]);
        assert_eq!(extended_version(&bundle), "2.1.0.0.0");

        write_info_plist(
            &bundle,
            &[
                ("CFBundleVersion", "2.1"),
                ("CFBundleShortVersionString", "3.0"),
            ],
        );
        assert_eq!(extended_version(&bundle), "3.0.0.0.0");

        // JAMF Composer key as final fallback
        write_info_plist(&bundle, &[("Bundle versions string, short", "4.5")]);
        assert_eq!(extended_version(&bundle), "4.5.0.0.0");
    }

    #[test]
    fn test_extended_version_takes_first_token() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("App.pkg");
        write_info_plist(&bundle, &[("CFBundleShortVersionString", "1.5 beta")]);
        assert_eq!(extended_version(&bundle), "1.5.0.0.0");
    }

    #[test]
    fn test_extended_version_missing_plist() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(extended_version(&dir.path().join("App.pkg")), ZERO_VERSION);
    }

    #[test]
    fn test_one_package_info_basic() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = make_pkg(dir.path(), "Thing.pkg", "com.example.thing", "1.2.3");

        let receipt = one_package_info(&pkg).unwrap();
        assert_eq!(receipt.package_id, "com.example.thing");
        assert_eq!(receipt.version, "1.2.3.0.0");
        assert_eq!(receipt.installed_size_kb, None);
    }

    #[test]
    fn test_one_package_info_jamf_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("Composed.pkg");
        write_info_plist(
            &pkg,
            &[
                ("Bundle identifier", "com.jamf.composed"),
                ("CFBundleShortVersionString", "1.0"),
            ],
        );

        let receipt = one_package_info(&pkg).unwrap();
        assert_eq!(receipt.package_id, "com.jamf.composed");
    }

    #[test]
    fn test_one_package_info_filename_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("NoIdent.pkg");
        write_info_plist(&pkg, &[("CFBundleShortVersionString", "2.0")]);

        let receipt = one_package_info(&pkg).unwrap();
        assert_eq!(receipt.package_id, "NoIdent.pkg");
    }

    #[test]
    fn test_one_package_info_bad_plist_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("Broken.pkg");
        let contents = pkg.join("Contents");
        fs::create_dir_all(&contents).unwrap();
        fs::write(contents.join("Info.plist"), "not a plist at all").unwrap();

        let receipt = one_package_info(&pkg).unwrap();
        assert_eq!(receipt.package_id, "BAD PLIST in Broken.pkg");
        assert_eq!(receipt.version, ZERO_VERSION);
    }

    #[test]
    fn test_one_package_info_missing_plist() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("Empty.pkg");
        fs::create_dir_all(&pkg).unwrap();
        assert!(one_package_info(&pkg).is_none());
    }

    #[test]
    fn test_bundle_single_pkg() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = make_pkg(dir.path(), "Single.pkg", "com.example.single", "1.0");

        let receipts = bundle_package_info(&pkg);
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].package_id, "com.example.single");
    }

    #[test]
    fn test_mpkg_layout_scan() {
        let dir = tempfile::tempdir().unwrap();
        let mpkg = dir.path().join("Suite.mpkg");
        write_info_plist(&mpkg, &[("CFBundleIdentifier", "com.example.suite")]);

        let packages = mpkg.join("Contents").join("Packages");
        fs::create_dir_all(&packages).unwrap();
        make_pkg(&packages, "A.pkg", "com.example.a", "1.0");
        make_pkg(&packages, "B.pkg", "com.example.b", "2.0");

        let receipts = bundle_package_info(&mpkg);
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].package_id, "com.example.a");
        assert_eq!(receipts[1].package_id, "com.example.b");
    }

    #[test]
    fn test_mpkg_declared_component_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mpkg = dir.path().join("Suite.mpkg");
        write_info_plist(
            &mpkg,
            &[
                ("CFBundleIdentifier", "com.example.suite"),
                ("IFPkgFlagComponentDirectory", "Contents/Custom"),
            ],
        );

        let custom = mpkg.join("Contents").join("Custom");
        fs::create_dir_all(&custom).unwrap();
        make_pkg(&custom, "Inner.pkg", "com.example.inner", "3.0");

        // a package in a non-declared layout dir must be ignored
        let packages = mpkg.join("Contents").join("Packages");
        fs::create_dir_all(&packages).unwrap();
        make_pkg(&packages, "Stray.pkg", "com.example.stray", "9.9");

        let receipts = bundle_package_info(&mpkg);
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].package_id, "com.example.inner");
    }

    #[test]
    fn test_mpkg_dist_file_references() {
        let dir = tempfile::tempdir().unwrap();
        let mpkg = dir.path().join("Suite.mpkg");
        let contents = mpkg.join("Contents");
        fs::create_dir_all(&contents).unwrap();

        let nested = mpkg.join("Sub Dir");
        fs::create_dir_all(&nested).unwrap();
        make_pkg(&nested, "Ref.pkg", "com.example.ref", "5.0");

        fs::write(
            contents.join("Install.dist"),
            r#"<installer-gui-script>
    <pkg-ref id="com.example.ref">file:Sub%20Dir/Ref.pkg</pkg-ref>
</installer-gui-script>"#,
        )
        .unwrap();

        // layout-scan bait that must not be reached once the .dist resolves
        let packages = contents.join("Packages");
        fs::create_dir_all(&packages).unwrap();
        make_pkg(&packages, "Bait.pkg", "com.example.bait", "1.0");

        let receipts = bundle_package_info(&mpkg);
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].package_id, "com.example.ref");
        assert_eq!(receipts[0].version, "5.0.0.0.0");
    }

    #[test]
    fn test_mpkg_dist_parse_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        let mpkg = dir.path().join("Suite.mpkg");
        let contents = mpkg.join("Contents");
        fs::create_dir_all(&contents).unwrap();

        // no file: references resolve and no layout dir holds packages,
        // so the descriptor records themselves are the answer
        fs::write(
            contents.join("Install.dist"),
            r#"<installer-gui-script>
    <pkg-ref id="com.example.a" version="1.0"/>
    <pkg-ref id="com.example.b" version="2.0"/>
</installer-gui-script>"#,
        )
        .unwrap();

        let receipts = bundle_package_info(&mpkg);
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].version, "1.0.0.0.0");
        assert_eq!(receipts[1].version, "2.0.0.0.0");
    }

    #[test]
    fn test_nested_mpkg_recursion() {
        let dir = tempfile::tempdir().unwrap();
        let outer = dir.path().join("Outer.mpkg");
        fs::create_dir_all(outer.join("Contents")).unwrap();

        let inner = outer.join("Contents").join("Inner.mpkg");
        let inner_packages = inner.join("Contents").join("Packages");
        fs::create_dir_all(&inner_packages).unwrap();
        make_pkg(&inner_packages, "Leaf.pkg", "com.example.leaf", "1.0");

        let receipts = bundle_package_info(&outer);
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].package_id, "com.example.leaf");
    }
}
