// src/tools.rs

//! External tool collaborators
//!
//! The resolver core never shells out directly; it talks to three seams, each
//! with a default implementation wrapping the system tool: `xar` for flat
//! package extraction, `installer` for item info, and `pkgutil` for the live
//! package database. All calls block until the tool exits. Failures degrade
//! to empty answers at the call sites, never to aborted resolutions.

use crate::packages::RestartAction;
use crate::{Error, Result};
use std::io::Cursor;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

const XAR: &str = "/usr/bin/xar";
const INSTALLER: &str = "/usr/sbin/installer";
const PKGUTIL: &str = "/usr/sbin/pkgutil";

/// Extracts flat-package archive members into a target directory.
pub trait ArchiveExtractor {
    /// Extract `archive` into `dest`, skipping members matching `exclude`.
    fn extract(&self, archive: &Path, exclude: &str, dest: &Path) -> Result<()>;
}

/// Best-effort item info reported by the system installer.
#[derive(Debug, Clone, Default)]
pub struct InstallerReport {
    /// Installed footprint in kilobytes
    pub installed_size_kb: Option<u64>,
    /// Item description
    pub description: Option<String>,
    /// Restart requirement
    pub restart_action: Option<RestartAction>,
    /// Item title
    pub display_name: Option<String>,
}

/// Queries basic info about an installer item.
///
/// All fields of the report are optional; a failed query is an empty report.
pub trait InstallerInfo {
    fn pkg_info(&self, pkg: &Path) -> InstallerReport;
}

/// One entry of the live package database.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub package_id: String,
    pub version: String,
}

/// Queries the live system package database by package id.
pub trait PackageRegistry {
    /// `None` covers both "not installed" and "query failed".
    fn pkg_info(&self, package_id: &str) -> Option<RegistryEntry>;
}

/// `xar`-based flat package extraction.
pub struct XarExtractor;

impl ArchiveExtractor for XarExtractor {
    fn extract(&self, archive: &Path, exclude: &str, dest: &Path) -> Result<()> {
        let status = Command::new(XAR)
            .arg("-xf")
            .arg(archive)
            .arg("--exclude")
            .arg(exclude)
            .current_dir(dest)
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Tool(format!(
                "xar -xf {} exited with {}",
                archive.display(),
                status
            )))
        }
    }
}

/// Uses the system installer tool to get basic info about an installer item.
pub struct InstallerTool;

impl InstallerInfo for InstallerTool {
    fn pkg_info(&self, pkg: &Path) -> InstallerReport {
        let mut report = InstallerReport::default();

        let output = match Command::new(INSTALLER)
            .args(["-pkginfo", "-verbose", "-plist", "-pkg"])
            .arg(pkg)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                warn!("installer query failed for {}: {}", pkg.display(), e);
                return report;
            }
        };
        if output.stdout.is_empty() {
            return report;
        }

        match plist::Value::from_reader(Cursor::new(&output.stdout)) {
            Ok(value) => {
                if let Some(dict) = value.as_dictionary() {
                    report.installed_size_kb = dict
                        .get("Size")
                        .and_then(|v| v.as_unsigned_integer());
                    report.description = dict
                        .get("Description")
                        .and_then(|v| v.as_string())
                        .map(|s| s.to_string());
                    report.display_name = dict
                        .get("Title")
                        .and_then(|v| v.as_string())
                        .map(|s| s.to_string());
                    if dict.get("Will Restart").and_then(|v| v.as_string()) == Some("YES") {
                        report.restart_action = Some(RestartAction::RequireRestart);
                    }
                }
            }
            Err(e) => {
                warn!("unparseable installer output for {}: {}", pkg.display(), e);
                return report;
            }
        }

        // the RestartAction query is more specific than the Will Restart flag
        if let Ok(output) = Command::new(INSTALLER)
            .args(["-query", "RestartAction", "-pkg"])
            .arg(pkg)
            .output()
        {
            let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !answer.is_empty() && answer != "None" {
                match RestartAction::parse(&answer) {
                    Some(action) => report.restart_action = Some(action),
                    None => debug!("unknown RestartAction answer: {}", answer),
                }
            }
        }

        report
    }
}

/// `pkgutil`-backed live package database.
pub struct PkgUtil;

impl PackageRegistry for PkgUtil {
    fn pkg_info(&self, package_id: &str) -> Option<RegistryEntry> {
        let output = Command::new(PKGUTIL)
            .args(["--pkg-info-plist", package_id])
            .output()
            .ok()?;
        if output.stdout.is_empty() {
            return None;
        }

        let value = match plist::Value::from_reader(Cursor::new(&output.stdout)) {
            Ok(value) => value,
            Err(e) => {
                warn!("unparseable pkgutil output for {}: {}", package_id, e);
                return None;
            }
        };
        let dict = value.as_dictionary()?;

        let found_id = dict.get("pkgid").and_then(|v| v.as_string())?;
        let version = dict.get("pkg-version").and_then(|v| v.as_string())?;

        debug!("registry has {} version {}", found_id, version);
        Some(RegistryEntry {
            package_id: found_id.to_string(),
            version: version.to_string(),
        })
    }
}
