// src/version.rs

//! Version-string normalization and loose ordering
//!
//! Apple distribution and flat packages carry five-part version numbers;
//! everything else carries whatever the vendor felt like. Internal comparison
//! always goes through [`pad_version`] (exactly five components) and
//! [`LooseVersion`] (componentwise, numeric where possible, byte-lexical
//! otherwise).

use std::cmp::Ordering;
use std::fmt;

/// Component count used for normalized versions throughout the crate.
pub const VERSION_COMPONENTS: usize = 5;

/// The all-zero placeholder produced when no version source exists.
pub const ZERO_VERSION: &str = "0.0.0.0.0";

/// Normalize a raw version string to exactly `count` dot-separated components.
///
/// Missing or empty input is treated as `"0"`. Longer inputs are truncated,
/// shorter ones right-padded with `"0"` components. Never fails.
pub fn pad_version(raw: Option<&str>, count: usize) -> String {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => "0",
    };

    let mut components: Vec<&str> = raw.split('.').collect();
    if components.len() > count {
        components.truncate(count);
        components.join(".")
    } else {
        let mut components: Vec<String> = components.drain(..).map(String::from).collect();
        while components.len() < count {
            components.push("0".to_string());
        }
        components.join(".")
    }
}

/// Compare two version strings under loose ordering.
///
/// Componentwise, left to right. A position compares numerically when both
/// sides parse as integers and byte-lexically otherwise; the shorter sequence
/// is extended with `"0"` components. Tolerates any component count and mixed
/// numeric/text components, so `"2.0.3124.0" > "2.0"` and `"2.3b1" > "2.3"`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();

    for i in 0..left.len().max(right.len()) {
        let lc = left.get(i).copied().unwrap_or("0");
        let rc = right.get(i).copied().unwrap_or("0");

        let ordering = match (lc.parse::<u64>(), rc.parse::<u64>()) {
            (Ok(ln), Ok(rn)) => ln.cmp(&rn),
            _ => lc.cmp(rc),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// A version string carrying loose ordering semantics.
///
/// Wraps the raw string unchanged; equality and ordering go through
/// [`compare_versions`], so `"1.0"` and `"1.0.0"` compare equal even though
/// the text differs.
#[derive(Debug, Clone)]
pub struct LooseVersion(String);

impl LooseVersion {
    pub fn new(version: &str) -> Self {
        Self(version.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        compare_versions(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for LooseVersion {}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(&self.0, &other.0)
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LooseVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}
