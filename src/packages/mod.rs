// src/packages/mod.rs

//! Package inspectors and the identity data model
//!
//! Two inspectors cover the historical packaging layouts: flat single-file
//! archives ([`flat`]) and legacy bundle directories ([`bundle`]). Both
//! produce [`Receipt`] records; the resolver assembles them into a
//! [`PackageMetadata`].

pub mod bundle;
pub mod flat;

use serde::{Deserialize, Serialize};

/// Identity of one sub-package as declared by a descriptor or receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Reverse-DNS package identifier
    pub package_id: String,

    /// Version, normalized to five components
    pub version: String,

    /// Declared install footprint in kilobytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_size_kb: Option<u64>,
}

/// Restart requirement reported by the installer-info tool.
///
/// Pass-through of the system installer's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartAction {
    None,
    RequireRestart,
    RecommendRestart,
    RequireLogout,
    RequireShutdown,
}

impl RestartAction {
    /// Parse the installer tool's answer; unknown strings are dropped.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "None" => Some(Self::None),
            "RequireRestart" => Some(Self::RequireRestart),
            "RecommendRestart" => Some(Self::RecommendRestart),
            "RequireLogout" => Some(Self::RequireLogout),
            "RequireShutdown" => Some(Self::RequireShutdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::RequireRestart => "RequireRestart",
            Self::RecommendRestart => "RecommendRestart",
            Self::RequireLogout => "RequireLogout",
            Self::RequireShutdown => "RequireShutdown",
        }
    }
}

/// Canonical identity of one installer item.
///
/// Constructed fresh per resolution call and immutable once returned. An
/// unresolvable item yields the default (empty) record rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Name derived from the filename stem
    pub name: String,

    /// Display version (not necessarily five-part)
    pub version: String,

    /// Title reported by the installer-info tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Description reported by the installer-info tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Restart requirement, when one is declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_action: Option<RestartAction>,

    /// Installed footprint in kilobytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_size_kb: Option<u64>,

    /// Sub-package receipts this item would register, in discovery order
    pub receipts: Vec<Receipt>,
}
