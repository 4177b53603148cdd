// src/lib.rs

//! Pkgident
//!
//! Package-identity resolver for Apple installer formats. Given an installer
//! item (a legacy bundle package, a flat archive, or an XML distribution
//! descriptor), it determines the item's canonical identity: name, normalized
//! version, installed footprint, restart requirement, and the sub-package
//! receipts it will register. Given a package id, it determines whether an
//! equivalent package is already installed on the machine and at what version.
//!
//! # Architecture
//!
//! - Identity over execution: this crate identifies packages, it never
//!   installs them
//! - Heuristic format discovery: three historical packaging layouts are
//!   reconciled by a fixed-order strategy list, not a single schema
//! - Five-part versions: internal comparison always uses 5-component padded
//!   versions under loose (mixed numeric/lexical) ordering
//! - Degraded, never fatal: unreadable input yields empty or sentinel
//!   results, never aborts the caller

pub mod descriptor;
mod error;
mod fsutil;
pub mod installed;
pub mod locate;
pub mod naming;
pub mod packages;
pub mod resolver;
pub mod tools;
pub mod version;

pub use error::{Error, Result};
pub use packages::{PackageMetadata, Receipt, RestartAction};
pub use resolver::Resolver;
