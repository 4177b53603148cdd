// src/error.rs

use thiserror::Error;

/// Core error types for Pkgident
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Property list read/parse errors
    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),

    /// Descriptor XML parse errors
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An external tool exited non-zero or produced unusable output
    #[error("External tool failed: {0}")]
    Tool(String),
}

/// Result type alias using Pkgident's Error type
pub type Result<T> = std::result::Result<T, Error>;
