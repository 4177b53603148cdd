// src/descriptor.rs

//! Distribution / PackageInfo descriptor parsing
//!
//! Both the `Distribution` file of a flat package and the `.dist` file of a
//! multi-package bundle enumerate sub-packages in XML. Two schema variants
//! exist: `pkg-ref` elements with `id`/`version` attributes (distribution
//! style) and `pkg-info` elements with `identifier`/`version` attributes
//! (PackageInfo style). The `pkg-info` variant is consulted only when no
//! `pkg-ref` record was produced.

use crate::packages::Receipt;
use crate::version::{pad_version, VERSION_COMPONENTS};
use crate::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Parse a descriptor file into deduplicated sub-package receipts.
///
/// Unreadable or malformed files parse as empty; descriptor trouble never
/// aborts a resolution.
pub fn parse_pkg_refs(path: &Path) -> Vec<Receipt> {
    let xml = match fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(e) => {
            warn!("could not read descriptor {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match parse_pkg_refs_str(&xml) {
        Ok(receipts) => receipts,
        Err(e) => {
            warn!("could not parse descriptor {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Parse descriptor XML from memory.
pub(crate) fn parse_pkg_refs_str(xml: &str) -> Result<Vec<Receipt>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut pkg_refs: Vec<Receipt> = Vec::new();
    let mut pkg_infos: Vec<Receipt> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.name().as_ref() {
                b"pkg-ref" => {
                    let mut id = None;
                    let mut version = None;
                    let mut install_kbytes = None;

                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"id" => id = Some(value),
                            b"version" => version = Some(value),
                            b"installKBytes" => install_kbytes = value.parse().ok(),
                            _ => {}
                        }
                    }

                    // both id and version are required to produce a record
                    if let (Some(id), Some(version)) = (id, version) {
                        let receipt = Receipt {
                            package_id: id,
                            version: pad_version(Some(&version), VERSION_COMPONENTS),
                            installed_size_kb: install_kbytes,
                        };
                        // "manual" ids are known broken tool output
                        if !receipt.package_id.starts_with("manual")
                            && !pkg_refs.contains(&receipt)
                        {
                            pkg_refs.push(receipt);
                        }
                    }
                }
                b"pkg-info" => {
                    let mut identifier = None;
                    let mut version = None;

                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"identifier" => identifier = Some(value),
                            b"version" => version = Some(value),
                            _ => {}
                        }
                    }

                    if let (Some(identifier), Some(version)) = (identifier, version) {
                        let receipt = Receipt {
                            package_id: identifier,
                            version: pad_version(Some(&version), VERSION_COMPONENTS),
                            installed_size_kb: None,
                        };
                        if !pkg_infos.contains(&receipt) {
                            pkg_infos.push(receipt);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(if pkg_refs.is_empty() { pkg_infos } else { pkg_refs })
}

/// Collect the text content of `pkg-ref` elements.
///
/// Multi-package bundle `.dist` files reference their nested sub-packages as
/// percent-encoded `file:` fragments in `pkg-ref` bodies; the bundle walker
/// resolves those against the bundle root.
pub fn pkg_ref_texts(path: &Path) -> Vec<String> {
    let xml = match fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(e) => {
            warn!("could not read descriptor {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut texts = Vec::new();
    let mut in_pkg_ref = false;
    let mut current = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"pkg-ref" => {
                in_pkg_ref = true;
                current.clear();
            }
            Ok(Event::Text(e)) if in_pkg_ref => {
                current.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"pkg-ref" => {
                in_pkg_ref = false;
                if !current.is_empty() {
                    texts.push(std::mem::take(&mut current));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("could not parse descriptor {}: {}", path.display(), e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    texts
}
