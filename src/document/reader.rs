//! Host-document parsing.

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::Value;

use crate::container::{Container, Entry, Metadata};
use crate::tree::{self, TreeNode};
use crate::{EntryPath, Error, Result, checksum, media_type};

use super::{BUNDLE_TAG, ENTRY_TAG, MANIFEST_TAG, Passthrough};

/// The result of parsing a host document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// The embedded file set (empty when the host held no container).
    pub container: Container,
    /// Host-document content outside the container region.
    pub passthrough: Passthrough,
}

/// Parses a host document into a container plus passthrough fragments.
///
/// A well-formed document with no container region yields an empty
/// container. The whole document is streamed once to check well-formedness
/// and locate the container region; the region is then parsed separately.
///
/// # Errors
///
/// - [`Error::InvalidHostFormat`] when the document is not well-formed XML,
///   or the container region is unreadable (missing manifest, corrupt
///   manifest JSON, malformed entry attributes)
/// - [`Error::StructureConflict`] for multiple or nested bundle regions,
///   multiple manifest blocks, duplicate entry paths, or a stored tree that
///   disagrees with the entry set
pub fn parse(input: &str) -> Result<ParsedDocument> {
    let scan = scan_host(input)?;

    match scan.bundle {
        None => Ok(ParsedDocument {
            container: Container::new(),
            passthrough: Passthrough {
                leading: input[..scan.root_close].to_string(),
                trailing: input[scan.root_close..].to_string(),
            },
        }),
        Some((start, end)) => {
            let container = parse_bundle(&input[start..end])?;
            Ok(ParsedDocument {
                container,
                passthrough: Passthrough {
                    leading: input[..start].to_string(),
                    trailing: input[end..].to_string(),
                },
            })
        }
    }
}

/// Byte spans located by the host scan.
struct HostScan {
    /// Span of the bundle element, when present.
    bundle: Option<(usize, usize)>,
    /// Offset of the root element's closing tag (the container insertion
    /// point for documents without a bundle).
    root_close: usize,
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidHostFormat(reason.into())
}

/// Streams the whole document once: verifies well-formedness, finds the
/// bundle span and the root closing tag.
fn scan_host(input: &str) -> Result<HostScan> {
    let mut reader = Reader::from_str(input);
    let mut depth = 0usize;
    let mut root_open = false;
    let mut root_close: Option<usize> = None;
    let mut bundle: Option<(usize, usize)> = None;
    let mut bundle_open: Option<(usize, usize)> = None; // (span start, depth)

    loop {
        let pos = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| invalid(format!("XML parse error near byte {}: {}", pos, e)))?;
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    if root_open {
                        return Err(invalid("multiple root elements"));
                    }
                    root_open = true;
                }
                depth += 1;
                if e.name().as_ref() == BUNDLE_TAG {
                    if bundle.is_some() || bundle_open.is_some() {
                        return Err(Error::StructureConflict(
                            "multiple container regions in host document".into(),
                        ));
                    }
                    bundle_open = Some((pos, depth));
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    if root_open {
                        return Err(invalid("multiple root elements"));
                    }
                    // Self-closing root: well-formed, but there is no span
                    // between open and close to host a container region.
                    root_open = true;
                    root_close = Some(reader.buffer_position() as usize);
                } else if e.name().as_ref() == BUNDLE_TAG {
                    if bundle.is_some() || bundle_open.is_some() {
                        return Err(Error::StructureConflict(
                            "multiple container regions in host document".into(),
                        ));
                    }
                    bundle = Some((pos, reader.buffer_position() as usize));
                }
            }
            Event::End(e) => {
                if depth == 0 {
                    return Err(invalid("closing tag without matching open"));
                }
                if let Some((start, open_depth)) = bundle_open {
                    if depth == open_depth && e.name().as_ref() == BUNDLE_TAG {
                        bundle = Some((start, reader.buffer_position() as usize));
                        bundle_open = None;
                    }
                }
                depth -= 1;
                if depth == 0 {
                    root_close = Some(pos);
                }
            }
            Event::Text(t) => {
                if depth == 0 && !t.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(invalid("text content outside the root element"));
                }
            }
            Event::Eof => break,
            // Declarations, doctype, comments, processing instructions are
            // passthrough content.
            _ => {}
        }
    }

    if depth != 0 {
        return Err(invalid("unclosed elements at end of document"));
    }
    let root_close = root_close.ok_or_else(|| invalid("no root element"))?;

    Ok(HostScan { bundle, root_close })
}

/// Attributes collected from an entry block.
#[derive(Default)]
struct EntryAttributes {
    path: Option<String>,
    media_type: Option<String>,
    encoding: Option<String>,
    checksum: Option<String>,
    raw_size: Option<String>,
    added_at: Option<String>,
}

/// Parses the bundle region into a container.
fn parse_bundle(region: &str) -> Result<Container> {
    let mut reader = Reader::from_str(region);
    let mut entries: Vec<Entry> = Vec::new();
    let mut manifest: Option<String> = None;
    let mut in_bundle = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| invalid(format!("container region parse error: {}", e)))?;
        match event {
            Event::Start(e) if !in_bundle => {
                if e.name().as_ref() != BUNDLE_TAG {
                    return Err(invalid("container region does not start with a bundle"));
                }
                in_bundle = true;
            }
            Event::Start(e) => match e.name().as_ref() {
                MANIFEST_TAG => {
                    if manifest.is_some() {
                        return Err(Error::StructureConflict(
                            "multiple manifest blocks in container region".into(),
                        ));
                    }
                    manifest = Some(read_element_text(&mut reader, MANIFEST_TAG)?);
                }
                ENTRY_TAG => {
                    let attributes = entry_attributes(&e)?;
                    let payload = read_element_text(&mut reader, ENTRY_TAG)?;
                    entries.push(build_entry(attributes, payload)?);
                }
                other => {
                    return Err(Error::StructureConflict(format!(
                        "unexpected element '{}' in container region",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Event::Empty(e) if in_bundle && e.name().as_ref() == ENTRY_TAG => {
                let attributes = entry_attributes(&e)?;
                entries.push(build_entry(attributes, String::new())?);
            }
            Event::Empty(e) if in_bundle => {
                return Err(Error::StructureConflict(format!(
                    "unexpected element '{}' in container region",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Event::End(e) if e.name().as_ref() == BUNDLE_TAG => {
                in_bundle = false;
            }
            Event::Text(t) => {
                if !t.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(invalid("stray text in container region"));
                }
            }
            Event::Comment(_) => {}
            Event::Eof => break,
            _ => return Err(invalid("unexpected markup in container region")),
        }
    }

    let manifest = manifest.ok_or_else(|| invalid("container region missing manifest block"))?;
    assemble_container(&manifest, entries)
}

/// Reads the text content of the current element up to its end tag.
///
/// Payloads and manifests are text-only; any nested markup is corruption.
fn read_element_text(reader: &mut Reader<&[u8]>, tag: &[u8]) -> Result<String> {
    let mut out = String::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| invalid(format!("container region parse error: {}", e)))?;
        match event {
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| invalid(format!("bad character escape: {}", e)))?;
                out.push_str(&text);
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| invalid(format!("non-UTF-8 CDATA payload: {}", e)))?;
                out.push_str(text);
            }
            Event::End(e) if e.name().as_ref() == tag => break,
            _ => {
                return Err(invalid(format!(
                    "unexpected markup inside <{}>",
                    String::from_utf8_lossy(tag)
                )));
            }
        }
    }
    Ok(out)
}

fn entry_attributes(element: &BytesStart<'_>) -> Result<EntryAttributes> {
    let mut attributes = EntryAttributes::default();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| invalid(format!("malformed entry attribute: {}", e)))?;
        let value = attr
            .unescape_value()
            .map_err(|e| invalid(format!("malformed entry attribute value: {}", e)))?
            .into_owned();
        match attr.key.as_ref() {
            b"path" => attributes.path = Some(value),
            b"media-type" => attributes.media_type = Some(value),
            b"encoding" => attributes.encoding = Some(value),
            b"checksum" => attributes.checksum = Some(value),
            b"raw-size" => attributes.raw_size = Some(value),
            b"added-at" => attributes.added_at = Some(value),
            // Unknown attributes are tolerated for forward compatibility
            _ => {}
        }
    }
    Ok(attributes)
}

fn build_entry(attributes: EntryAttributes, payload: String) -> Result<Entry> {
    let path = attributes
        .path
        .ok_or_else(|| invalid("entry block missing 'path' attribute"))?;
    let path = EntryPath::new(&path)?;

    let encoding = attributes
        .encoding
        .ok_or_else(|| invalid(format!("entry '{}' missing 'encoding' attribute", path)))?;

    let checksum_text = attributes
        .checksum
        .ok_or_else(|| invalid(format!("entry '{}' missing 'checksum' attribute", path)))?;
    let checksum = checksum::parse_crc32(&checksum_text)
        .ok_or_else(|| invalid(format!("entry '{}' has malformed checksum", path)))?;

    let raw_size_text = attributes
        .raw_size
        .ok_or_else(|| invalid(format!("entry '{}' missing 'raw-size' attribute", path)))?;
    let raw_size: u64 = raw_size_text
        .parse()
        .map_err(|_| invalid(format!("entry '{}' has malformed raw size", path)))?;

    let media_type = attributes.media_type.unwrap_or_else(|| {
        let inferred = media_type::infer(&path).to_string();
        log::warn!(
            "entry '{}' missing media type; inferred '{}'",
            path,
            inferred
        );
        inferred
    });

    let added_at = match attributes.added_at {
        Some(text) => DateTime::parse_from_rfc3339(&text)
            .map_err(|_| invalid(format!("entry '{}' has malformed timestamp", path)))?
            .with_timezone(&Utc),
        None => {
            log::warn!("entry '{}' missing timestamp; defaulting to epoch", path);
            DateTime::<Utc>::UNIX_EPOCH
        }
    };

    Ok(Entry {
        encoded_size: payload.len() as u64,
        payload,
        path,
        encoding,
        media_type,
        checksum,
        raw_size,
        added_at,
    })
}

/// Combines the manifest JSON and parsed entries into a container.
fn assemble_container(manifest: &str, entries: Vec<Entry>) -> Result<Container> {
    let manifest: Value = serde_json::from_str(manifest)
        .map_err(|e| invalid(format!("manifest block is not valid JSON: {}", e)))?;
    let Value::Object(mut manifest) = manifest else {
        return Err(invalid("manifest block is not a JSON object"));
    };

    let metadata = match manifest.remove("metadata") {
        Some(Value::Object(map)) => Metadata::from_map(map),
        Some(_) => return Err(invalid("manifest 'metadata' is not a JSON object")),
        None => return Err(invalid("manifest block missing 'metadata'")),
    };

    let structure = match manifest.remove("structure") {
        Some(value) => Some(
            serde_json::from_value::<TreeNode>(value)
                .map_err(|e| invalid(format!("manifest 'structure' is malformed: {}", e)))?,
        ),
        None => None,
    };

    for key in manifest.keys() {
        log::warn!("ignoring unknown manifest key '{}'", key);
    }

    let mut container = Container::from_parts(entries, metadata, structure.is_some())?;

    if let Some(stored_tree) = structure {
        tree::validate_tree(&stored_tree, &container.paths())?;
    }

    let parsed_count = container.len();
    if container.metadata.files_count() as usize != parsed_count {
        log::warn!(
            "stored files_count {} disagrees with {} parsed entries; recomputing",
            container.metadata.files_count(),
            parsed_count
        );
        container.metadata.set_files_count(parsed_count);
    }

    Ok(container)
}
