//! Host-document serialization.

use quick_xml::escape::escape;
use serde_json::{Map, Value};

use crate::container::Container;
use crate::{Error, Result, checksum};

use super::{BUNDLE_NAMESPACE, Passthrough};

/// Serializes a container back into a host document.
///
/// The output is `passthrough.leading` + the container region +
/// `passthrough.trailing`, so every passthrough byte survives verbatim and
/// the region is the only inserted span. [`parse`](super::parse) of the
/// result recovers an equal container and equal passthrough fragments.
///
/// Serialization is deterministic: entries are written in insertion order
/// and the manifest JSON has sorted keys.
///
/// # Errors
///
/// [`Error::InvalidHostFormat`] when the passthrough fragments leave no
/// insertion point (the host document's root element was self-closing).
pub fn serialize(container: &Container, passthrough: &Passthrough) -> Result<String> {
    // A host whose root element is self-closing has no span between the
    // opening and closing of the root where the region could live.
    if !passthrough.trailing.contains("</") {
        return Err(Error::InvalidHostFormat(
            "host document has no insertion point for the container region".into(),
        ));
    }

    let bundle = render_bundle(container)?;
    let mut out =
        String::with_capacity(passthrough.leading.len() + bundle.len() + passthrough.trailing.len());
    out.push_str(&passthrough.leading);
    out.push_str(&bundle);
    out.push_str(&passthrough.trailing);
    Ok(out)
}

/// Renders the container region.
fn render_bundle(container: &Container) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "<svgpack:bundle xmlns:svgpack=\"{}\">\n",
        BUNDLE_NAMESPACE
    ));

    let manifest = manifest_json(container)?;
    out.push_str("<svgpack:manifest>");
    out.push_str(&escape(&manifest));
    out.push_str("</svgpack:manifest>\n");

    for entry in container.entries() {
        out.push_str(&format!(
            "<svgpack:entry path=\"{}\" media-type=\"{}\" encoding=\"{}\" \
             checksum=\"{}\" raw-size=\"{}\" added-at=\"{}\">",
            escape(entry.path.as_str()),
            escape(&entry.media_type),
            escape(&entry.encoding),
            checksum::format_crc32(entry.checksum),
            entry.raw_size,
            entry.added_at.to_rfc3339(),
        ));
        out.push_str(&escape(&entry.payload));
        out.push_str("</svgpack:entry>\n");
    }

    out.push_str("</svgpack:bundle>");
    Ok(out)
}

/// Builds the manifest block JSON: metadata plus the derived tree when
/// structure preservation is on.
fn manifest_json(container: &Container) -> Result<String> {
    let mut manifest = Map::new();
    manifest.insert(
        "metadata".to_string(),
        Value::Object(container.metadata.as_map().clone()),
    );
    if container.structure_preserved() {
        let tree = serde_json::to_value(container.tree()).map_err(|e| {
            Error::InvalidHostFormat(format!("cannot serialize structure tree: {}", e))
        })?;
        manifest.insert("structure".to_string(), tree);
    }
    serde_json::to_string(&Value::Object(manifest)).map_err(|e| {
        Error::InvalidHostFormat(format!("cannot serialize container manifest: {}", e))
    })
}
