//! Host-document serialization: parsing an SVG/XML document into a
//! [`Container`](crate::Container) and writing it back.
//!
//! The container lives in a single well-known region: one
//! `<svgpack:bundle>` element placed immediately before the closing tag of
//! the document's root element. Everything outside that region is
//! passthrough and survives a round trip byte-for-byte; see [`Passthrough`].
//!
//! ```rust
//! use svgpack::{document, AddOptions, EntryPath};
//!
//! let host = "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";
//! let mut parsed = document::parse(host).unwrap();
//! parsed
//!     .container
//!     .add_entry(EntryPath::new("hello.txt").unwrap(), b"hi", &AddOptions::default())
//!     .unwrap();
//! let output = document::serialize(&parsed.container, &parsed.passthrough).unwrap();
//! assert!(output.contains("svgpack:bundle"));
//! ```

mod reader;
mod writer;

pub use reader::{ParsedDocument, parse};
pub use writer::serialize;

/// XML namespace of the container region.
pub const BUNDLE_NAMESPACE: &str = "urn:svgpack:container:1";

/// Element name of the container region.
pub(crate) const BUNDLE_TAG: &[u8] = b"svgpack:bundle";

/// Element name of the metadata block.
pub(crate) const MANIFEST_TAG: &[u8] = b"svgpack:manifest";

/// Element name of an entry block.
pub(crate) const ENTRY_TAG: &[u8] = b"svgpack:entry";

/// A minimal SVG host document for bootstrapping new containers.
pub const DEFAULT_HOST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="128" height="128" viewBox="0 0 128 128">
  <rect width="128" height="128" fill="none"/>
</svg>
"#;

/// Host-document content unrelated to the container.
///
/// `leading` holds every byte before the container region, `trailing` every
/// byte from the root element's closing tag onward. Both are reproduced
/// verbatim by [`serialize`]; the container region is the only span the
/// writer inserts or replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passthrough {
    /// Bytes before the container region.
    pub leading: String,
    /// Bytes after the container region, starting at the root closing tag.
    pub trailing: String,
}

impl Passthrough {
    /// Total passthrough byte length.
    pub fn len(&self) -> usize {
        self.leading.len() + self.trailing.len()
    }

    /// Returns `true` when both fragments are empty.
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }
}
