//! # svgpack
//!
//! A library for embedding, inspecting, and extracting files inside SVG
//! documents.
//!
//! svgpack turns an ordinary SVG into a container: arbitrary files (binary
//! or text) are stored as self-describing, addressable entries in a single
//! well-known region of the document, together with a metadata record and
//! an optional directory-tree description. Everything else in the host
//! document is passthrough and survives every operation byte-for-byte.
//!
//! ## Quick Start
//!
//! ### Embedding files
//!
//! ```rust,no_run
//! use svgpack::ops::{ContainerFile, ImportOptions, ImportSource};
//! use svgpack::{EntryPath, Result};
//!
//! fn main() -> Result<()> {
//!     let file = ContainerFile::open("drawing.svg")?;
//!
//!     let sources = vec![
//!         ImportSource::from_bytes(
//!             "assets",
//!             EntryPath::new("logo.png")?,
//!             std::fs::read("logo.png")?,
//!         ),
//!     ];
//!     let result = file.import(&sources, &ImportOptions::default())?;
//!     println!("added {}, skipped {}", result.added(), result.skipped());
//!     Ok(())
//! }
//! ```
//!
//! ### Listing and extracting
//!
//! ```rust,no_run
//! use svgpack::ops::{ContainerFile, DirectorySink, ExportOptions, ExportSelector, ListFilter};
//! use svgpack::Result;
//!
//! fn main() -> Result<()> {
//!     let file = ContainerFile::open("drawing.svg")?;
//!
//!     for info in file.list(&ListFilter::all())? {
//!         println!("{}: {} bytes ({})", info.path, info.raw_size, info.media_type);
//!     }
//!
//!     let mut sink = DirectorySink::new("./extracted");
//!     file.export(&ExportSelector::All, &mut sink, &ExportOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ### Working in memory
//!
//! The [`document`] module exposes the parse/serialize pair directly for
//! callers that manage their own I/O:
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
//! let reparsed = document::parse(&output).unwrap();
//! assert_eq!(reparsed.container, parsed.container);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `deflate` | Yes | `base64+deflate` payload compression |
//! | `cli` | No | The `svgpack` command-line tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Entry-level failures inside batch
//! operations are reported per item; see the [`ops`] module.
//!
//! ## Integrity
//!
//! Every entry stores a CRC-32 of its raw bytes. Decoding re-verifies the
//! checksum and the declared raw size, so corruption introduced after
//! embedding fails the affected entry's export while leaving listing and
//! the rest of the batch intact.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod checksum;
pub mod codec;
pub mod container;
pub mod document;
pub mod entry_path;
pub mod error;
pub mod media_type;
pub mod ops;
pub mod tree;

pub use entry_path::EntryPath;
pub use error::{Error, Result};

// Re-export the container model at the crate root for convenience
pub use container::{AddOptions, Container, Entry, Metadata};

// Re-export the codec surface at the crate root for convenience
pub use codec::{EncodePolicy, PayloadEncoding};

// Re-export the document surface at the crate root for convenience
pub use document::{ParsedDocument, Passthrough};

// Re-export the tree surface at the crate root for convenience
pub use tree::{MergeStrategy, NodeKind, TreeNode};
