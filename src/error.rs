//! Error types for SVG container operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when reading, mutating, or writing SVG containers, along
//! with a convenient [`Result<T>`] type alias.
//!
//! All fallible operations in this crate return `Result<T, Error>`:
//!
//! ```rust,no_run
//! use svgpack::{document, Result};
//!
//! fn count_entries(svg: &str) -> Result<usize> {
//!     let parsed = document::parse(svg)?;
//!     Ok(parsed.container.len())
//! }
//! ```
//!
//! Batch operations in the operation layer convert per-entry errors into
//! per-item outcome records instead of propagating them; single-item calls
//! propagate the error unchanged.

use std::io;

/// The main error type for SVG container operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Host format | [`InvalidHostFormat`][Self::InvalidHostFormat] | Malformed host XML |
/// | Entry lookup | [`DuplicatePath`][Self::DuplicatePath], [`EntryNotFound`][Self::EntryNotFound] | Caller-resolvable path conflicts |
/// | Payload | [`Decode`][Self::Decode], [`ChecksumMismatch`][Self::ChecksumMismatch] | Corrupt entry data |
/// | Structure | [`StructureConflict`][Self::StructureConflict] | Tree/flat mismatch |
/// | Resources | [`LimitExceeded`][Self::LimitExceeded] | Size/count guards |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The host document is not well-formed XML or its container region is
    /// unreadable.
    ///
    /// This error is fatal: the operation aborts before any mutation, and
    /// the host document on disk is left untouched.
    #[error("invalid host document: {0}")]
    InvalidHostFormat(String),

    /// An entry already exists at the given logical path.
    ///
    /// Returned by insertion and rename when the target path is taken and no
    /// overwrite was requested. Recoverable by caller policy (rename the
    /// source or pass an explicit overwrite flag).
    #[error("entry already exists: {path}")]
    DuplicatePath {
        /// The logical path that is already occupied.
        path: String,
    },

    /// No entry exists at the given logical path.
    #[error("entry not found: {path}")]
    EntryNotFound {
        /// The logical path that was not found.
        path: String,
    },

    /// An entry payload could not be decoded.
    ///
    /// The encoding tag is unrecognized, or the payload text is not valid
    /// for the declared encoding (malformed base64 alphabet, truncated
    /// stream, invalid UTF-8). Listing still works on such entries because
    /// it never touches payloads; only export/extract trips this.
    #[error("{}", DecodeDisplay { path: path.as_deref(), reason: reason.as_str() })]
    Decode {
        /// The logical path of the affected entry, when known.
        path: Option<String>,
        /// What went wrong while decoding.
        reason: String,
    },

    /// Decoded bytes do not match the entry's stored checksum.
    ///
    /// The payload decoded cleanly but the content hash disagrees, so the
    /// entry was corrupted after it was embedded.
    #[error("checksum mismatch for '{path}': expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// The logical path of the corrupt entry.
        path: String,
        /// The CRC-32 recorded in the entry block.
        expected: u32,
        /// The CRC-32 of the decoded bytes.
        actual: u32,
    },

    /// The directory-tree description disagrees with the flat entry set,
    /// or the container region itself is structurally ambiguous (multiple
    /// manifest blocks, nested bundles).
    ///
    /// Fatal for the structure-affecting call only.
    #[error("structure conflict: {0}")]
    StructureConflict(String),

    /// A size or count guard tripped before any bytes were written.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// A logical path failed validation.
    ///
    /// Logical paths must be relative, forward-slash separated, non-empty,
    /// free of NUL bytes and `.`/`..` segments, and not end with a slash.
    #[error("invalid entry path: {0}")]
    InvalidEntryPath(String),

    /// The batch was cancelled before all items were dispatched.
    ///
    /// Entries already committed to the in-memory container stay committed;
    /// the host document is only persisted at the end of a successful
    /// transaction, so cancellation before the write leaves it untouched.
    #[error("operation cancelled")]
    Cancelled,
}

/// Helper struct for formatting Decode error messages.
struct DecodeDisplay<'a> {
    path: Option<&'a str>,
    reason: &'a str,
}

impl std::fmt::Display for DecodeDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path {
            Some(path) => write!(f, "cannot decode entry '{}': {}", path, self.reason),
            None => write!(f, "cannot decode payload: {}", self.reason),
        }
    }
}

impl Error {
    /// Returns `true` if this error indicates corrupt container data.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::Decode { .. } | Error::ChecksumMismatch { .. } | Error::InvalidHostFormat(_)
        )
    }

    /// Returns `true` if this error is resolvable by caller policy.
    ///
    /// Duplicate paths can be resolved with an overwrite flag or a rename;
    /// missing entries by fixing the selector. Corruption and limit errors
    /// are not resolvable this way.
    pub fn is_caller_resolvable(&self) -> bool {
        matches!(
            self,
            Error::DuplicatePath { .. } | Error::EntryNotFound { .. } | Error::Cancelled
        )
    }

    /// Returns the logical path associated with this error, if any.
    pub fn entry_path(&self) -> Option<&str> {
        match self {
            Error::DuplicatePath { path } => Some(path),
            Error::EntryNotFound { path } => Some(path),
            Error::ChecksumMismatch { path, .. } => Some(path),
            Error::Decode { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// Creates a [`Error::Decode`] with entry context.
    pub fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Decode {
            path: Some(path.into()),
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::Decode`] without entry context.
    pub fn decode_bare(reason: impl Into<String>) -> Self {
        Error::Decode {
            path: None,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;
