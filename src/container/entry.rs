//! Embedded entry type.

use chrono::{DateTime, Utc};

use crate::checksum::Crc32;
use crate::codec::{self, EncodePolicy};
use crate::{EntryPath, Error, Result, media_type};

/// One embedded file: its encoded payload plus descriptive fields.
///
/// Entries are immutable once created; mutation happens by replacing the
/// entry in its [`Container`](crate::Container). The `encoding` field holds
/// the wire tag verbatim so that containers written by newer versions with
/// unknown encodings still list and round-trip; decoding resolves the tag
/// and is where an unrecognized one surfaces as [`Error::Decode`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Entry {
    /// The logical path within the container.
    pub path: EntryPath,
    /// The encoded payload text as stored in the entry block.
    pub payload: String,
    /// The encoding tag (`utf8-text`, `base64`, `base64+deflate`).
    pub encoding: String,
    /// The declared MIME type.
    pub media_type: String,
    /// CRC-32 of the raw (decoded) bytes.
    pub checksum: u32,
    /// Byte length before encoding.
    pub raw_size: u64,
    /// Byte length of the payload text.
    pub encoded_size: u64,
    /// When the entry was inserted.
    pub added_at: DateTime<Utc>,
}

impl Entry {
    /// Builds an entry from raw bytes.
    ///
    /// The media type is taken from `media_type_hint` or inferred from the
    /// path's extension; the encoding is chosen by `policy` (textual types
    /// verbatim, everything else base64, optional deflate pass).
    pub fn from_bytes(
        path: EntryPath,
        raw: &[u8],
        media_type_hint: Option<&str>,
        policy: &EncodePolicy,
    ) -> Self {
        let media_type = media_type_hint
            .map(str::to_string)
            .unwrap_or_else(|| media_type::infer(&path).to_string());
        let encoded = codec::encode(raw, &media_type, policy);
        Self {
            path,
            encoded_size: encoded.text.len() as u64,
            payload: encoded.text,
            encoding: encoded.encoding.as_str().to_string(),
            media_type,
            checksum: Crc32::compute(raw),
            raw_size: raw.len() as u64,
            added_at: Utc::now(),
        }
    }

    /// Decodes the payload back into raw bytes, verifying integrity.
    ///
    /// # Errors
    ///
    /// - [`Error::Decode`] when the encoding tag is unrecognized, the payload
    ///   is invalid for its encoding, or the decoded length disagrees with
    ///   `raw_size`
    /// - [`Error::ChecksumMismatch`] when the decoded bytes hash differently
    ///   than the stored checksum
    pub fn decode(&self) -> Result<Vec<u8>> {
        let encoding = codec::PayloadEncoding::parse(&self.encoding)
            .map_err(|e| Error::decode(self.path.as_str(), e.to_string()))?;
        let raw = codec::decode(&self.payload, encoding).map_err(|e| match e {
            Error::Decode { reason, .. } => Error::decode(self.path.as_str(), reason),
            other => other,
        })?;

        if raw.len() as u64 != self.raw_size {
            return Err(Error::decode(
                self.path.as_str(),
                format!(
                    "decoded length {} does not match declared raw size {}",
                    raw.len(),
                    self.raw_size
                ),
            ));
        }

        let actual = Crc32::compute(&raw);
        if actual != self.checksum {
            return Err(Error::ChecksumMismatch {
                path: self.path.as_str().to_string(),
                expected: self.checksum,
                actual,
            });
        }

        Ok(raw)
    }

    /// Returns the file name (last path segment).
    pub fn name(&self) -> &str {
        self.path.file_name()
    }

    /// Returns `true` when this entry holds the same content as `raw`.
    ///
    /// Compares size first, then checksum; used for dedup-aware overwrite
    /// detection without decoding the payload.
    pub fn has_same_content(&self, raw: &[u8]) -> bool {
        self.raw_size == raw.len() as u64 && self.checksum == Crc32::compute(raw)
    }
}
