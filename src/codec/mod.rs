//! Payload codec: converts raw file bytes to and from their embedded
//! textual representation.
//!
//! The codec is a pure transform with no side effects. Encoding the same
//! bytes under the same policy always yields a byte-identical payload, which
//! the dedup-aware overwrite detection and the idempotence guarantees rely
//! on.
//!
//! Three encodings exist:
//!
//! | Tag | Payload | Used for |
//! |-----|---------|----------|
//! | `utf8-text` | verbatim text | textual media types with valid UTF-8 |
//! | `base64` | standard base64 | everything else |
//! | `base64+deflate` | deflate, then base64 | opt-in compression |
//!
//! Decoding reverses the layers in order: compression before base64, base64
//! before returning raw bytes.

#[cfg(feature = "deflate")]
mod deflate;

use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// How an entry payload was produced from its raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PayloadEncoding {
    /// Valid UTF-8 stored verbatim (XML-escaped in the entry block).
    Utf8Text,
    /// Standard base64, no compression.
    Base64,
    /// Deflate-compressed, then base64.
    #[cfg(feature = "deflate")]
    Base64Deflate,
}

impl PayloadEncoding {
    /// Returns the wire tag stored in the entry block's `encoding` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8Text => "utf8-text",
            Self::Base64 => "base64",
            #[cfg(feature = "deflate")]
            Self::Base64Deflate => "base64+deflate",
        }
    }

    /// Parses a wire tag back into an encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the tag is unrecognized, including the
    /// case where the container was created with compression but this build
    /// lacks the `deflate` feature.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "utf8-text" => Ok(Self::Utf8Text),
            "base64" => Ok(Self::Base64),
            #[cfg(feature = "deflate")]
            "base64+deflate" => Ok(Self::Base64Deflate),
            #[cfg(not(feature = "deflate"))]
            "base64+deflate" => Err(Error::decode_bare(
                "payload uses deflate compression but the 'deflate' feature is disabled",
            )),
            other => Err(Error::decode_bare(format!(
                "unknown encoding tag '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding policy for new entries.
#[derive(Debug, Clone)]
pub struct EncodePolicy {
    /// Store textual media types verbatim instead of base64.
    pub allow_text: bool,
    /// Wrap payloads in a deflate pass before base64.
    ///
    /// Compression wins on large text-heavy files and loses on data that is
    /// already compressed (PNG, ZIP); the policy applies uniformly and the
    /// caller decides when it pays off.
    #[cfg(feature = "deflate")]
    pub compress: bool,
    /// Deflate compression level (0-9).
    #[cfg(feature = "deflate")]
    pub compression_level: u32,
}

impl Default for EncodePolicy {
    fn default() -> Self {
        Self {
            allow_text: true,
            #[cfg(feature = "deflate")]
            compress: false,
            #[cfg(feature = "deflate")]
            compression_level: 6,
        }
    }
}

impl EncodePolicy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the deflate pass.
    #[cfg(feature = "deflate")]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// An encoded payload plus the tag describing how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// The payload text as stored in the entry block.
    pub text: String,
    /// The encoding tag.
    pub encoding: PayloadEncoding,
}

/// Encodes raw bytes into an embeddable payload.
///
/// Text files with a declared textual media type are stored verbatim when
/// they are valid UTF-8 and the policy allows it; everything else is base64.
/// With compression requested, a deflate pass wraps base64 regardless of
/// media type.
pub fn encode(raw: &[u8], media_type: &str, policy: &EncodePolicy) -> EncodedPayload {
    #[cfg(feature = "deflate")]
    if policy.compress {
        let compressed = deflate::compress(raw, policy.compression_level);
        return EncodedPayload {
            text: BASE64.encode(&compressed),
            encoding: PayloadEncoding::Base64Deflate,
        };
    }

    if policy.allow_text && crate::media_type::is_textual(media_type) {
        if let Ok(text) = std::str::from_utf8(raw) {
            if is_xml_safe_text(text) {
                return EncodedPayload {
                    text: text.to_string(),
                    encoding: PayloadEncoding::Utf8Text,
                };
            }
        }
    }

    EncodedPayload {
        text: BASE64.encode(raw),
        encoding: PayloadEncoding::Base64,
    }
}

/// Returns `true` when text can live in XML element content unchanged.
///
/// XML 1.0 forbids C0 control characters other than tab and newline, and
/// parsers are entitled to normalize carriage returns, so any of those
/// force the payload onto base64.
fn is_xml_safe_text(text: &str) -> bool {
    text.chars()
        .all(|c| c == '\t' || c == '\n' || ('\u{20}'..'\u{7F}').contains(&c) || c > '\u{7F}')
}

/// Decodes a payload back into raw bytes.
///
/// # Errors
///
/// Returns [`Error::Decode`] when the payload text is not valid for the
/// declared encoding: malformed base64 alphabet, truncated base64 length,
/// or a corrupt deflate stream.
pub fn decode(text: &str, encoding: PayloadEncoding) -> Result<Vec<u8>> {
    match encoding {
        PayloadEncoding::Utf8Text => Ok(text.as_bytes().to_vec()),
        PayloadEncoding::Base64 => decode_base64(text),
        #[cfg(feature = "deflate")]
        PayloadEncoding::Base64Deflate => {
            let compressed = decode_base64(text)?;
            deflate::decompress(&compressed)
        }
    }
}

/// Decodes base64, tolerating whitespace inserted by line wrapping.
fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let stripped: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(stripped.as_bytes())
        .map_err(|e| Error::decode_bare(format!("invalid base64: {}", e)))
}
