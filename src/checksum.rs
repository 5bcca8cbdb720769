//! Checksum computation for entry integrity validation.
//!
//! Every entry stores the CRC-32 (IEEE 802.3 polynomial) of its raw bytes.
//! The checksum is computed at insertion time and re-verified whenever a
//! payload is decoded, so corruption introduced after embedding is caught
//! before any bytes reach an export sink.

/// CRC-32 checksum calculator.
///
/// # Example
///
/// ```rust
/// use svgpack::checksum::Crc32;
///
/// // Incremental computation
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, ");
/// crc.update(b"World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
///
/// // One-shot computation
/// assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
/// ```
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    /// Creates a new checksum calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the checksum with additional data.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finishes the checksum computation and returns the value.
    pub fn finalize(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Computes the checksum of a single slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

impl std::fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc32")
            .field("current", &self.finalize())
            .finish()
    }
}

/// Formats a CRC-32 value the way entry blocks store it: 8 lowercase hex digits.
pub fn format_crc32(value: u32) -> String {
    format!("{:08x}", value)
}

/// Parses a stored checksum attribute back into a CRC-32 value.
pub fn parse_crc32(text: &str) -> Option<u32> {
    if text.len() != 8 {
        return None;
    }
    u32::from_str_radix(text, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_known_value() {
        // Standard check value for "123456789"
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_incremental_matches_oneshot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut crc = Crc32::new();
        for chunk in data.chunks(7) {
            crc.update(chunk);
        }
        assert_eq!(crc.finalize(), Crc32::compute(data));
    }

    #[test]
    fn test_crc32_empty() {
        assert_eq!(Crc32::compute(b""), 0);
    }

    #[test]
    fn test_format_parse_roundtrip() {
        for value in [0u32, 1, 0xCBF43926, u32::MAX] {
            let text = format_crc32(value);
            assert_eq!(text.len(), 8);
            assert_eq!(parse_crc32(&text), Some(value));
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_crc32(""), None);
        assert_eq!(parse_crc32("abc"), None);
        assert_eq!(parse_crc32("zzzzzzzz"), None);
        assert_eq!(parse_crc32("0123456789"), None);
    }
}
