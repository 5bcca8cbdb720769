//! Media type inference from file extensions.
//!
//! The container stores a declared MIME type per entry. When the caller does
//! not supply one, it is inferred from the logical path's extension and
//! falls back to `application/octet-stream`. The declared type also drives
//! the payload encoding policy: textual types may be stored verbatim instead
//! of base64.

use crate::EntryPath;

/// The fallback media type for unknown extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension to MIME type table.
///
/// Covers the types commonly embedded in SVG bundles: text and source files,
/// images, fonts, documents, archives, and audio/video. Lookup is
/// case-insensitive on the extension.
const MEDIA_TYPES: &[(&str, &str)] = &[
    // Text and data
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("toml", "text/plain"),
    ("py", "text/x-python"),
    ("rs", "text/x-rust"),
    ("c", "text/x-c"),
    ("h", "text/x-c"),
    ("sh", "text/x-shellscript"),
    ("log", "text/plain"),
    // Images
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    // Fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    // Documents
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("odt", "application/vnd.oasis.opendocument.text"),
    // Archives
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("7z", "application/x-7z-compressed"),
    // Audio / video
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
];

/// Media types that are textual without a `text/` prefix.
const TEXTUAL_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/yaml",
    "image/svg+xml",
];

/// Infers the media type for a logical path from its extension.
///
/// Returns [`OCTET_STREAM`] when the extension is missing or unknown.
///
/// # Example
///
/// ```
/// use svgpack::{media_type, EntryPath};
///
/// let path = EntryPath::new("assets/logo.png").unwrap();
/// assert_eq!(media_type::infer(&path), "image/png");
///
/// let path = EntryPath::new("mystery.blob").unwrap();
/// assert_eq!(media_type::infer(&path), "application/octet-stream");
/// ```
pub fn infer(path: &EntryPath) -> &'static str {
    let Some(extension) = path.extension() else {
        return OCTET_STREAM;
    };
    let extension = extension.to_ascii_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(OCTET_STREAM)
}

/// Returns `true` if the media type declares textual content.
///
/// Textual entries may be stored verbatim (XML-escaped) instead of base64,
/// provided their bytes are valid UTF-8.
pub fn is_textual(media_type: &str) -> bool {
    media_type.starts_with("text/") || TEXTUAL_TYPES.contains(&media_type)
}

/// Returns the coarse class of a media type (`"text"`, `"image"`, ...).
///
/// Used by the listing filter: `list --type image` matches every entry whose
/// declared type starts with `image/`.
pub fn class_of(media_type: &str) -> &str {
    media_type.split('/').next().unwrap_or(media_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer_str(path: &str) -> &'static str {
        infer(&EntryPath::new(path).unwrap())
    }

    #[test]
    fn test_infer_common_types() {
        assert_eq!(infer_str("readme.md"), "text/markdown");
        assert_eq!(infer_str("data.json"), "application/json");
        assert_eq!(infer_str("src/main.py"), "text/x-python");
        assert_eq!(infer_str("logo.png"), "image/png");
        assert_eq!(infer_str("font.woff2"), "font/woff2");
        assert_eq!(infer_str("doc.pdf"), "application/pdf");
    }

    #[test]
    fn test_infer_is_case_insensitive() {
        assert_eq!(infer_str("PHOTO.JPG"), "image/jpeg");
    }

    #[test]
    fn test_infer_unknown_falls_back() {
        assert_eq!(infer_str("mystery.blob"), OCTET_STREAM);
        assert_eq!(infer_str("no_extension"), OCTET_STREAM);
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual("text/plain"));
        assert!(is_textual("text/x-python"));
        assert!(is_textual("application/json"));
        assert!(is_textual("image/svg+xml"));
        assert!(!is_textual("image/png"));
        assert!(!is_textual(OCTET_STREAM));
    }

    #[test]
    fn test_class_of() {
        assert_eq!(class_of("image/png"), "image");
        assert_eq!(class_of("text/plain"), "text");
        assert_eq!(class_of("weird"), "weird");
    }
}
