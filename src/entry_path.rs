//! Logical entry path type with validation.

use crate::{Error, Result};
use std::fmt;

/// Maximum length for logical paths (in bytes).
///
/// This limit prevents denial-of-service through a hostile container that
/// declares extremely long paths. 32KB is well above any reasonable file
/// system path limit (Linux PATH_MAX is 4KB, Windows MAX_PATH is ~260).
const MAX_PATH_LENGTH: usize = 32768;

/// A validated logical path identifying one entry inside a container.
///
/// `EntryPath` uses forward slashes on every platform and validates that:
/// - No NUL bytes are present
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present (prevents path traversal on unpack)
///
/// Paths are case-sensitive and unique within a container.
///
/// # Examples
///
/// ```
/// use svgpack::EntryPath;
///
/// let path = EntryPath::new("src/main.py").unwrap();
/// assert_eq!(path.as_str(), "src/main.py");
///
/// assert!(EntryPath::new("../secret").is_err());
/// assert!(EntryPath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryPath(String);

impl EntryPath {
    /// Creates a new `EntryPath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryPath`] if the path:
    /// - Is empty
    /// - Contains NUL bytes
    /// - Is absolute (starts with `/`)
    /// - Contains empty segments (e.g., `a//b`) or a trailing slash
    /// - Contains `.` or `..` segments
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Validates a logical path string.
    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::InvalidEntryPath("empty path".into()));
        }
        if s.contains('\0') {
            return Err(Error::InvalidEntryPath("contains NUL byte".into()));
        }
        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidEntryPath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }
        if s.starts_with('/') {
            return Err(Error::InvalidEntryPath("absolute path not allowed".into()));
        }
        if s.ends_with('/') {
            return Err(Error::InvalidEntryPath("trailing slash not allowed".into()));
        }

        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidEntryPath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidEntryPath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidEntryPath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Builds an `EntryPath` from a filesystem path relative to `base`.
    ///
    /// Backslashes are normalized to forward slashes so that containers
    /// built on Windows unpack identically elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not inside `base` or the resulting
    /// logical path is invalid.
    pub fn from_fs_path(path: &std::path::Path, base: &std::path::Path) -> Result<Self> {
        let relative = path.strip_prefix(base).map_err(|_| {
            Error::InvalidEntryPath(format!("'{}' is not under the import root", path.display()))
        })?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                std::path::Component::Normal(part) => {
                    segments.push(part.to_string_lossy().replace('\\', "/"));
                }
                other => {
                    return Err(Error::InvalidEntryPath(format!(
                        "unsupported path component {:?}",
                        other
                    )));
                }
            }
        }
        Self::new(&segments.join("/"))
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins this path with another segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting path would be invalid.
    pub fn join(&self, other: &str) -> Result<Self> {
        let joined = format!("{}/{}", self.0, other);
        Self::new(&joined)
    }

    /// Prefixes this path with a top-level segment.
    ///
    /// Used by the nested and by-source merge strategies, which insert
    /// imported trees under a new top-level directory.
    pub fn prefixed(&self, prefix: &str) -> Result<Self> {
        let joined = format!("{}/{}", prefix, self.0);
        Self::new(&joined)
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the file extension, if any.
    ///
    /// The extension is the portion of the file name after the last `.`.
    /// Returns `None` if there is no extension, or if the file name starts
    /// with a dot (e.g., `.gitignore` has no extension).
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let dot_pos = file_name.rfind('.')?;
        if dot_pos == 0 || dot_pos == file_name.len() - 1 {
            None
        } else {
            Some(&file_name[dot_pos + 1..])
        }
    }

    /// Returns an iterator over the `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EntryPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
