//! Resource limits guarding batch imports.

use crate::{Error, Result};

/// Caller-supplied size and count guards.
///
/// Limits are checked before any bytes are committed to the container, so a
/// tripped guard fails fast with [`Error::LimitExceeded`] and leaves the
/// host document untouched.
///
/// # Example
///
/// ```rust
/// use svgpack::ops::ResourceLimits;
///
/// let limits = ResourceLimits::default()
///     .max_file_size(10 * 1024 * 1024)
///     .max_entries(1000);
/// assert!(limits.check_file("big.iso", 64 * 1024 * 1024).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceLimits {
    /// Maximum raw size of a single imported file.
    pub max_file_size: Option<u64>,
    /// Maximum combined raw size of one import batch.
    pub max_total_size: Option<u64>,
    /// Maximum number of entries a container may hold.
    pub max_entries: Option<usize>,
}

impl ResourceLimits {
    /// Creates unlimited limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the single-file size limit.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Sets the batch total size limit.
    pub fn max_total_size(mut self, bytes: u64) -> Self {
        self.max_total_size = Some(bytes);
        self
    }

    /// Sets the entry count limit.
    pub fn max_entries(mut self, count: usize) -> Self {
        self.max_entries = Some(count);
        self
    }

    /// Checks one file's raw size.
    pub fn check_file(&self, path: &str, size: u64) -> Result<()> {
        if let Some(limit) = self.max_file_size {
            if size > limit {
                return Err(Error::LimitExceeded(format!(
                    "file '{}' is {} bytes, exceeding max_file_size of {}",
                    path, size, limit
                )));
            }
        }
        Ok(())
    }

    /// Checks the batch's combined raw size.
    pub fn check_total(&self, total: u64) -> Result<()> {
        if let Some(limit) = self.max_total_size {
            if total > limit {
                return Err(Error::LimitExceeded(format!(
                    "batch totals {} bytes, exceeding max_total_size of {}",
                    total, limit
                )));
            }
        }
        Ok(())
    }

    /// Checks the prospective entry count.
    pub fn check_entries(&self, count: usize) -> Result<()> {
        if let Some(limit) = self.max_entries {
            if count > limit {
                return Err(Error::LimitExceeded(format!(
                    "container would hold {} entries, exceeding max_entries of {}",
                    count, limit
                )));
            }
        }
        Ok(())
    }
}
