//! Export: decode entries and hand them to an external sink.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::container::Container;
use crate::{EntryPath, Error, Result};

/// Receives decoded entry bytes.
///
/// Sinks are external collaborators: a filesystem writer, an archive
/// builder, an upload adapter. A sink reporting failure for a path prevents
/// that path's removal under `remove_after`.
pub trait ExportSink {
    /// Writes one decoded entry.
    fn write_entry(&mut self, path: &EntryPath, bytes: &[u8]) -> io::Result<()>;
}

/// Sink writing entries under a destination directory, creating parent
/// directories as needed.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Creates a sink rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the destination for a logical path.
    pub fn destination(&self, path: &EntryPath) -> PathBuf {
        // EntryPath validation rejects absolute paths and `..` segments, so
        // joining cannot escape the root.
        let mut dest = self.root.clone();
        for segment in path.segments() {
            dest.push(segment);
        }
        dest
    }
}

impl ExportSink for DirectorySink {
    fn write_entry(&mut self, path: &EntryPath, bytes: &[u8]) -> io::Result<()> {
        let dest = self.destination(path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, bytes)
    }
}

/// Sink collecting entries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Collected `(path, bytes)` pairs in export order.
    pub files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes collected for `path`, if any.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.as_slice())
    }
}

impl ExportSink for MemorySink {
    fn write_entry(&mut self, path: &EntryPath, bytes: &[u8]) -> io::Result<()> {
        self.files.push((path.as_str().to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Which entries an export touches.
#[derive(Debug, Clone)]
pub enum ExportSelector {
    /// Every entry.
    All,
    /// An explicit set of logical paths. Missing paths are reported as
    /// per-entry failures.
    Paths(Vec<String>),
    /// Entries whose path matches a glob pattern.
    Pattern(String),
}

impl ExportSelector {
    /// Resolves the selector against the container, in entry order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidEntryPath`] when a glob pattern does not compile.
    fn resolve(&self, container: &Container) -> Result<Vec<SelectedPath>> {
        match self {
            Self::All => Ok(container
                .entries()
                .iter()
                .map(|e| SelectedPath::present(e.path.as_str()))
                .collect()),
            Self::Paths(paths) => Ok(paths
                .iter()
                .map(|p| {
                    if container.contains(p) {
                        SelectedPath::present(p)
                    } else {
                        SelectedPath::missing(p)
                    }
                })
                .collect()),
            Self::Pattern(pattern) => {
                let matcher = glob::Pattern::new(pattern).map_err(|e| {
                    Error::InvalidEntryPath(format!("bad glob pattern '{}': {}", pattern, e))
                })?;
                Ok(container
                    .entries()
                    .iter()
                    .filter(|e| matcher.matches(e.path.as_str()))
                    .map(|e| SelectedPath::present(e.path.as_str()))
                    .collect())
            }
        }
    }
}

struct SelectedPath {
    path: String,
    present: bool,
}

impl SelectedPath {
    fn present(path: &str) -> Self {
        Self {
            path: path.to_string(),
            present: true,
        }
    }

    fn missing(path: &str) -> Self {
        Self {
            path: path.to_string(),
            present: false,
        }
    }
}

/// Configuration for one export batch.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Remove each entry from the container after its sink write succeeds.
    ///
    /// Removal is all-or-nothing per entry: a sink failure for a path
    /// leaves that entry embedded.
    pub remove_after: bool,
    /// Propagate the first per-entry error instead of recording outcomes.
    pub strict: bool,
    /// Cooperative cancellation flag checked between entries.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Per-entry export outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// Decoded and written to the sink.
    Exported {
        /// Whether the entry was removed from the container afterwards.
        removed: bool,
    },
    /// Decode or sink failure; the entry stays embedded.
    Failed {
        /// Why the entry was not exported.
        reason: String,
    },
}

/// One entry's outcome in an export batch.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// The logical path.
    pub path: String,
    /// What happened.
    pub status: ExportStatus,
}

/// The manifest of an export batch.
#[derive(Debug, Clone, Default)]
#[must_use = "export outcomes report per-entry failures"]
pub struct ExportResult {
    /// Per-entry outcomes, in entry order.
    pub outcomes: Vec<ExportOutcome>,
    /// Whether the batch stopped early on a cancellation signal.
    pub cancelled: bool,
}

impl ExportResult {
    /// Number of entries successfully exported.
    pub fn exported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ExportStatus::Exported { .. }))
            .count()
    }

    /// Number of entries removed from the container.
    pub fn removed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ExportStatus::Exported { removed: true }))
            .count()
    }

    /// Number of per-entry failures.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ExportStatus::Failed { .. }))
            .count()
    }
}

/// Decodes matching entries and hands them to the sink.
///
/// Corrupt entries fail individually without stopping the batch (unless
/// `strict`); see [`ExportStatus`]. With `remove_after`, each entry is
/// removed only after its sink write succeeded.
///
/// # Errors
///
/// - [`Error::InvalidEntryPath`] for an uncompilable glob pattern
/// - the first per-entry error, when `strict` is set
pub fn export_from(
    container: &mut Container,
    selector: &ExportSelector,
    sink: &mut dyn ExportSink,
    options: &ExportOptions,
) -> Result<ExportResult> {
    let selected = selector.resolve(container)?;
    let mut result = ExportResult::default();

    for item in selected {
        if let Some(cancel) = &options.cancel {
            if cancel.load(Ordering::Relaxed) {
                log::warn!("export cancelled after {} outcomes", result.outcomes.len());
                result.cancelled = true;
                break;
            }
        }

        let status = match export_one(container, &item, sink, options) {
            Ok(status) => status,
            Err(e) if options.strict => return Err(e),
            Err(e) => ExportStatus::Failed {
                reason: e.to_string(),
            },
        };
        result.outcomes.push(ExportOutcome {
            path: item.path,
            status,
        });
    }

    Ok(result)
}

fn export_one(
    container: &mut Container,
    item: &SelectedPath,
    sink: &mut dyn ExportSink,
    options: &ExportOptions,
) -> Result<ExportStatus> {
    if !item.present {
        return Err(Error::EntryNotFound {
            path: item.path.clone(),
        });
    }
    let entry = container
        .get(&item.path)
        .ok_or_else(|| Error::EntryNotFound {
            path: item.path.clone(),
        })?;

    let bytes = entry.decode()?;
    let path = entry.path.clone();
    sink.write_entry(&path, &bytes).map_err(Error::Io)?;

    // Removal strictly follows a successful sink write
    let removed = if options.remove_after {
        container.remove_entry(path.as_str())?;
        true
    } else {
        false
    };
    Ok(ExportStatus::Exported { removed })
}
