//! On-disk container handle: the operation-layer entry point.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::document::{self, ParsedDocument};
use crate::{Error, Result};

use super::changelog::{ChangelogFormat, ChangelogTracker, OperationKind};
use super::exclude::{ExcludeResult, exclude_entries};
use super::export::{ExportOptions, ExportResult, ExportSelector, ExportSink, export_from};
use super::import::{ImportOptions, ImportResult, ImportSource, ImportStatus, import_into};
use super::list::{EntryInfo, ListFilter, list_entries};
use super::metadata_ops::{
    MetadataResult, clean_metadata, clear_metadata, remove_metadata, update_metadata,
};

/// A handle to one container file on disk.
///
/// Every verb runs a full read-modify-write cycle (parse, mutate,
/// serialize) under the handle's mutual-exclusion scope, so a single
/// container is never mutated by two operations concurrently. Distinct
/// handles share no state; distinct files may be processed in parallel by
/// an external worker pool.
///
/// Writes are all-or-nothing: the new document is written to a sibling
/// temporary file and renamed over the target, so a failure at any earlier
/// step leaves the original file untouched.
///
/// # Example
///
/// ```rust,no_run
/// use svgpack::ops::{ContainerFile, ImportOptions, ImportSource, ListFilter};
/// use svgpack::{EntryPath, Result};
///
/// fn add_readme(svg: &str) -> Result<()> {
///     let file = ContainerFile::open(svg)?;
///     let sources = vec![ImportSource::from_bytes(
///         "docs",
///         EntryPath::new("README.md")?,
///         b"# hello".to_vec(),
///     )];
///     let result = file.import(&sources, &ImportOptions::default())?;
///     println!("added {} entries", result.added());
///     for info in file.list(&ListFilter::all())? {
///         println!("{} ({} bytes)", info.path, info.raw_size);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ContainerFile {
    path: PathBuf,
    state: Mutex<ChangelogTracker>,
}

impl ContainerFile {
    /// Opens an existing host document.
    ///
    /// The document is not parsed here; each verb parses fresh so that
    /// external edits between calls are picked up.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::metadata(&path)?;
        Ok(Self {
            path,
            state: Mutex::new(ChangelogTracker::new()),
        })
    }

    /// Creates a new host document from the default SVG template and opens
    /// it.
    ///
    /// # Errors
    ///
    /// Fails with an I/O error if the file already exists.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("'{}' already exists", path.display()),
            )));
        }
        fs::write(&path, document::DEFAULT_HOST)?;
        log::debug!("created host document '{}'", path.display());
        Self::open(path)
    }

    /// Returns the file path this handle operates on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ChangelogTracker> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_document(&self) -> Result<ParsedDocument> {
        let text = fs::read_to_string(&self.path)?;
        document::parse(&text)
    }

    /// Serializes and atomically replaces the host document.
    fn persist(&self, parsed: &ParsedDocument) -> Result<()> {
        let output = document::serialize(&parsed.container, &parsed.passthrough)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "container".to_string());
        let tmp = self.path.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&tmp, &output)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("persisted '{}' ({} bytes)", self.path.display(), output.len());
        Ok(())
    }

    /// Adds entries from external sources. See
    /// [`import_into`](super::import_into) for batch semantics.
    pub fn import(
        &self,
        sources: &[ImportSource],
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let mut tracker = self.lock();
        let mut parsed = self.read_document()?;
        let before = parsed.container.paths();

        let result = import_into(&mut parsed.container, sources, options)?;
        if result.changed() {
            self.persist(&parsed)?;
        }

        let touched: BTreeSet<String> = result
            .outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    ImportStatus::Added | ImportStatus::Overwritten
                )
            })
            .map(|o| o.path.clone())
            .collect();
        tracker.record_diff(
            OperationKind::Import,
            &before,
            &parsed.container.paths(),
            &touched,
        );
        Ok(result)
    }

    /// Decodes matching entries into the sink; optionally removes them
    /// afterwards. See [`export_from`](super::export_from).
    pub fn export(
        &self,
        selector: &ExportSelector,
        sink: &mut dyn ExportSink,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let mut tracker = self.lock();
        let mut parsed = self.read_document()?;
        let before = parsed.container.paths();

        let result = export_from(&mut parsed.container, selector, sink, options)?;
        if result.removed() > 0 {
            self.persist(&parsed)?;
        }

        let touched: BTreeSet<String> = result
            .outcomes
            .iter()
            .filter(|o| matches!(o.status, super::ExportStatus::Exported { .. }))
            .map(|o| o.path.clone())
            .collect();
        tracker.record_diff(
            OperationKind::Export,
            &before,
            &parsed.container.paths(),
            &touched,
        );
        Ok(result)
    }

    /// Read-only projection of the entries.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<EntryInfo>> {
        let _tracker = self.lock();
        let parsed = self.read_document()?;
        Ok(list_entries(&parsed.container, filter))
    }

    /// Removes entries by name without persisting their bytes anywhere.
    pub fn exclude(&self, names: &[String]) -> Result<ExcludeResult> {
        let mut tracker = self.lock();
        let mut parsed = self.read_document()?;
        let before = parsed.container.paths();

        let result = exclude_entries(&mut parsed.container, names)?;
        self.persist(&parsed)?;

        tracker.record_diff(
            OperationKind::Exclude,
            &before,
            &parsed.container.paths(),
            &BTreeSet::new(),
        );
        Ok(result)
    }

    /// Merges caller-supplied metadata values.
    pub fn update_metadata(&self, updates: Map<String, Value>) -> Result<MetadataResult> {
        self.metadata_op(|c| update_metadata(c, updates))
    }

    /// Deletes metadata keys.
    pub fn remove_metadata(&self, keys: &[String]) -> Result<MetadataResult> {
        self.metadata_op(|c| remove_metadata(c, keys))
    }

    /// Reduces metadata to the essential subset.
    pub fn clean_metadata(&self) -> Result<MetadataResult> {
        self.metadata_op(clean_metadata)
    }

    /// Empties the caller-visible metadata.
    pub fn clear_metadata(&self) -> Result<MetadataResult> {
        self.metadata_op(clear_metadata)
    }

    fn metadata_op(
        &self,
        op: impl FnOnce(&mut crate::Container) -> MetadataResult,
    ) -> Result<MetadataResult> {
        let mut tracker = self.lock();
        let mut parsed = self.read_document()?;

        let result = op(&mut parsed.container);
        self.persist(&parsed)?;

        tracker.record(
            OperationKind::MetadataUpdate,
            BTreeSet::new(),
            format!("metadata-update: {} keys changed", result.changed_keys.len()),
        );
        Ok(result)
    }

    /// Returns a snapshot of the metadata mapping.
    pub fn metadata_snapshot(&self) -> Result<Map<String, Value>> {
        let _tracker = self.lock();
        let parsed = self.read_document()?;
        Ok(parsed.container.metadata.as_map().clone())
    }

    /// Starts recording operations into the changelog.
    pub fn start_tracking(&self) {
        self.lock().start_tracking();
    }

    /// Stops recording operations.
    pub fn stop_tracking(&self) {
        self.lock().stop_tracking();
    }

    /// Returns whether operations are being recorded.
    pub fn is_tracking(&self) -> bool {
        self.lock().is_tracking()
    }

    /// Renders the accumulated changelog.
    pub fn generate_changelog(&self, format: ChangelogFormat) -> Result<String> {
        self.lock().generate(format)
    }

    /// Serializes the accumulated changelog into the container metadata.
    pub fn persist_changelog(&self) -> Result<()> {
        let tracker = self.lock();
        let mut parsed = self.read_document()?;
        tracker.persist(&mut parsed.container)?;
        self.persist(&parsed)
    }

    /// Restores previously persisted changelog entries into this handle's
    /// tracker (tracking stays off).
    pub fn restore_changelog(&self) -> Result<usize> {
        let mut tracker = self.lock();
        let parsed = self.read_document()?;
        let restored = ChangelogTracker::restore(&parsed.container)?;
        let count = restored.entries().len();
        *tracker = restored;
        Ok(count)
    }
}
