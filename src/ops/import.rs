//! Import: add entries to a container from external sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::codec::EncodePolicy;
use crate::container::{AddOptions, Container};
use crate::tree::{MergeItem, MergeStrategy, plan_merge};
use crate::{EntryPath, Error, Result};

use super::limits::ResourceLimits;

/// One file handed to the importer by an external collaborator (file
/// reader, URL fetcher, archive unpacker).
#[derive(Debug, Clone)]
pub struct ImportSource {
    /// Label of the originating source (directory name, archive stem).
    /// Used as the top-level segment by the nested and by-source merge
    /// strategies.
    pub origin: String,
    /// Path relative to the source root.
    pub relative: EntryPath,
    /// The raw bytes.
    pub bytes: Vec<u8>,
    /// Explicit media type; inferred from the extension when `None`.
    pub media_type: Option<String>,
}

impl ImportSource {
    /// Creates a source from raw bytes with an inferred media type.
    pub fn from_bytes(origin: &str, relative: EntryPath, bytes: Vec<u8>) -> Self {
        Self {
            origin: origin.to_string(),
            relative,
            bytes,
            media_type: None,
        }
    }
}

/// Configuration for one import batch.
///
/// Every field has a documented default; construct with struct update
/// syntax from [`ImportOptions::default`].
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Replace existing entries instead of reporting duplicates.
    pub overwrite: bool,
    /// Persist the directory tree alongside the flat mapping.
    pub preserve_structure: bool,
    /// How imported paths merge with the existing entry set.
    pub strategy: MergeStrategy,
    /// Abort the whole batch on the first per-entry failure instead of
    /// recording a `Failed` outcome. Defaults to `false`; when set, the
    /// failure propagates before anything is persisted, so the host
    /// document is left untouched.
    pub abort_on_error: bool,
    /// Size and count guards, checked before any mutation.
    pub limits: ResourceLimits,
    /// Payload encoding policy.
    pub policy: EncodePolicy,
    /// Cooperative cancellation flag checked between entries.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Per-file outcome status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    /// The entry was added.
    Added,
    /// An identical entry (same path, same content) already existed.
    SkippedDuplicate,
    /// An existing entry was replaced (overwrite requested).
    Overwritten,
    /// The entry was not added.
    Failed {
        /// Why the entry was rejected.
        reason: String,
    },
}

/// One file's outcome in an import batch.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// The target logical path.
    pub path: String,
    /// What happened.
    pub status: ImportStatus,
}

/// The manifest of an import batch.
#[derive(Debug, Clone, Default)]
#[must_use = "import outcomes report per-file failures"]
pub struct ImportResult {
    /// Per-file outcomes, in dispatch order.
    pub outcomes: Vec<ImportOutcome>,
    /// Whether the batch stopped early on a cancellation signal.
    pub cancelled: bool,
}

impl ImportResult {
    /// Number of entries added.
    pub fn added(&self) -> usize {
        self.count(|s| matches!(s, ImportStatus::Added))
    }

    /// Number of identical duplicates skipped.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ImportStatus::SkippedDuplicate))
    }

    /// Number of entries overwritten.
    pub fn overwritten(&self) -> usize {
        self.count(|s| matches!(s, ImportStatus::Overwritten))
    }

    /// Number of per-file failures.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ImportStatus::Failed { .. }))
    }

    /// Whether the container was mutated at all.
    pub fn changed(&self) -> bool {
        self.added() + self.overwritten() > 0
    }

    fn count(&self, pred: impl Fn(&ImportStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Adds a batch of sources to the container.
///
/// Limits are validated up front, then the merge plan maps each source to
/// its target path, then entries are added one by one. Per-entry failures
/// become [`ImportStatus::Failed`] outcomes unless `abort_on_error` is set,
/// in which case the first failure propagates and the caller must discard
/// the container state (the operation layer re-parses instead of
/// persisting).
///
/// # Errors
///
/// - [`Error::LimitExceeded`] when a guard trips (before any mutation)
/// - [`Error::StructureConflict`] when the merge plan would silently shadow
///   a file under the flat strategy
/// - any per-entry error, when `abort_on_error` is set
pub fn import_into(
    container: &mut Container,
    sources: &[ImportSource],
    options: &ImportOptions,
) -> Result<ImportResult> {
    // Fail-fast guards: nothing below may mutate until these pass.
    let mut total: u64 = 0;
    for source in sources {
        let size = source.bytes.len() as u64;
        options
            .limits
            .check_file(source.relative.as_str(), size)?;
        total += size;
    }
    options.limits.check_total(total)?;
    options.limits.check_entries(container.len() + sources.len())?;

    let items: Vec<MergeItem> = sources
        .iter()
        .map(|s| MergeItem {
            source: s.origin.clone(),
            relative: s.relative.clone(),
        })
        .collect();
    let targets = plan_merge(&container.paths(), &items, options.strategy, options.overwrite)?;

    let mut result = ImportResult::default();
    for (source, target) in sources.iter().zip(targets) {
        if let Some(cancel) = &options.cancel {
            if cancel.load(Ordering::Relaxed) {
                log::warn!("import cancelled after {} outcomes", result.outcomes.len());
                result.cancelled = true;
                break;
            }
        }

        let status = match add_one(container, source, target.clone(), options) {
            Ok(status) => status,
            Err(e) if options.abort_on_error => return Err(e),
            Err(e) => ImportStatus::Failed {
                reason: e.to_string(),
            },
        };
        result.outcomes.push(ImportOutcome {
            path: target.as_str().to_string(),
            status,
        });
    }

    if options.preserve_structure && result.changed() {
        container.set_structure_preserved(true);
    }

    Ok(result)
}

fn add_one(
    container: &mut Container,
    source: &ImportSource,
    target: EntryPath,
    options: &ImportOptions,
) -> Result<ImportStatus> {
    let add = AddOptions {
        overwrite: options.overwrite,
        media_type: source.media_type.clone(),
        policy: options.policy.clone(),
    };
    match container.add_entry(target.clone(), &source.bytes, &add) {
        Ok(Some(_previous)) => Ok(ImportStatus::Overwritten),
        Ok(None) => Ok(ImportStatus::Added),
        Err(Error::DuplicatePath { path }) => {
            // Dedup-aware: identical content is a skip, not a failure
            let same = container
                .get(target.as_str())
                .is_some_and(|e| e.has_same_content(&source.bytes));
            if same {
                Ok(ImportStatus::SkippedDuplicate)
            } else {
                Err(Error::DuplicatePath { path })
            }
        }
        Err(e) => Err(e),
    }
}
