//! Operation layer: the user-facing verbs over a container file.
//!
//! Each verb is one state-machine step over `(Container, host_document)`:
//! parse, mutate, serialize. [`ContainerFile`] threads an explicit handle
//! through every call (no global state) and serializes access to one
//! container for the duration of the cycle.
//!
//! Batch verbs report per-item outcomes instead of raising on the first
//! entry-level failure; single-item semantics propagate errors unchanged.

pub mod changelog;
mod container_file;
mod exclude;
mod export;
mod import;
mod limits;
mod list;
mod metadata_ops;

pub use changelog::{ChangelogEntry, ChangelogFormat, ChangelogTracker, OperationKind};
pub use container_file::ContainerFile;
pub use exclude::{ExcludeResult, exclude_entries};
pub use export::{
    DirectorySink, ExportOptions, ExportOutcome, ExportResult, ExportSelector, ExportSink,
    ExportStatus, MemorySink, export_from,
};
pub use import::{
    ImportOptions, ImportOutcome, ImportResult, ImportSource, ImportStatus, import_into,
};
pub use limits::ResourceLimits;
pub use list::{EntryInfo, ListFilter, list_entries, render_report};
pub use metadata_ops::{
    MetadataResult, clean_metadata, clear_metadata, remove_metadata, update_metadata,
};
