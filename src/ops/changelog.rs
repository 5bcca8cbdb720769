//! Changelog: append-only record of operations against a container.
//!
//! Tracking is process-local. The tracker starts inert; after
//! [`ChangelogTracker::start_tracking`], every successful operation-layer
//! call appends one [`ChangelogEntry`] derived from the diff between the
//! pre- and post-operation entry sets. The log persists only when
//! explicitly serialized into the container metadata.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::{Error, Result};

/// Operation kinds recorded in the changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Entries were added.
    Import,
    /// Entries were decoded and handed to a sink.
    Export,
    /// Entries were removed without persisting their bytes.
    Exclude,
    /// The metadata mapping changed.
    MetadataUpdate,
}

impl OperationKind {
    /// Returns the kebab-case name used in rendered changelogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Export => "export",
            Self::Exclude => "exclude",
            Self::MetadataUpdate => "metadata-update",
        }
    }
}

/// One recorded operation. Appended only, never mutated or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// When the operation completed.
    pub timestamp: DateTime<Utc>,
    /// What kind of operation ran.
    pub operation: OperationKind,
    /// The logical paths the operation touched.
    pub affected_paths: BTreeSet<String>,
    /// Human-readable description derived from the entry-set diff.
    pub summary: String,
}

/// Output format for [`ChangelogTracker::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangelogFormat {
    /// Markdown list grouped by operation.
    Markdown,
    /// JSON array of entries.
    Json,
    /// XML document.
    Xml,
}

impl ChangelogFormat {
    /// Parses a format name (`markdown`, `json`, `xml`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "markdown" | "md" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

/// Accumulates changelog entries while tracking is on.
#[derive(Debug, Clone, Default)]
pub struct ChangelogTracker {
    tracking: bool,
    entries: Vec<ChangelogEntry>,
}

/// The metadata key the changelog persists under (a protected key).
const CHANGELOG_KEY: &str = "changelog";

impl ChangelogTracker {
    /// Creates an inert tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts recording operations.
    pub fn start_tracking(&mut self) {
        self.tracking = true;
    }

    /// Stops recording; accumulated entries are kept.
    pub fn stop_tracking(&mut self) {
        self.tracking = false;
    }

    /// Returns whether operations are being recorded.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Returns the recorded entries in chronological order.
    pub fn entries(&self) -> &[ChangelogEntry] {
        &self.entries
    }

    /// Records one successful operation. No-op while not tracking.
    pub fn record(
        &mut self,
        operation: OperationKind,
        affected_paths: BTreeSet<String>,
        summary: String,
    ) {
        if !self.tracking {
            return;
        }
        self.entries.push(ChangelogEntry {
            timestamp: Utc::now(),
            operation,
            affected_paths,
            summary,
        });
    }

    /// Records an operation from before/after entry-set snapshots.
    ///
    /// The summary names how many paths were added and removed; an
    /// operation that touched paths without changing the set (an export
    /// without removal, a metadata update) lists the paths it touched.
    pub fn record_diff(
        &mut self,
        operation: OperationKind,
        before: &BTreeSet<String>,
        after: &BTreeSet<String>,
        touched: &BTreeSet<String>,
    ) {
        if !self.tracking {
            return;
        }
        let added: BTreeSet<_> = after.difference(before).cloned().collect();
        let removed: BTreeSet<_> = before.difference(after).cloned().collect();

        let mut affected: BTreeSet<String> = added.union(&removed).cloned().collect();
        affected.extend(touched.iter().cloned());

        let summary = match (added.len(), removed.len()) {
            (0, 0) => format!("{}: {} paths touched", operation.as_str(), touched.len()),
            (a, 0) => format!("{}: {} entries added", operation.as_str(), a),
            (0, r) => format!("{}: {} entries removed", operation.as_str(), r),
            (a, r) => format!(
                "{}: {} entries added, {} removed",
                operation.as_str(),
                a,
                r
            ),
        };
        self.record(operation, affected, summary);
    }

    /// Renders the accumulated entries. Never mutates the log.
    pub fn generate(&self, format: ChangelogFormat) -> Result<String> {
        match format {
            ChangelogFormat::Markdown => Ok(self.render_markdown()),
            ChangelogFormat::Json => serde_json::to_string_pretty(&self.entries)
                .map_err(|e| Error::InvalidHostFormat(format!("cannot render changelog: {}", e))),
            ChangelogFormat::Xml => Ok(self.render_xml()),
        }
    }

    fn render_markdown(&self) -> String {
        let mut out = String::from("# Changelog\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "\n## {} — {}\n\n{}\n",
                entry.timestamp.to_rfc3339(),
                entry.operation.as_str(),
                entry.summary
            ));
            for path in &entry.affected_paths {
                out.push_str(&format!("- `{}`\n", path));
            }
        }
        out
    }

    fn render_xml(&self) -> String {
        use quick_xml::escape::escape;
        let mut out = String::from("<changelog>\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "  <operation kind=\"{}\" timestamp=\"{}\">\n",
                entry.operation.as_str(),
                entry.timestamp.to_rfc3339()
            ));
            out.push_str(&format!(
                "    <summary>{}</summary>\n",
                escape(&entry.summary)
            ));
            for path in &entry.affected_paths {
                out.push_str(&format!("    <path>{}</path>\n", escape(path)));
            }
            out.push_str("  </operation>\n");
        }
        out.push_str("</changelog>\n");
        out
    }

    /// Serializes the log into the container metadata (protected key).
    pub fn persist(&self, container: &mut Container) -> Result<()> {
        let value = serde_json::to_value(&self.entries)
            .map_err(|e| Error::InvalidHostFormat(format!("cannot persist changelog: {}", e)))?;
        container.metadata.set_maintained(CHANGELOG_KEY, value);
        Ok(())
    }

    /// Restores a tracker from the container metadata.
    ///
    /// Returns an inert tracker (tracking off) holding any persisted
    /// entries; the metadata is left untouched.
    pub fn restore(container: &Container) -> Result<Self> {
        let entries = match container.metadata.get(CHANGELOG_KEY) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                Error::InvalidHostFormat(format!("persisted changelog is malformed: {}", e))
            })?,
            None => Vec::new(),
        };
        Ok(Self {
            tracking: false,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_not_tracking_records_nothing() {
        let mut tracker = ChangelogTracker::new();
        tracker.record(OperationKind::Import, paths(&["a"]), "x".into());
        assert!(tracker.entries().is_empty());
    }

    #[test]
    fn test_record_diff_addition() {
        let mut tracker = ChangelogTracker::new();
        tracker.start_tracking();
        tracker.record_diff(
            OperationKind::Import,
            &paths(&[]),
            &paths(&["a.txt", "b.txt"]),
            &BTreeSet::new(),
        );
        let entries = tracker.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, OperationKind::Import);
        assert_eq!(entries[0].affected_paths, paths(&["a.txt", "b.txt"]));
        assert!(entries[0].summary.contains("2 entries added"));
    }

    #[test]
    fn test_record_diff_removal_and_touch() {
        let mut tracker = ChangelogTracker::new();
        tracker.start_tracking();
        tracker.record_diff(
            OperationKind::Exclude,
            &paths(&["a", "b"]),
            &paths(&["a"]),
            &BTreeSet::new(),
        );
        tracker.record_diff(
            OperationKind::MetadataUpdate,
            &paths(&["a"]),
            &paths(&["a"]),
            &paths(&[]),
        );
        assert_eq!(tracker.entries().len(), 2);
        assert!(tracker.entries()[0].summary.contains("1 entries removed"));
        assert!(tracker.entries()[1].summary.contains("0 paths touched"));
    }

    #[test]
    fn test_generate_markdown_chronological() {
        let mut tracker = ChangelogTracker::new();
        tracker.start_tracking();
        tracker.record(OperationKind::Import, paths(&["a"]), "first".into());
        tracker.record(OperationKind::MetadataUpdate, paths(&[]), "second".into());

        let md = tracker.generate(ChangelogFormat::Markdown).unwrap();
        let first = md.find("import").unwrap();
        let second = md.find("metadata-update").unwrap();
        assert!(first < second);
        assert_eq!(md.matches("## ").count(), 2);
    }

    #[test]
    fn test_generate_json_roundtrip() {
        let mut tracker = ChangelogTracker::new();
        tracker.start_tracking();
        tracker.record(OperationKind::Export, paths(&["x"]), "exported".into());

        let json = tracker.generate(ChangelogFormat::Json).unwrap();
        let parsed: Vec<ChangelogEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tracker.entries());
    }

    #[test]
    fn test_generate_xml_escapes() {
        let mut tracker = ChangelogTracker::new();
        tracker.start_tracking();
        tracker.record(OperationKind::Import, paths(&[]), "a <b> & c".into());
        let xml = tracker.generate(ChangelogFormat::Xml).unwrap();
        assert!(xml.contains("a &lt;b&gt; &amp; c"));
        assert!(xml.contains("<changelog>"));
    }

    #[test]
    fn test_generate_does_not_mutate() {
        let mut tracker = ChangelogTracker::new();
        tracker.start_tracking();
        tracker.record(OperationKind::Import, paths(&["a"]), "x".into());
        let before = tracker.entries().to_vec();
        let _ = tracker.generate(ChangelogFormat::Markdown).unwrap();
        let _ = tracker.generate(ChangelogFormat::Json).unwrap();
        assert_eq!(tracker.entries(), before.as_slice());
    }

    #[test]
    fn test_persist_and_restore() {
        let mut tracker = ChangelogTracker::new();
        tracker.start_tracking();
        tracker.record(OperationKind::Import, paths(&["a"]), "added".into());

        let mut container = Container::new();
        tracker.persist(&mut container).unwrap();

        let restored = ChangelogTracker::restore(&container).unwrap();
        assert!(!restored.is_tracking());
        assert_eq!(restored.entries(), tracker.entries());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(
            ChangelogFormat::parse("markdown"),
            Some(ChangelogFormat::Markdown)
        );
        assert_eq!(ChangelogFormat::parse("json"), Some(ChangelogFormat::Json));
        assert_eq!(ChangelogFormat::parse("xml"), Some(ChangelogFormat::Xml));
        assert_eq!(ChangelogFormat::parse("yaml"), None);
    }
}
