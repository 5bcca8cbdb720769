//! Container metadata record.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// The `generator` value written into new containers.
pub const GENERATOR: &str = "svgpack";

/// Keys maintained by the library and silently dropped from caller input.
///
/// `files_count` and `last_modified` are derived state recomputed on every
/// mutation; `structure` and `changelog` are serialized subsystem state. A
/// caller-supplied value for any of these would desynchronize the container,
/// so metadata updates ignore them (with a debug log) and the next recompute
/// restores the true values.
pub const PROTECTED_KEYS: &[&str] = &["files_count", "last_modified", "structure", "changelog"];

/// The subset kept by [`Metadata::clean`].
pub const ESSENTIAL_KEYS: &[&str] = &["title", "description", "creator"];

/// Open string-to-JSON mapping describing a container.
///
/// Always holds at least `generator`, `version`, `files_count`, and
/// `last_modified`. Keys are stored sorted, so serialization is
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    values: Map<String, Value>,
}

impl Metadata {
    /// Creates the metadata record for a fresh, empty container.
    pub fn new() -> Self {
        let mut values = Map::new();
        values.insert("generator".into(), Value::String(GENERATOR.into()));
        values.insert(
            "version".into(),
            Value::String(env!("CARGO_PKG_VERSION").into()),
        );
        values.insert("files_count".into(), Value::from(0u64));
        values.insert(
            "last_modified".into(),
            Value::String(Utc::now().to_rfc3339()),
        );
        Self { values }
    }

    /// Restores a metadata record parsed from a manifest block.
    pub(crate) fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Returns the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the stored entry count.
    pub fn files_count(&self) -> u64 {
        self.values
            .get("files_count")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Returns the last-modified timestamp, if parseable.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.values
            .get("last_modified")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Merges caller-supplied values into the mapping.
    ///
    /// Protected keys are dropped, not rejected: the operation succeeds and
    /// the derived values win on the next recompute. Returns the keys that
    /// were actually written.
    pub fn update(&mut self, updates: Map<String, Value>) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, value) in updates {
            if PROTECTED_KEYS.contains(&key.as_str()) {
                log::debug!("ignoring protected metadata key '{}'", key);
                continue;
            }
            self.values.insert(key.clone(), value);
            changed.push(key);
        }
        changed
    }

    /// Removes the given keys. Protected keys are skipped.
    ///
    /// Returns the keys that were actually removed.
    pub fn remove(&mut self, keys: &[String]) -> Vec<String> {
        let mut removed = Vec::new();
        for key in keys {
            if PROTECTED_KEYS.contains(&key.as_str()) {
                log::debug!("ignoring protected metadata key '{}'", key);
                continue;
            }
            if self.values.remove(key).is_some() {
                removed.push(key.clone());
            }
        }
        removed
    }

    /// Reduces the mapping to the essential subset plus maintained keys.
    ///
    /// Keeps `title`, `description`, `creator` (when present) and the
    /// library-maintained keys; everything else is dropped. Returns the
    /// dropped keys.
    pub fn clean(&mut self) -> Vec<String> {
        self.retain_keys(|key| {
            ESSENTIAL_KEYS.contains(&key)
                || PROTECTED_KEYS.contains(&key)
                || key == "generator"
                || key == "version"
        })
    }

    /// Empties the caller-visible mapping, keeping only maintained keys.
    ///
    /// Returns the dropped keys.
    pub fn clear(&mut self) -> Vec<String> {
        self.retain_keys(|key| {
            PROTECTED_KEYS.contains(&key) || key == "generator" || key == "version"
        })
    }

    fn retain_keys(&mut self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        let dropped: Vec<String> = self
            .values
            .keys()
            .filter(|k| !keep(k))
            .cloned()
            .collect();
        for key in &dropped {
            self.values.remove(key);
        }
        dropped
    }

    /// Recomputes derived state after a mutation.
    ///
    /// Sets `files_count` and stamps `last_modified`; called by the
    /// container as part of the same in-memory transaction as the entry
    /// change.
    pub(crate) fn recompute(&mut self, files_count: usize) {
        self.values
            .insert("files_count".into(), Value::from(files_count as u64));
        self.values.insert(
            "last_modified".into(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }

    /// Fixes a stale `files_count` without stamping `last_modified`.
    ///
    /// Used by the reader when a hand-edited container disagrees with its
    /// parsed entry count.
    pub(crate) fn set_files_count(&mut self, files_count: usize) {
        self.values
            .insert("files_count".into(), Value::from(files_count as u64));
    }

    /// Writes a maintained key directly, bypassing protection.
    ///
    /// Reserved for subsystems that own a protected key (the changelog).
    pub(crate) fn set_maintained(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}
