//! In-memory container model.

use std::collections::{BTreeSet, HashMap};

use crate::codec::EncodePolicy;
use crate::tree::{self, TreeNode};
use crate::{EntryPath, Error, Result};

use super::entry::Entry;
use super::metadata::Metadata;

/// Options for inserting one entry.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Replace an existing entry at the same path instead of failing.
    pub overwrite: bool,
    /// Explicit media type; inferred from the extension when `None`.
    pub media_type: Option<String>,
    /// Encoding policy for the payload.
    pub policy: EncodePolicy,
}

/// The embedded file set for one host document.
///
/// A container owns its entries for one parse-mutate-serialize cycle. The
/// flat path-to-entry mapping is the single source of truth; the directory
/// tree view is derived from it on demand, so the two can never diverge.
/// Insertion order is preserved for deterministic serialization.
///
/// Every mutating call updates `metadata.files_count` and
/// `metadata.last_modified` together with the entry change; validation
/// happens first, so a failed call leaves the container untouched.
#[derive(Debug, Clone)]
pub struct Container {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    /// The metadata record serialized into the manifest block.
    pub metadata: Metadata,
    structure_preserved: bool,
}

impl Container {
    /// Creates an empty container with fresh metadata.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            metadata: Metadata::new(),
            structure_preserved: false,
        }
    }

    /// Rebuilds a container from parsed parts.
    pub(crate) fn from_parts(
        entries: Vec<Entry>,
        metadata: Metadata,
        structure_preserved: bool,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.path.as_str().to_string(), i).is_some() {
                return Err(Error::StructureConflict(format!(
                    "duplicate entry path '{}'",
                    entry.path
                )));
            }
        }
        Ok(Self {
            entries,
            index,
            metadata,
            structure_preserved,
        })
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the container holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if an entry exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Returns the entry at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    /// Returns the entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the set of logical paths.
    pub fn paths(&self) -> BTreeSet<String> {
        self.index.keys().cloned().collect()
    }

    /// Adds an entry built from raw bytes.
    ///
    /// Returns the replaced entry when `options.overwrite` replaced one; the
    /// replacement is visible to the changelog as a removal plus an
    /// addition.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicatePath`] when the path is taken and `overwrite` is
    /// not set.
    pub fn add_entry(
        &mut self,
        path: EntryPath,
        raw: &[u8],
        options: &AddOptions,
    ) -> Result<Option<Entry>> {
        let replaced = match self.index.get(path.as_str()) {
            Some(&i) => {
                if !options.overwrite {
                    return Err(Error::DuplicatePath {
                        path: path.as_str().to_string(),
                    });
                }
                Some(i)
            }
            None => None,
        };

        let entry = Entry::from_bytes(path, raw, options.media_type.as_deref(), &options.policy);
        log::debug!(
            "adding entry '{}' ({} bytes, {})",
            entry.path,
            entry.raw_size,
            entry.encoding
        );

        let previous = match replaced {
            Some(i) => Some(std::mem::replace(&mut self.entries[i], entry)),
            None => {
                self.index
                    .insert(entry.path.as_str().to_string(), self.entries.len());
                self.entries.push(entry);
                None
            }
        };

        self.metadata.recompute(self.entries.len());
        Ok(previous)
    }

    /// Removes and returns the entry at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::EntryNotFound`] when no entry exists at `path`; the
    /// container is left unchanged.
    pub fn remove_entry(&mut self, path: &str) -> Result<Entry> {
        let Some(&i) = self.index.get(path) else {
            return Err(Error::EntryNotFound {
                path: path.to_string(),
            });
        };

        let entry = self.entries.remove(i);
        self.index.remove(path);
        // Reindex the entries shifted left by the removal
        for (j, e) in self.entries.iter().enumerate().skip(i) {
            self.index.insert(e.path.as_str().to_string(), j);
        }

        log::debug!("removed entry '{}'", entry.path);
        self.metadata.recompute(self.entries.len());
        Ok(entry)
    }

    /// Renames the entry at `old` to `new`, keeping its insertion position.
    ///
    /// # Errors
    ///
    /// - [`Error::EntryNotFound`] when `old` does not exist
    /// - [`Error::DuplicatePath`] when `new` already exists
    pub fn rename_entry(&mut self, old: &str, new: EntryPath) -> Result<()> {
        if self.index.contains_key(new.as_str()) {
            return Err(Error::DuplicatePath {
                path: new.as_str().to_string(),
            });
        }
        let Some(&i) = self.index.get(old) else {
            return Err(Error::EntryNotFound {
                path: old.to_string(),
            });
        };

        self.index.remove(old);
        self.index.insert(new.as_str().to_string(), i);
        self.entries[i].path = new;

        self.metadata.recompute(self.entries.len());
        Ok(())
    }

    /// Returns whether the directory tree is persisted alongside entries.
    pub fn structure_preserved(&self) -> bool {
        self.structure_preserved
    }

    /// Enables or disables structure preservation.
    pub fn set_structure_preserved(&mut self, preserved: bool) {
        self.structure_preserved = preserved;
    }

    /// Derives the directory tree view from the flat entry mapping.
    pub fn tree(&self) -> TreeNode {
        tree::build_tree(&self.entries)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
            && self.metadata == other.metadata
            && self.structure_preserved == other.structure_preserved
    }
}
