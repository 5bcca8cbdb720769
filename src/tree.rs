//! Directory-tree view of the flat entry mapping.
//!
//! The flat logical-path mapping is the single source of truth; the tree
//! here is derived from it on demand and serialized into the manifest block
//! when structure preservation is requested. [`flatten_tree`] is the exact
//! inverse of [`build_tree`], which the reader uses to validate a stored
//! tree against the parsed entry set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::container::Entry;
use crate::{EntryPath, Error, Result};

/// Whether a tree node describes a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A leaf carrying `size` and `media_type`.
    File,
    /// An inner node carrying `children`.
    Directory,
}

/// One node of the directory-tree description.
///
/// The tree is acyclic by construction, child names are unique within their
/// parent, and children are sorted by name so that serialization is
/// deterministic regardless of entry insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Segment name; the root uses an empty name.
    pub name: String,
    /// File or directory.
    pub kind: NodeKind,
    /// Child nodes, sorted by name (directories only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    /// Raw byte size (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Declared media type (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl TreeNode {
    fn directory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            size: None,
            media_type: None,
        }
    }

    fn file(name: &str, size: u64, media_type: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::File,
            children: Vec::new(),
            size: Some(size),
            media_type: Some(media_type.to_string()),
        }
    }

    /// Returns the number of file leaves in this subtree.
    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children.iter().map(TreeNode::file_count).sum(),
        }
    }
}

/// Groups entries into a directory tree by their `/`-separated segments.
///
/// Returns the root directory node (empty name). Children at every level
/// are sorted by name.
pub fn build_tree(entries: &[Entry]) -> TreeNode {
    let mut root = TreeNode::directory("");
    for entry in entries {
        insert_path(&mut root, &entry.path, entry.raw_size, &entry.media_type);
    }
    sort_children(&mut root);
    root
}

fn insert_path(root: &mut TreeNode, path: &EntryPath, size: u64, media_type: &str) {
    let segments: Vec<&str> = path.segments().collect();
    let mut node = root;
    for (i, segment) in segments.iter().enumerate() {
        if i == segments.len() - 1 {
            node.children.push(TreeNode::file(segment, size, media_type));
        } else {
            let pos = node
                .children
                .iter()
                .position(|c| c.kind == NodeKind::Directory && c.name == *segment);
            let pos = match pos {
                Some(pos) => pos,
                None => {
                    node.children.push(TreeNode::directory(segment));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[pos];
        }
    }
}

fn sort_children(node: &mut TreeNode) {
    node.children.sort_by(|a, b| a.name.cmp(&b.name));
    for child in &mut node.children {
        sort_children(child);
    }
}

/// Flattens a tree back into its set of logical paths.
///
/// Exact inverse of [`build_tree`]:
/// `flatten_tree(&build_tree(entries)) == entries' path set`.
pub fn flatten_tree(node: &TreeNode) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    collect_paths(node, "", &mut paths);
    paths
}

fn collect_paths(node: &TreeNode, prefix: &str, paths: &mut BTreeSet<String>) {
    for child in &node.children {
        let path = if prefix.is_empty() {
            child.name.clone()
        } else {
            format!("{}/{}", prefix, child.name)
        };
        match child.kind {
            NodeKind::File => {
                paths.insert(path);
            }
            NodeKind::Directory => collect_paths(child, &path, paths),
        }
    }
}

/// Validates a stored tree against the flat entry path set.
///
/// # Errors
///
/// [`Error::StructureConflict`] naming a path present on only one side.
pub fn validate_tree(tree: &TreeNode, paths: &BTreeSet<String>) -> Result<()> {
    let flattened = flatten_tree(tree);
    if let Some(missing) = flattened.difference(paths).next() {
        return Err(Error::StructureConflict(format!(
            "tree references missing entry '{}'",
            missing
        )));
    }
    if let Some(extra) = paths.difference(&flattened).next() {
        return Err(Error::StructureConflict(format!(
            "entry '{}' is absent from the stored tree",
            extra
        )));
    }
    Ok(())
}

/// How an imported tree combines with the existing structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum MergeStrategy {
    /// Keep the imported relative paths, merging the tree at the root.
    #[default]
    Preserve,
    /// Drop imported files into the root, ignoring their original folders.
    Flat,
    /// Insert the imported tree under one new top-level segment named after
    /// the archive or source.
    Nested,
    /// Give each import source its own top-level segment.
    BySource,
}

impl MergeStrategy {
    /// Parses a strategy name (`preserve`, `flat`, `nested`, `by-source`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "preserve" => Some(Self::Preserve),
            "flat" => Some(Self::Flat),
            "nested" => Some(Self::Nested),
            "by-source" => Some(Self::BySource),
            _ => None,
        }
    }
}

/// One import item as seen by the merge planner.
#[derive(Debug, Clone)]
pub struct MergeItem {
    /// Label of the originating source (archive stem, directory name).
    pub source: String,
    /// Path relative to the source root.
    pub relative: EntryPath,
}

/// Maps each import item to its target logical path under `strategy`.
///
/// The plan fails before any mutation, so a conflicting merge leaves the
/// container untouched.
///
/// # Errors
///
/// [`Error::StructureConflict`] when the flat policy would *silently*
/// shadow a file: two items flatten to the same name, or a flattened item
/// (one that lost directory segments) lands on an existing entry without
/// `overwrite`. An item whose path already collides verbatim is not a
/// silent shadow; it surfaces later as a per-entry duplicate.
pub fn plan_merge(
    existing: &BTreeSet<String>,
    items: &[MergeItem],
    strategy: MergeStrategy,
    overwrite: bool,
) -> Result<Vec<EntryPath>> {
    let mut targets = Vec::with_capacity(items.len());
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for item in items {
        let target = match strategy {
            MergeStrategy::Preserve => item.relative.clone(),
            MergeStrategy::Flat => EntryPath::new(item.relative.file_name())?,
            MergeStrategy::Nested | MergeStrategy::BySource => {
                item.relative.prefixed(&item.source)?
            }
        };

        if !seen.insert(target.as_str().to_string()) {
            return Err(Error::StructureConflict(format!(
                "merge maps two imported files onto '{}'",
                target
            )));
        }

        if strategy == MergeStrategy::Flat
            && target.as_str() != item.relative.as_str()
            && existing.contains(target.as_str())
            && !overwrite
        {
            return Err(Error::StructureConflict(format!(
                "flat merge would shadow existing entry '{}' (imported from '{}')",
                target, item.relative
            )));
        }

        targets.push(target);
    }

    Ok(targets)
}
