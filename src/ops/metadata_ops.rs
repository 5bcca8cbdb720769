//! Metadata verbs: update, remove, clean, clear.

use serde_json::{Map, Value};

use crate::container::Container;

/// The keys a metadata verb touched.
#[derive(Debug, Clone)]
pub struct MetadataResult {
    /// Keys written or dropped by the call.
    pub changed_keys: Vec<String>,
}

/// Merges caller-supplied values into the metadata mapping.
///
/// Protected keys (`files_count`, `last_modified`, `structure`,
/// `changelog`) are silently dropped; derived state always wins.
pub fn update_metadata(container: &mut Container, updates: Map<String, Value>) -> MetadataResult {
    let changed_keys = container.metadata.update(updates);
    touch(container);
    MetadataResult { changed_keys }
}

/// Deletes the given keys from the metadata mapping.
pub fn remove_metadata(container: &mut Container, keys: &[String]) -> MetadataResult {
    let changed_keys = container.metadata.remove(keys);
    touch(container);
    MetadataResult { changed_keys }
}

/// Reduces the metadata mapping to the essential subset
/// (`title`, `description`, `creator`) plus library-maintained keys.
pub fn clean_metadata(container: &mut Container) -> MetadataResult {
    let changed_keys = container.metadata.clean();
    touch(container);
    MetadataResult { changed_keys }
}

/// Empties the caller-visible metadata mapping.
pub fn clear_metadata(container: &mut Container) -> MetadataResult {
    let changed_keys = container.metadata.clear();
    touch(container);
    MetadataResult { changed_keys }
}

/// Metadata verbs count as mutations: stamp `last_modified` and keep
/// `files_count` in sync in the same step.
fn touch(container: &mut Container) {
    let count = container.len();
    container.metadata.recompute(count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn updates(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_update_and_remove() {
        let mut c = Container::new();
        let result = update_metadata(
            &mut c,
            updates(&[("title", json!("Diagram")), ("creator", json!("me"))]),
        );
        assert_eq!(result.changed_keys.len(), 2);
        assert_eq!(c.metadata.get("title"), Some(&json!("Diagram")));

        let result = remove_metadata(&mut c, &["title".to_string()]);
        assert_eq!(result.changed_keys, vec!["title"]);
        assert!(c.metadata.get("title").is_none());
    }

    #[test]
    fn test_update_cannot_touch_protected_keys() {
        let mut c = Container::new();
        update_metadata(&mut c, updates(&[("files_count", json!(99))]));
        assert_eq!(c.metadata.files_count(), 0);
    }

    #[test]
    fn test_clean_reduces_to_essential() {
        let mut c = Container::new();
        update_metadata(
            &mut c,
            updates(&[
                ("title", json!("t")),
                ("description", json!("d")),
                ("internal_tag", json!("x")),
            ]),
        );
        let result = clean_metadata(&mut c);
        assert_eq!(result.changed_keys, vec!["internal_tag"]);
        assert!(c.metadata.get("title").is_some());
        assert!(c.metadata.get("internal_tag").is_none());
    }

    #[test]
    fn test_clear_empties_caller_keys() {
        let mut c = Container::new();
        update_metadata(&mut c, updates(&[("title", json!("t"))]));
        clear_metadata(&mut c);
        assert!(c.metadata.get("title").is_none());
        // Maintained keys survive
        assert!(c.metadata.get("generator").is_some());
        assert_eq!(c.metadata.files_count(), 0);
    }
}
