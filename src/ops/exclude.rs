//! Exclude: remove entries without persisting their bytes anywhere.

use crate::container::Container;
use crate::{Error, Result};

/// The result of an exclude call.
#[derive(Debug, Clone)]
pub struct ExcludeResult {
    /// The logical paths removed, in request order.
    pub removed: Vec<String>,
}

/// Removes the named entries.
///
/// The whole call is transactional: every name is validated before any
/// removal happens, so a missing name leaves the container unchanged.
///
/// # Errors
///
/// [`Error::EntryNotFound`] naming the first missing entry.
pub fn exclude_entries(container: &mut Container, names: &[String]) -> Result<ExcludeResult> {
    for name in names {
        if !container.contains(name) {
            return Err(Error::EntryNotFound { path: name.clone() });
        }
    }

    let mut removed = Vec::with_capacity(names.len());
    for name in names {
        container.remove_entry(name)?;
        removed.push(name.clone());
    }
    log::debug!("excluded {} entries", removed.len());
    Ok(ExcludeResult { removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::AddOptions;
    use crate::EntryPath;

    fn sample() -> Container {
        let mut c = Container::new();
        for path in ["a.txt", "b.txt", "c.txt"] {
            c.add_entry(EntryPath::new(path).unwrap(), b"x", &AddOptions::default())
                .unwrap();
        }
        c
    }

    #[test]
    fn test_exclude_removes_entries() {
        let mut c = sample();
        let result =
            exclude_entries(&mut c, &["a.txt".to_string(), "c.txt".to_string()]).unwrap();
        assert_eq!(result.removed, vec!["a.txt", "c.txt"]);
        assert_eq!(c.len(), 1);
        assert_eq!(c.metadata.files_count(), 1);
    }

    #[test]
    fn test_exclude_missing_is_transactional() {
        let mut c = sample();
        let err = exclude_entries(&mut c, &["a.txt".to_string(), "temp.log".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::EntryNotFound { .. }));
        assert_eq!(err.entry_path(), Some("temp.log"));
        // Nothing was removed, files_count unchanged
        assert_eq!(c.len(), 3);
        assert_eq!(c.metadata.files_count(), 3);
    }
}
