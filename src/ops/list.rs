//! Listing: read-only projection of container entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::container::Container;
use crate::media_type;

/// Read-only projection of one entry.
///
/// Listing never decodes payloads, so corrupt entries still list; only an
/// export trips their decode error.
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    /// The logical path.
    pub path: String,
    /// The file name (last path segment).
    pub name: String,
    /// The declared media type.
    pub media_type: String,
    /// The encoding tag.
    pub encoding: String,
    /// Raw byte size.
    pub raw_size: u64,
    /// Encoded payload size.
    pub encoded_size: u64,
    /// Insertion timestamp.
    pub added_at: DateTime<Utc>,
}

/// Filter for the listing.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Keep only entries whose media type class matches (`"image"`,
    /// `"text"`, ...). `None` keeps everything.
    pub media_class: Option<String>,
}

impl ListFilter {
    /// Keeps every entry.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keeps entries of one media type class.
    pub fn media_class(class: &str) -> Self {
        Self {
            media_class: Some(class.to_string()),
        }
    }

    fn matches(&self, media: &str) -> bool {
        match &self.media_class {
            Some(class) => media_type::class_of(media) == class,
            None => true,
        }
    }
}

/// Projects the container's entries, in insertion order.
pub fn list_entries(container: &Container, filter: &ListFilter) -> Vec<EntryInfo> {
    container
        .entries()
        .iter()
        .filter(|e| filter.matches(&e.media_type))
        .map(|e| EntryInfo {
            path: e.path.as_str().to_string(),
            name: e.name().to_string(),
            media_type: e.media_type.clone(),
            encoding: e.encoding.clone(),
            raw_size: e.raw_size,
            encoded_size: e.encoded_size,
            added_at: e.added_at,
        })
        .collect()
}

/// Renders a human-readable report of the container contents.
pub fn render_report(container: &Container, infos: &[EntryInfo]) -> String {
    let mut report = String::new();
    report.push_str("=== Container ===\n");
    report.push_str(&format!("Entries: {}\n", container.len()));
    if let Some(modified) = container.metadata.last_modified() {
        report.push_str(&format!("Last modified: {}\n", modified.to_rfc3339()));
    }

    report.push_str("\n=== Embedded Files ===\n");
    if infos.is_empty() {
        report.push_str("No embedded files found.\n");
    } else {
        for (i, info) in infos.iter().enumerate() {
            report.push_str(&format!(
                "{}. {} ({:.2} KB, {}, {})\n",
                i + 1,
                info.path,
                info.raw_size as f64 / 1024.0,
                info.media_type,
                info.encoding,
            ));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::AddOptions;
    use crate::EntryPath;

    fn sample() -> Container {
        let mut c = Container::new();
        for (path, bytes) in [
            ("README.md", b"# doc".as_slice()),
            ("logo.png", &[0x89u8, 0x50]),
            ("src/main.py", b"print()"),
        ] {
            c.add_entry(EntryPath::new(path).unwrap(), bytes, &AddOptions::default())
                .unwrap();
        }
        c
    }

    #[test]
    fn test_list_all() {
        let c = sample();
        let infos = list_entries(&c, &ListFilter::all());
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].path, "README.md");
        assert_eq!(infos[2].name, "main.py");
    }

    #[test]
    fn test_list_with_media_class_filter() {
        let c = sample();
        let images = list_entries(&c, &ListFilter::media_class("image"));
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].path, "logo.png");

        let texts = list_entries(&c, &ListFilter::media_class("text"));
        assert_eq!(texts.len(), 2);
    }

    #[test]
    fn test_list_does_not_mutate() {
        let c = sample();
        let count_before = c.metadata.files_count();
        let _ = list_entries(&c, &ListFilter::all());
        assert_eq!(c.metadata.files_count(), count_before);
    }

    #[test]
    fn test_report_renders_entries() {
        let c = sample();
        let infos = list_entries(&c, &ListFilter::all());
        let report = render_report(&c, &infos);
        assert!(report.contains("Entries: 3"));
        assert!(report.contains("logo.png"));
        assert!(report.contains("image/png"));
    }

    #[test]
    fn test_report_empty_container() {
        let c = Container::new();
        let report = render_report(&c, &[]);
        assert!(report.contains("No embedded files"));
    }
}
