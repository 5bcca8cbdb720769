//! Integration tests for the operation layer verbs.
//!
//! These walk the documented end-to-end scenarios: structure-preserving
//! import and byte-exact export, transactional exclude, duplicate-aware
//! re-import, per-entry corruption handling, and changelog tracking.

mod common;

use tempfile::TempDir;

use svgpack::Error;
use svgpack::ops::{
    ChangelogFormat, ContainerFile, ExportOptions, ExportSelector, ImportOptions, ListFilter,
    MemorySink,
};

use common::{corrupt_entry_payload, host_file, import_files, source};

// ============================================================================
// Scenario A: structure-preserving import, byte-exact export
// ============================================================================

#[test]
fn import_directory_with_structure_then_export() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());

    let main_py = b"def main():\n    print(\"hello\")\n";
    let sources = vec![
        source("project", "README.md", b"# project\n"),
        source("project", "data.json", b"{\"answer\": 42}"),
        source("project", "src/main.py", main_py),
    ];
    let result = file
        .import(
            &sources,
            &ImportOptions {
                preserve_structure: true,
                ..ImportOptions::default()
            },
        )
        .unwrap();
    assert_eq!(result.added(), 3);

    let infos = file.list(&ListFilter::all()).unwrap();
    assert_eq!(infos.len(), 3);

    let mut sink = MemorySink::new();
    let export = file
        .export(
            &ExportSelector::Paths(vec!["src/main.py".into()]),
            &mut sink,
            &ExportOptions::default(),
        )
        .unwrap();
    assert_eq!(export.exported(), 1);
    assert_eq!(sink.get("src/main.py").unwrap(), main_py);
}

// ============================================================================
// Scenario B: exclude of a missing entry is transactional
// ============================================================================

#[test]
fn exclude_missing_entry_leaves_container_unchanged() {
    let dir = TempDir::new().unwrap();
    let (path, file) = host_file(dir.path());
    import_files(&file, &[("a.txt", b"A"), ("b.txt", b"B")]);

    let document_before = std::fs::read_to_string(&path).unwrap();
    let err = file.exclude(&["temp.log".to_string()]).unwrap_err();
    assert!(matches!(err, Error::EntryNotFound { .. }));

    // Host document untouched, files_count unchanged
    assert_eq!(std::fs::read_to_string(&path).unwrap(), document_before);
    let meta = file.metadata_snapshot().unwrap();
    assert_eq!(meta.get("files_count"), Some(&serde_json::json!(2)));
}

#[test]
fn exclude_removes_and_persists() {
    let dir = TempDir::new().unwrap();
    let (path, file) = host_file(dir.path());
    import_files(&file, &[("a.txt", b"A"), ("b.txt", b"B")]);

    let result = file.exclude(&["a.txt".to_string()]).unwrap();
    assert_eq!(result.removed, vec!["a.txt"]);

    let document = std::fs::read_to_string(&path).unwrap();
    assert!(!document.contains("a.txt"));
    assert_eq!(file.list(&ListFilter::all()).unwrap().len(), 1);
}

// ============================================================================
// Scenario C: importing the same file twice
// ============================================================================

#[test]
fn import_same_logo_twice_skips_duplicate() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());

    let logo = vec![source("icons", "logo.png", &[0x89, 0x50, 0x4E, 0x47])];
    let options = ImportOptions::default();

    let first = file.import(&logo, &options).unwrap();
    assert_eq!(first.added(), 1);

    let second = file.import(&logo, &options).unwrap();
    assert_eq!(second.added(), 0);
    assert_eq!(second.skipped(), 1);

    let meta = file.metadata_snapshot().unwrap();
    assert_eq!(meta.get("files_count"), Some(&serde_json::json!(1)));
}

// ============================================================================
// Scenario D: corrupt payloads fail alone
// ============================================================================

#[test]
fn corrupt_entry_lists_but_fails_export() {
    let dir = TempDir::new().unwrap();
    let (path, file) = host_file(dir.path());
    import_files(
        &file,
        &[("good.bin", &[1u8, 2, 3, 4][..]), ("bad.bin", &[9u8, 8, 7, 6][..])],
    );

    // Flip a character in bad.bin's base64 payload on disk
    let document = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, corrupt_entry_payload(&document, "bad.bin")).unwrap();

    // Listing is metadata-only and still succeeds
    let infos = file.list(&ListFilter::all()).unwrap();
    assert_eq!(infos.len(), 2);

    // Export fails only for the corrupt entry
    let mut sink = MemorySink::new();
    let result = file
        .export(&ExportSelector::All, &mut sink, &ExportOptions::default())
        .unwrap();
    assert_eq!(result.exported(), 1);
    assert_eq!(result.failed(), 1);
    assert_eq!(sink.get("good.bin").unwrap(), &[1, 2, 3, 4]);
    assert!(sink.get("bad.bin").is_none());

    // Strict single-entry export surfaces the decode error
    let mut sink = MemorySink::new();
    let err = file
        .export(
            &ExportSelector::Paths(vec!["bad.bin".into()]),
            &mut sink,
            &ExportOptions {
                strict: true,
                ..ExportOptions::default()
            },
        )
        .unwrap_err();
    assert!(err.is_corruption(), "{err:?}");
}

// ============================================================================
// Scenario E: changelog tracking
// ============================================================================

#[test]
fn changelog_records_operations_in_order() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());

    file.start_tracking();
    assert!(file.is_tracking());

    file.import(
        &[source("docs", "guide.md", b"# guide")],
        &ImportOptions::default(),
    )
    .unwrap();

    let mut updates = serde_json::Map::new();
    updates.insert("title".into(), serde_json::json!("Guide bundle"));
    file.update_metadata(updates).unwrap();

    let markdown = file.generate_changelog(ChangelogFormat::Markdown).unwrap();
    assert_eq!(markdown.matches("## ").count(), 2, "{markdown}");
    let import_at = markdown.find("import").unwrap();
    let meta_at = markdown.find("metadata-update").unwrap();
    assert!(import_at < meta_at, "chronological order");
}

#[test]
fn changelog_persists_into_metadata_and_restores() {
    let dir = TempDir::new().unwrap();
    let (path, file) = host_file(dir.path());

    file.start_tracking();
    file.import(
        &[source("docs", "a.txt", b"A")],
        &ImportOptions::default(),
    )
    .unwrap();
    file.persist_changelog().unwrap();

    // A second handle on the same document sees the persisted log
    let reopened = ContainerFile::open(&path).unwrap();
    assert_eq!(reopened.restore_changelog().unwrap(), 1);
    let json = reopened.generate_changelog(ChangelogFormat::Json).unwrap();
    assert!(json.contains("a.txt"));
}

#[test]
fn changelog_untracked_operations_not_recorded() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());

    file.import(
        &[source("docs", "a.txt", b"A")],
        &ImportOptions::default(),
    )
    .unwrap();

    let md = file.generate_changelog(ChangelogFormat::Markdown).unwrap();
    assert_eq!(md.matches("## ").count(), 0);
}

#[test]
fn changelog_entry_kinds_cover_exclude_and_export() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());
    import_files(&file, &[("a.txt", b"A"), ("b.txt", b"B")]);

    file.start_tracking();
    let mut sink = MemorySink::new();
    file.export(
        &ExportSelector::Paths(vec!["a.txt".into()]),
        &mut sink,
        &ExportOptions::default(),
    )
    .unwrap();
    file.exclude(&["b.txt".to_string()]).unwrap();

    let json = file.generate_changelog(ChangelogFormat::Json).unwrap();
    let entries: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["operation"], "export");
    assert_eq!(entries[1]["operation"], "exclude");
}

// ============================================================================
// Export with removal
// ============================================================================

#[test]
fn export_with_remove_persists_removal() {
    let dir = TempDir::new().unwrap();
    let (path, file) = host_file(dir.path());
    import_files(&file, &[("keep.txt", b"K"), ("take.txt", b"T")]);

    let mut sink = MemorySink::new();
    let result = file
        .export(
            &ExportSelector::Paths(vec!["take.txt".into()]),
            &mut sink,
            &ExportOptions {
                remove_after: true,
                ..ExportOptions::default()
            },
        )
        .unwrap();
    assert_eq!(result.removed(), 1);

    let document = std::fs::read_to_string(&path).unwrap();
    assert!(!document.contains("take.txt"));
    assert!(document.contains("keep.txt"));
}

#[test]
fn plain_export_does_not_rewrite_host_document() {
    let dir = TempDir::new().unwrap();
    let (path, file) = host_file(dir.path());
    import_files(&file, &[("a.txt", b"A")]);

    let before = std::fs::read_to_string(&path).unwrap();
    let mut sink = MemorySink::new();
    file.export(&ExportSelector::All, &mut sink, &ExportOptions::default())
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

// ============================================================================
// Metadata verbs end to end
// ============================================================================

#[test]
fn metadata_update_clean_clear_cycle() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());
    import_files(&file, &[("a.txt", b"A")]);

    let mut updates = serde_json::Map::new();
    updates.insert("title".into(), serde_json::json!("T"));
    updates.insert("creator".into(), serde_json::json!("C"));
    updates.insert("scratch".into(), serde_json::json!(1));
    updates.insert("files_count".into(), serde_json::json!(999));
    let result = file.update_metadata(updates).unwrap();
    // The protected key was dropped
    assert_eq!(result.changed_keys.len(), 3);

    let meta = file.metadata_snapshot().unwrap();
    assert_eq!(meta.get("files_count"), Some(&serde_json::json!(1)));
    assert_eq!(meta.get("title"), Some(&serde_json::json!("T")));

    file.clean_metadata().unwrap();
    let meta = file.metadata_snapshot().unwrap();
    assert!(meta.get("scratch").is_none());
    assert_eq!(meta.get("creator"), Some(&serde_json::json!("C")));

    file.clear_metadata().unwrap();
    let meta = file.metadata_snapshot().unwrap();
    assert!(meta.get("title").is_none());
    assert_eq!(meta.get("files_count"), Some(&serde_json::json!(1)));
}

// ============================================================================
// Parallel access to distinct containers
// ============================================================================

#[test]
fn distinct_containers_process_in_parallel() {
    let dir = TempDir::new().unwrap();
    let mut handles = Vec::new();
    for i in 0..4 {
        let path = dir.path().join(format!("doc{i}.svg"));
        std::fs::write(&path, common::HOST).unwrap();
        handles.push(std::thread::spawn(move || {
            let file = ContainerFile::open(&path).unwrap();
            let sources = vec![source("w", "data.txt", format!("worker {i}").as_bytes())];
            file.import(&sources, &ImportOptions::default()).unwrap();
            file.list(&ListFilter::all()).unwrap().len()
        }));
    }
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
