//! Integration tests for malformed host documents and hostile containers.

mod common;

use tempfile::TempDir;

use svgpack::ops::{ContainerFile, ImportOptions, ListFilter, ResourceLimits};
use svgpack::{Error, document};

use common::{host_file, import_files, source};

// ============================================================================
// Host document validation
// ============================================================================

#[test]
fn unparsable_host_aborts_before_mutation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.svg");
    std::fs::write(&path, "<svg><rect></svg>").unwrap();

    let file = ContainerFile::open(&path).unwrap();
    let err = file
        .import(&[source("x", "a.txt", b"A")], &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidHostFormat(_)));

    // The broken file is exactly as it was
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg><rect></svg>");
}

#[test]
fn non_xml_host_rejected() {
    for doc in ["plain text", "{\"json\": true}", "\x00\x01\x02"] {
        let err = document::parse(doc).unwrap_err();
        assert!(matches!(err, Error::InvalidHostFormat(_)), "{doc:?}");
    }
}

#[test]
fn multiple_manifest_blocks_conflict() {
    let doc = "<svg xmlns=\"http://www.w3.org/2000/svg\">\
        <svgpack:bundle xmlns:svgpack=\"urn:svgpack:container:1\">\
        <svgpack:manifest>{\"metadata\":{}}</svgpack:manifest>\
        <svgpack:manifest>{\"metadata\":{}}</svgpack:manifest>\
        </svgpack:bundle></svg>";
    let err = document::parse(doc).unwrap_err();
    assert!(matches!(err, Error::StructureConflict(_)));
}

#[test]
fn two_bundle_regions_conflict() {
    let bundle = "<svgpack:bundle xmlns:svgpack=\"urn:svgpack:container:1\">\
        <svgpack:manifest>{\"metadata\":{}}</svgpack:manifest></svgpack:bundle>";
    let doc = format!("<svg>{bundle}{bundle}</svg>");
    let err = document::parse(&doc).unwrap_err();
    assert!(matches!(err, Error::StructureConflict(_)));
}

#[test]
fn stored_tree_divergence_conflicts() {
    let doc = "<svg><svgpack:bundle xmlns:svgpack=\"urn:svgpack:container:1\">\
        <svgpack:manifest>{\"metadata\":{},\"structure\":{\"name\":\"\",\"kind\":\"directory\",\
        \"children\":[{\"name\":\"ghost.txt\",\"kind\":\"file\",\"size\":4,\"media_type\":\"text/plain\"}]}}\
        </svgpack:manifest></svgpack:bundle></svg>";
    let err = document::parse(doc).unwrap_err();
    assert!(matches!(err, Error::StructureConflict(_)));
}

// ============================================================================
// Resource limits
// ============================================================================

#[test]
fn file_size_limit_fails_fast() {
    let dir = TempDir::new().unwrap();
    let (path, file) = host_file(dir.path());

    let before = std::fs::read_to_string(&path).unwrap();
    let options = ImportOptions {
        limits: ResourceLimits::default().max_file_size(8),
        ..ImportOptions::default()
    };
    let err = file
        .import(
            &[
                source("x", "tiny.txt", b"ok"),
                source("x", "huge.bin", &[0u8; 64]),
            ],
            &options,
        )
        .unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));

    // No partial write: neither entry landed
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert!(file.list(&ListFilter::all()).unwrap().is_empty());
}

#[test]
fn total_size_limit_fails_fast() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());

    let options = ImportOptions {
        limits: ResourceLimits::default().max_total_size(10),
        ..ImportOptions::default()
    };
    let err = file
        .import(
            &[
                source("x", "a.bin", &[0u8; 6]),
                source("x", "b.bin", &[0u8; 6]),
            ],
            &options,
        )
        .unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));
}

#[test]
fn entry_count_limit_counts_existing_entries() {
    let dir = TempDir::new().unwrap();
    let (_path, file) = host_file(dir.path());
    import_files(&file, &[("a.txt", b"A"), ("b.txt", b"B")]);

    let options = ImportOptions {
        limits: ResourceLimits::default().max_entries(3),
        ..ImportOptions::default()
    };
    let err = file
        .import(
            &[source("x", "c.txt", b"C"), source("x", "d.txt", b"D")],
            &options,
        )
        .unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));
    assert_eq!(file.list(&ListFilter::all()).unwrap().len(), 2);
}

// ============================================================================
// Hostile entry data
// ============================================================================

#[test]
fn traversal_paths_in_container_rejected() {
    let doc = "<svg><svgpack:bundle xmlns:svgpack=\"urn:svgpack:container:1\">\
        <svgpack:manifest>{\"metadata\":{}}</svgpack:manifest>\
        <svgpack:entry path=\"../../etc/passwd\" media-type=\"text/plain\" encoding=\"utf8-text\" \
        checksum=\"00000000\" raw-size=\"0\" added-at=\"2026-01-01T00:00:00+00:00\"></svgpack:entry>\
        </svgpack:bundle></svg>";
    let err = document::parse(doc).unwrap_err();
    assert!(matches!(err, Error::InvalidEntryPath(_)));
}

#[test]
fn unknown_encoding_tag_fails_only_at_decode() {
    let doc = "<svg><svgpack:bundle xmlns:svgpack=\"urn:svgpack:container:1\">\
        <svgpack:manifest>{\"metadata\":{\"files_count\":1}}</svgpack:manifest>\
        <svgpack:entry path=\"weird.bin\" media-type=\"application/octet-stream\" encoding=\"rot13\" \
        checksum=\"00000000\" raw-size=\"4\" added-at=\"2026-01-01T00:00:00+00:00\">abcd</svgpack:entry>\
        </svgpack:bundle></svg>";

    // Parsing and listing tolerate the unknown tag
    let parsed = document::parse(doc).unwrap();
    let entry = parsed.container.get("weird.bin").unwrap();
    assert_eq!(entry.encoding, "rot13");

    // Decoding surfaces the per-entry error
    let err = entry.decode().unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn declared_size_mismatch_fails_decode() {
    let doc = "<svg><svgpack:bundle xmlns:svgpack=\"urn:svgpack:container:1\">\
        <svgpack:manifest>{\"metadata\":{\"files_count\":1}}</svgpack:manifest>\
        <svgpack:entry path=\"short.txt\" media-type=\"text/plain\" encoding=\"utf8-text\" \
        checksum=\"00000000\" raw-size=\"999\" added-at=\"2026-01-01T00:00:00+00:00\">tiny</svgpack:entry>\
        </svgpack:bundle></svg>";
    let parsed = document::parse(doc).unwrap();
    let err = parsed.container.get("short.txt").unwrap().decode().unwrap_err();
    assert!(err.to_string().contains("raw size"));
}
