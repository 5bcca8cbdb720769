//! Shared fixtures for integration tests.

// Not every suite uses every helper
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use svgpack::EntryPath;
use svgpack::ops::{ContainerFile, ImportOptions, ImportSource};

/// A host document with some unrelated markup worth preserving.
pub const HOST: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!-- hand-drawn diagram -->\n\
<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"64\" height=\"64\" viewBox=\"0 0 64 64\">\n\
  <defs>\n    <linearGradient id=\"g\"><stop offset=\"0\" stop-color=\"#f00\"/></linearGradient>\n  </defs>\n\
  <circle cx=\"32\" cy=\"32\" r=\"24\" fill=\"url(#g)\"/>\n\
</svg>\n";

/// Writes the fixture host document into `dir` and opens a handle on it.
pub fn host_file(dir: &Path) -> (PathBuf, ContainerFile) {
    let path = dir.join("fixture.svg");
    std::fs::write(&path, HOST).expect("write host fixture");
    let file = ContainerFile::open(&path).expect("open host fixture");
    (path, file)
}

/// Builds an in-memory import source.
pub fn source(origin: &str, path: &str, bytes: &[u8]) -> ImportSource {
    ImportSource::from_bytes(origin, EntryPath::new(path).expect("valid path"), bytes.to_vec())
}

/// Imports the given files with default options.
pub fn import_files(file: &ContainerFile, files: &[(&str, &[u8])]) {
    let sources: Vec<ImportSource> = files
        .iter()
        .map(|(path, bytes)| source("fixture", path, bytes))
        .collect();
    let result = file
        .import(&sources, &ImportOptions::default())
        .expect("import fixture files");
    assert_eq!(result.added(), files.len(), "all fixture files added");
}

/// Flips one character inside the named entry's payload in the serialized
/// document, simulating on-disk corruption.
pub fn corrupt_entry_payload(document: &str, path: &str) -> String {
    let marker = format!("path=\"{}\"", path);
    let attr_at = document.find(&marker).expect("entry block present");
    let payload_start = document[attr_at..].find('>').expect("entry open tag end") + attr_at + 1;
    let payload_end = document[payload_start..]
        .find('<')
        .expect("entry close tag")
        + payload_start;
    assert!(payload_end > payload_start, "payload must not be empty");

    let target = payload_start;
    let original = document.as_bytes()[target] as char;
    let flipped = if original == 'A' { 'B' } else { 'A' };

    let mut out = String::with_capacity(document.len());
    out.push_str(&document[..target]);
    out.push(flipped);
    out.push_str(&document[target + 1..]);
    out
}
