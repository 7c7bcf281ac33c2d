//! Shared test utilities for the feedmark test suite.
//!
//! Provides fixture setup and lookup helpers over parsed [`Document`]s.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let docs = load_fixtures(&tmp, &["Recent Llama Sightings.md"]);
//!
//! let recent = find_document(&docs, "Recent Llama Sightings");
//! let bridge = find_section(recent, "A Possible Llama Under the Bridge");
//! assert_eq!(section_titles(recent).len(), 3);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::loader::load_documents;
use crate::model::{Document, Section};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Paths of the named fixture files inside a copied fixture directory.
pub fn fixture_paths(tmp: &TempDir, names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|name| tmp.path().join(name)).collect()
}

/// Load the named fixture files, in order.
pub fn load_fixtures(tmp: &TempDir, names: &[&str]) -> Vec<Document> {
    load_documents(&fixture_paths(tmp, names)).unwrap()
}

// =========================================================================
// Document lookups: panics with a clear message on miss
// =========================================================================

/// Find a document by title. Panics if not found.
pub fn find_document<'a>(documents: &'a [Document], title: &str) -> &'a Document {
    documents
        .iter()
        .find(|d| d.title == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = documents.iter().map(|d| d.title.as_str()).collect();
            panic!("document '{title}' not found. Available: {titles:?}")
        })
}

/// Find a section by title within a document. Panics if not found.
pub fn find_section<'a>(document: &'a Document, title: &str) -> &'a Section {
    document.find_section(title).unwrap_or_else(|| {
        let titles = section_titles(document);
        panic!(
            "section '{title}' not found in document '{}'. Available: {titles:?}",
            document.title
        )
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All section titles in document order.
pub fn section_titles(document: &Document) -> Vec<&str> {
    document.sections.iter().map(|s| s.title.as_str()).collect()
}
