//! Reading Feedmark documents from disk.
//!
//! Each file is parsed on its own, so a batch is parsed across the rayon pool
//! with no shared state. Results come back in input order, and the first file
//! that fails to read or parse fails the whole batch: downstream outputs
//! (feeds, schema reports, refdexes) assume every requested document is there.
//!
//! Directories given as inputs are walked for `*.md` files, sorted by path so
//! runs are reproducible.

use crate::model::Document;
use crate::parser::{self, ParseError};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse { path: PathBuf, source: ParseError },
    #[error("Cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Read, parse and stamp the filename on a single document.
pub fn read_document_from(path: &Path) -> Result<Document, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut document = parser::parse(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    document.filename = Some(path.to_string_lossy().into_owned());
    debug!(path = %path.display(), sections = document.sections.len(), "loaded document");
    Ok(document)
}

/// Parse every path in parallel, keeping input order.
pub fn load_documents(paths: &[PathBuf]) -> Result<Vec<Document>, LoadError> {
    let results: Vec<Result<Document, LoadError>> = paths
        .par_iter()
        .map(|path| read_document_from(path))
        .collect();
    // The reported error is the first in input order.
    let documents = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    let sections: usize = documents.iter().map(|d| d.sections.len()).sum();
    info!(documents = documents.len(), sections, "loaded documents");
    Ok(documents)
}

/// Turn a mix of files and directories into a flat list of files.
///
/// Files are passed through as given. Directories contribute every `*.md`
/// beneath them, sorted.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input) {
            let entry = entry.map_err(|source| LoadError::Walk {
                path: input.clone(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && is_markdown(path) {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    // =========================================================================
    // read_document_from
    // =========================================================================

    #[test]
    fn sets_filename() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "llamas.md", "# Llamas\n\n### One\n\nBody.\n");
        let doc = read_document_from(&path).unwrap();
        assert_eq!(doc.title, "Llamas");
        assert_eq!(doc.filename.as_deref(), Some(path.to_string_lossy().as_ref()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = read_document_from(&tmp.path().join("nope.md"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn parse_error_carries_path() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "bad.md", "no title here\n");
        let err = read_document_from(&path).unwrap_err();
        match &err {
            LoadError::Parse { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source, &ParseError::MissingTitle { line: 1 });
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("bad.md"));
    }

    // =========================================================================
    // load_documents
    // =========================================================================

    #[test]
    fn keeps_input_order() {
        let tmp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..8)
            .map(|n| write(tmp.path(), &format!("{n}.md"), &format!("# Doc {n}\n")))
            .collect();
        let docs = load_documents(&paths).unwrap();
        let titles: Vec<String> = docs.iter().map(|d| d.title.clone()).collect();
        let expected: Vec<String> = (0..8).map(|n| format!("Doc {n}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn one_bad_document_fails_the_batch() {
        let tmp = TempDir::new().unwrap();
        let good = write(tmp.path(), "good.md", "# Good\n");
        let bad = write(tmp.path(), "bad.md", "# Bad\n\n## wrong level\n");
        let result = load_documents(&[good, bad]);
        assert!(matches!(
            result,
            Err(LoadError::Parse {
                source: ParseError::ExpectedSection { .. },
                ..
            })
        ));
    }

    #[test]
    fn first_failure_in_input_order_is_reported() {
        let tmp = TempDir::new().unwrap();
        let mut paths: Vec<PathBuf> = (0..8)
            .map(|n| write(tmp.path(), &format!("{n}.md"), &format!("# Doc {n}\n")))
            .collect();
        let missing = tmp.path().join("missing.md");
        paths.insert(3, missing.clone());
        paths.push(write(tmp.path(), "bad.md", "no title here\n"));

        match load_documents(&paths) {
            Err(LoadError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    // =========================================================================
    // expand_inputs
    // =========================================================================

    #[test]
    fn directories_are_walked_for_markdown() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b.md", "# B\n");
        write(tmp.path(), "a.md", "# A\n");
        write(tmp.path(), "notes.txt", "ignored");
        write(tmp.path(), "nested/c.MD", "# C\n");

        let files = expand_inputs(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(tmp.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.md", "b.md", "nested/c.MD"]);
    }

    #[test]
    fn files_pass_through_in_given_order() {
        let inputs = vec![PathBuf::from("z.md"), PathBuf::from("a.md")];
        assert_eq!(expand_inputs(&inputs).unwrap(), inputs);
    }

    // =========================================================================
    // Fixture tests
    // =========================================================================

    #[test]
    fn fixture_directory_loads() {
        use crate::test_helpers::*;
        let tmp = setup_fixtures();
        let files = expand_inputs(&[tmp.path().to_path_buf()]).unwrap();
        let docs = load_documents(&files).unwrap();
        assert_eq!(docs.len(), 4);

        let recent = find_document(&docs, "Recent Llama Sightings");
        assert_eq!(
            section_titles(recent),
            vec![
                "2 Llamas Spotted Near Mall",
                "A Possible Llama Under the Bridge",
                "Llama Sighting at the Library",
            ]
        );
        let bridge = find_section(recent, "A Possible Llama Under the Bridge");
        assert_eq!(
            bridge.properties.get("witness").unwrap().values(),
            vec!["Jim", "Sadie"]
        );

        let ancient = find_document(&docs, "Ancient Llama Sightings");
        assert!(ancient.preamble.is_empty());
    }
}
