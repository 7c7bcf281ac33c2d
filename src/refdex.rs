//! Reference index ("refdex"): a name → location map shared across documents.
//!
//! A refdex is a JSON object whose keys are reference-link names. Each value
//! is either an external URL or an anchor inside another Feedmark document:
//!
//! ```json
//! {
//!   "Llama Club": { "url": "http://example.com/club" },
//!   "2 Llamas Spotted Near Mall": {
//!     "filename": "Recent Llama Sightings.md",
//!     "anchor": "2-llamas-spotted-near-mall"
//!   }
//! }
//! ```
//!
//! The multi form lists every file a name appears in (`"filenames": [...]`);
//! converting back to the single form keeps the last one.
//!
//! Rewriting runs once every document of a batch has loaded, and is the only
//! operation that mutates a parsed [`Document`].

use crate::model::{Document, ReferenceLink};
use crate::naming::{anchor_for, quote_filename};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RefdexError {
    #[error("Could not read refdex JSON from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not read refdex JSON from {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Component of refdex {path} not suitable: {key:?}: {reason}")]
    Malformed {
        path: PathBuf,
        key: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RefdexEntry {
    Url { url: String },
    Anchor { filename: String, anchor: String },
}

impl RefdexEntry {
    /// Link target: the URL itself, or `quoted-filename#anchor`.
    pub fn target(&self) -> String {
        match self {
            RefdexEntry::Url { url } => url.clone(),
            RefdexEntry::Anchor { filename, anchor } => {
                format!("{}#{}", quote_filename(filename), anchor)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MultiRefdexEntry {
    Url { url: String },
    Anchors { filenames: Vec<String>, anchor: String },
}

pub type Refdex = BTreeMap<String, RefdexEntry>;
pub type MultiRefdex = BTreeMap<String, MultiRefdexEntry>;

/// On-disk shape before validation; every field is optional so a bad entry
/// can be reported by key rather than as an opaque serde error.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    url: Option<String>,
    filename: Option<String>,
    filenames: Option<Vec<String>>,
    anchor: Option<String>,
}

impl RawEntry {
    fn validate(self) -> Result<MultiRefdexEntry, String> {
        match (self.url, self.filename, self.filenames, self.anchor) {
            (Some(url), None, None, None) => Ok(MultiRefdexEntry::Url { url }),
            (None, Some(filename), None, Some(anchor)) => Ok(MultiRefdexEntry::Anchors {
                filenames: vec![filename],
                anchor,
            }),
            (None, None, Some(filenames), Some(anchor)) => {
                Ok(MultiRefdexEntry::Anchors { filenames, anchor })
            }
            (Some(_), _, _, _) => Err("'url' must be the only field".to_string()),
            (None, Some(_), Some(_), _) => {
                Err("'filename' and 'filenames' are mutually exclusive".to_string())
            }
            _ => Err("expected either 'url' or 'anchor' with 'filename' or 'filenames'".to_string()),
        }
    }
}

/// Read and merge refdex files. Keys in later files replace earlier ones.
///
/// Files may be in either the single or the multi form. `filename_prefix` is
/// prepended to every anchor entry's filename, for refdexes built relative
/// to a different directory.
pub fn read_refdex_from(
    paths: &[PathBuf],
    filename_prefix: Option<&str>,
) -> Result<Refdex, RefdexError> {
    let mut refdex = Refdex::new();
    for path in paths {
        let local = read_one(path, filename_prefix)?;
        debug!(path = %path.display(), entries = local.len(), "read refdex");
        refdex.extend(local);
    }
    Ok(refdex)
}

fn read_one(path: &Path, filename_prefix: Option<&str>) -> Result<Refdex, RefdexError> {
    let text = fs::read_to_string(path).map_err(|source| RefdexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: BTreeMap<String, RawEntry> =
        serde_json::from_str(&text).map_err(|source| RefdexError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut multi = MultiRefdex::new();
    for (key, raw_entry) in raw {
        let mut entry = raw_entry.validate().map_err(|reason| RefdexError::Malformed {
            path: path.to_path_buf(),
            key: key.clone(),
            reason,
        })?;
        if let (Some(prefix), MultiRefdexEntry::Anchors { filenames, .. }) =
            (filename_prefix, &mut entry)
        {
            for filename in filenames.iter_mut() {
                filename.insert_str(0, prefix);
            }
        }
        multi.insert(key, entry);
    }
    Ok(to_single(&multi))
}

/// Point the document's reference links at the locations recorded in `refdex`.
///
/// Applies to the preamble's links and to every section's. Names not in the
/// refdex keep their URL. Within one list a repeated name keeps only its first
/// definition. Returns how many links were rewritten.
pub fn rewrite_reference_links(document: &mut Document, refdex: &Refdex) -> usize {
    let mut rewritten = rewrite_list(&mut document.reference_links, refdex);
    for section in &mut document.sections {
        rewritten += rewrite_list(&mut section.reference_links, refdex);
    }
    debug!(title = %document.title, rewritten, "rewrote reference links");
    rewritten
}

fn rewrite_list(links: &mut Vec<ReferenceLink>, refdex: &Refdex) -> usize {
    let mut seen = HashSet::new();
    links.retain(|link| seen.insert(link.name.clone()));

    let mut rewritten = 0;
    for link in links.iter_mut() {
        if let Some(entry) = refdex.get(&link.name) {
            link.url = entry.target();
            rewritten += 1;
        }
    }
    rewritten
}

/// Index every section title of `documents` by filename and anchor.
///
/// When two sections share a title the first one loaded wins.
pub fn build_refdex(documents: &[Document]) -> Refdex {
    let mut refdex = Refdex::new();
    for document in documents {
        let filename = document.filename.clone().unwrap_or_default();
        for section in &document.sections {
            if let Some(existing) = refdex.get(&section.title) {
                warn!(
                    title = %section.title,
                    kept = ?existing,
                    ignored = %filename,
                    "section title already indexed"
                );
                continue;
            }
            refdex.insert(
                section.title.clone(),
                RefdexEntry::Anchor {
                    filename: filename.clone(),
                    anchor: anchor_for(&section.title),
                },
            );
        }
    }
    refdex
}

pub fn to_multi(refdex: &Refdex) -> MultiRefdex {
    refdex
        .iter()
        .map(|(key, entry)| {
            let multi = match entry {
                RefdexEntry::Url { url } => MultiRefdexEntry::Url { url: url.clone() },
                RefdexEntry::Anchor { filename, anchor } => MultiRefdexEntry::Anchors {
                    filenames: vec![filename.clone()],
                    anchor: anchor.clone(),
                },
            };
            (key.clone(), multi)
        })
        .collect()
}

/// Collapse a multi refdex, keeping the last filename of each entry.
/// Entries with no filenames at all are dropped.
pub fn to_single(multi: &MultiRefdex) -> Refdex {
    let mut refdex = Refdex::new();
    for (key, entry) in multi {
        let single = match entry {
            MultiRefdexEntry::Url { url } => RefdexEntry::Url { url: url.clone() },
            MultiRefdexEntry::Anchors { filenames, anchor } => match filenames.last() {
                Some(filename) => RefdexEntry::Anchor {
                    filename: filename.clone(),
                    anchor: anchor.clone(),
                },
                None => {
                    warn!(key = %key, "multi refdex entry has no filenames");
                    continue;
                }
            },
        };
        refdex.insert(key.clone(), single);
    }
    refdex
}
