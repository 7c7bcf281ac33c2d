//! The parsed document tree.
//!
//! A [`Document`] is built in one pass by the [`parser`](crate::parser) and is
//! read-only from then on. Renderers, the schema checker and the link
//! extractor all consume it by shared reference. The single exception is
//! [`refdex::rewrite_reference_links`](crate::refdex::rewrite_reference_links),
//! which replaces reference-link URLs in place after every document of a
//! batch has loaded.
//!
//! ## Section → Document relation
//!
//! Sections do not point back at their document. Code that needs both (feed
//! entries, snippets, schema reports) works with a [`SectionRef`], which
//! borrows the owning document alongside the section.
//!
//! ## Property values
//!
//! A property line chooses its value shape with its separator:
//!
//! ```text
//! *   date: Jan 1 1984 12:00:00     → PropertyValue::Scalar
//! *   link @ http://example.com/a   → PropertyValue::List (appends)
//! *   link @ http://example.com/b
//! ```

use crate::naming::anchor_for;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Accepted `date` property formats, tried in order.
///
/// A leading weekday (`Mon, `) is stripped before matching and never
/// checked against the date.
pub const DATE_FORMATS: &[&str] = &["%b %d %Y %H:%M:%S", "%d %b %Y %H:%M:%S GMT"];

static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+,\s*").unwrap());

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateError {
    #[error("could not find 'date' on section '{0}'")]
    MissingDateProperty(String),
    #[error("'date' of section '{section}' is not in a recognised format: {value:?}")]
    UnparseableDate { section: String, value: String },
}

/// Value of a single property key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Set once with `key: value`.
    Scalar(String),
    /// Accumulated from `key @ value` lines, in encounter order.
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            PropertyValue::List(_) => None,
        }
    }

    /// All string values: one for a scalar, every item for a list.
    pub fn values(&self) -> Vec<&str> {
        match self {
            PropertyValue::Scalar(s) => vec![s.as_str()],
            PropertyValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// Returned by [`Properties`] mutators when a key is set twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey;

/// Insertion-ordered property map.
///
/// Property blocks are small, so lookups are linear scans over a `Vec`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, PropertyValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Scalar value of `key`, or `None` if absent or list-valued.
    pub fn get_scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropertyValue::as_scalar)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a scalar. Fails if the key already exists in either shape.
    pub fn insert_scalar(&mut self, key: &str, value: &str) -> Result<(), DuplicateKey> {
        if self.contains_key(key) {
            return Err(DuplicateKey);
        }
        self.entries
            .push((key.to_string(), PropertyValue::Scalar(value.to_string())));
        Ok(())
    }

    /// Append to a list, creating it on first use. Fails if the key holds a scalar.
    pub fn push_list(&mut self, key: &str, value: &str) -> Result<(), DuplicateKey> {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, PropertyValue::List(items))) => {
                items.push(value.to_string());
                Ok(())
            }
            Some((_, PropertyValue::Scalar(_))) => Err(DuplicateKey),
            None => {
                self.entries
                    .push((key.to_string(), PropertyValue::List(vec![value.to_string()])));
                Ok(())
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// `![alt](url)` line directly under a section heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    #[serde(rename = "description")]
    pub alt: String,
    #[serde(rename = "source")]
    pub url: String,
}

/// `[name]: url` definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceLink {
    pub name: String,
    pub url: String,
}

/// One curated entry under a `### Title` heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub images: Vec<Image>,
    pub properties: Properties,
    pub lines: Vec<String>,
    pub reference_links: Vec<ReferenceLink>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            images: Vec::new(),
            properties: Properties::new(),
            lines: Vec::new(),
            reference_links: Vec::new(),
        }
    }

    /// Body text, lines joined with `\n`.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    pub fn anchor(&self) -> String {
        anchor_for(&self.title)
    }

    /// Parse the `date` property against [`DATE_FORMATS`], first match wins.
    pub fn publication_date(&self) -> Result<NaiveDateTime, DateError> {
        let value = self
            .properties
            .get_scalar("date")
            .ok_or_else(|| DateError::MissingDateProperty(self.title.clone()))?;
        let stripped = WEEKDAY_RE.replace(value, "");
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&stripped, format).ok())
            .ok_or_else(|| DateError::UnparseableDate {
                section: self.title.clone(),
                value: value.to_string(),
            })
    }
}

/// A whole Feedmark file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub properties: Properties,
    pub preamble: Vec<String>,
    pub reference_links: Vec<ReferenceLink>,
    pub sections: Vec<Section>,
    /// Set by the loader, never by the parser.
    pub filename: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            properties: Properties::new(),
            preamble: Vec::new(),
            reference_links: Vec::new(),
            sections: Vec::new(),
            filename: None,
        }
    }

    pub fn section_refs(&self) -> impl Iterator<Item = SectionRef<'_>> {
        self.sections.iter().map(move |section| SectionRef {
            document: self,
            section,
        })
    }

    pub fn find_section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// A section together with the document that owns it.
#[derive(Debug, Clone, Copy)]
pub struct SectionRef<'a> {
    pub document: &'a Document,
    pub section: &'a Section,
}

/// Every section of every document, newest publication date first.
///
/// Fails on the first section whose date is missing or unparseable, since
/// feed outputs cannot place such an entry.
pub fn collect_sections(documents: &[Document]) -> Result<Vec<SectionRef<'_>>, DateError> {
    let mut dated = Vec::new();
    for document in documents {
        for section_ref in document.section_refs() {
            let date = section_ref.section.publication_date()?;
            dated.push((date, section_ref));
        }
    }
    // Stable sort keeps document order among equal dates.
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(dated.into_iter().map(|(_, s)| s).collect())
}
