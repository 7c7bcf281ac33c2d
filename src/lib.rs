//! # Feedmark
//!
//! A Markdown subformat for curated lists of entries, and the tooling around
//! it. A Feedmark document is an ordinary Markdown file with a little extra
//! structure:
//!
//! ```text
//! Recent Llama Sightings           <- title (Setext or `# Title`)
//! ======================
//!
//! *   author: Alfred J. Prufrock   <- document properties
//! *   url: http://example.com/llama.xml
//!
//! Free-form preamble.
//!
//! ### 2 Llamas Spotted Near Mall   <- one section per entry
//!
//! ![two llamas](two-llamas.jpg)    <- images
//!
//! *   date: Jan 1 2024 10:00:00    <- section properties (`key: value`,
//! *   witness @ Jim                   or `key @ item` for lists)
//!
//! Section body, in Markdown.
//!
//! [Llama Club]: http://example.com/club   <- reference links
//! ```
//!
//! Because the structure is regular, a batch of documents can be checked
//! against a schema, turned into JSON, HTML, an Atom feed or a table of
//! contents, normalized back to Markdown, and cross-linked through a
//! reference index ("refdex").
//!
//! # Pipeline
//!
//! ```text
//! files ──► loader ──► parser ──► [refdex rewrite] ──► schema / links / render
//! ```
//!
//! Every output is a pure function of the parsed [`model::Document`]s, so the
//! renderers can be tested without touching the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scanner`] | Line cursor with one line of lookahead |
//! | [`grammar`] | Line classification: headings, properties, images, reference links |
//! | [`parser`] | Recursive-descent builder from text to [`model::Document`] |
//! | [`model`] | Documents, sections, properties, publication dates |
//! | [`loader`] | Reading files and directories into documents, in parallel |
//! | [`naming`] | Section anchors and filename quoting |
//! | [`schema`] | Property rules and ordering taken from a schema document |
//! | [`refdex`] | Reference index: building, reading, rewriting reference links |
//! | [`links`] | Link extraction and local link checking |
//! | [`render`] | JSON, Markdown, HTML, Atom and table-of-contents output |
//! | [`config`] | `feedmark.toml` loading, merging and validation |
//! | [`output`] | Human-readable CLI reports |
//!
//! # Design Decisions
//!
//! ## No Recovery
//!
//! The parser stops at the first line that does not fit the grammar and names
//! it. Feedmark files are hand-edited, and a precise error is more useful than
//! a best-effort document that silently lost an entry.
//!
//! ## Insertion-Ordered Properties
//!
//! Properties keep the order they were written in. Normalizing a document to
//! Markdown reproduces it unless a schema asks for a different order.

pub mod config;
pub mod grammar;
pub mod links;
pub mod loader;
pub mod model;
pub mod naming;
pub mod output;
pub mod parser;
pub mod refdex;
pub mod render;
pub mod scanner;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_helpers;
