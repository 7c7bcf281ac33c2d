//! Output formats built from parsed documents.
//!
//! | Module | Output |
//! |--------|--------|
//! | [`markdown`] | Feedmark text again, re-parseable to an equal document |
//! | [`json`] | `{"documents": [...]}` projection |
//! | [`html`] | Full documents, or a snippet list of the newest entries |
//! | [`atom`] | Atom 1.0 feed of the newest entries |
//! | [`toc`] | Markdown list linking to each document |
//!
//! Renderers only read the document tree.

pub mod atom;
pub mod html;
pub mod json;
pub mod markdown;
pub mod toc;

use crate::model::DateError;
use thiserror::Error;

pub use atom::FeedError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Date error: {0}")]
    Date(#[from] DateError),
}
