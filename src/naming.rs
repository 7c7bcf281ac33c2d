//! Centralized naming rules for titles and filenames.
//!
//! Both the HTML renderer and the refdex builder must agree on how a section
//! title becomes a same-page anchor, and on how a document filename is quoted
//! into a link. Keeping the rules here means a cross-document link produced by
//! one module always resolves against the ids produced by another.
//!
//! ## Anchors
//!
//! - `2 Llamas Spotted Near Mall` → `2-llamas-spotted-near-mall`
//! - `Alfred's Llama: A Study` → `alfreds-llama-a-study`
//!
//! ## Filenames
//!
//! - `Recent Llama Sightings.md` → `Recent%20Llama%20Sightings.md`
//! - `llamas/2024 list.md` → `llamas/2024%20list.md` (`/` is kept)

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;

/// Bytes left alone when quoting a filename: `/` plus the RFC 3986 unreserved marks.
const FILENAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Same-page anchor for a section title.
///
/// Lower-cases, drops apostrophes and colons, and turns spaces into hyphens.
/// Nothing else is touched, so titles with other punctuation keep it.
pub fn anchor_for(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | ':'))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// Percent-encode a filename for use as a link target.
pub fn quote_filename(name: &str) -> String {
    utf8_percent_encode(name, FILENAME_SET).to_string()
}

/// Reverse of [`quote_filename`]. Invalid UTF-8 after decoding is replaced lossily.
pub fn unquote_filename(quoted: &str) -> Cow<'_, str> {
    percent_decode_str(quoted).decode_utf8_lossy()
}
