//! Markdown table of contents for a batch of documents.
//!
//! One bullet per document:
//!
//! ```text
//! *   [Recent Llama Sightings](Recent%20Llama%20Sightings.md) (3) *(U)* (Jan 2024)
//! ```
//!
//! The count is the number of sections. `*(U)*` appears when the document's
//! `status` is `under construction`. The trailing date is the month and year
//! found in its `publication-date` property (or the whole value, when no
//! month and year can be picked out).

use crate::model::Document;
use crate::naming::quote_filename;
use regex::Regex;
use std::sync::LazyLock;

static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+\s+\d\d\d\d)").unwrap());

pub fn render_toc(documents: &[Document]) -> String {
    documents.iter().map(toc_line).collect()
}

fn toc_line(document: &Document) -> String {
    let filename = quote_filename(document.filename.as_deref().unwrap_or_default());
    let mut signs = vec![format!("({})", document.sections.len())];

    if document.properties.get_scalar("status") == Some("under construction") {
        signs.push("*(U)*".to_string());
    }

    if let Some(pubdate) = document
        .properties
        .get_scalar("publication-date")
        .filter(|d| !d.is_empty())
    {
        let shown = MONTH_YEAR_RE
            .captures(pubdate)
            .and_then(|caps| caps.get(1))
            .map_or(pubdate, |m| m.as_str());
        signs.push(format!("({shown})"));
    }

    format!("*   [{}]({}) {}\n", document.title, filename, signs.join(" "))
}
