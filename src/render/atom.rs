//! Atom 1.0 feed of the newest sections.
//!
//! Feed-level metadata comes from document properties: every document in the
//! batch must declare `author` and `url`, and the last document's `title`,
//! `author` and `url` describe the feed. Each section becomes one entry whose
//! id is its document's `url` + `/` + the section title.
//!
//! Section dates carry no zone and are written as UTC.

use super::html::markdown_to_html;
use crate::model::{DateError, Document, collect_sections};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Document '{document}' has no '{key}' property, which a feed needs")]
    MissingProperty { document: String, key: &'static str },
    #[error("A feed needs at least one document")]
    NoDocuments,
    #[error("Date error: {0}")]
    Date(#[from] DateError),
}

struct FeedProperties<'a> {
    title: &'a str,
    author: &'a str,
    url: &'a str,
}

fn feed_properties(document: &Document) -> Result<FeedProperties<'_>, FeedError> {
    let require = |key: &'static str| {
        document
            .properties
            .get_scalar(key)
            .ok_or_else(|| FeedError::MissingProperty {
                document: document.title.clone(),
                key,
            })
    };
    Ok(FeedProperties {
        title: &document.title,
        author: require("author")?,
        url: require("url")?,
    })
}

/// Render the feed. At most `limit` entries, newest first.
///
/// `updated` is the feed's own timestamp, normally the current time.
pub fn render_feed(
    documents: &[Document],
    limit: Option<usize>,
    updated: DateTime<Utc>,
) -> Result<String, FeedError> {
    let mut feed = None;
    for document in documents {
        feed = Some(feed_properties(document)?);
    }
    let feed = feed.ok_or(FeedError::NoDocuments)?;

    let sections = collect_sections(documents)?;
    let take = limit.unwrap_or(sections.len());

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    xml.push_str(&format!("  <title>{}</title>\n", escape(feed.title)));
    xml.push_str(&format!("  <id>{}</id>\n", escape(feed.url)));
    xml.push_str(&format!("  <updated>{}</updated>\n", timestamp(updated)));
    xml.push_str(&format!(
        "  <author>\n    <name>{}</name>\n  </author>\n",
        escape(feed.author)
    ));
    xml.push_str(&format!(
        "  <link href=\"{}\" rel=\"self\"/>\n",
        escape(feed.url)
    ));

    let mut entries = 0;
    for section_ref in sections.into_iter().take(take) {
        let section = section_ref.section;
        // Validated for every document above.
        let url = section_ref
            .document
            .properties
            .get_scalar("url")
            .unwrap_or_default();
        let published = section.publication_date()?.and_utc();
        let summary = markdown_to_html(&section.body());

        xml.push_str("  <entry>\n");
        xml.push_str(&format!("    <title>{}</title>\n", escape(&section.title)));
        xml.push_str(&format!(
            "    <id>{}</id>\n",
            escape(&format!("{}/{}", url, section.title))
        ));
        xml.push_str(&format!("    <updated>{}</updated>\n", timestamp(published)));
        xml.push_str(&format!(
            "    <summary type=\"html\">{}</summary>\n",
            escape(&summary)
        ));
        xml.push_str("  </entry>\n");
        entries += 1;
    }
    xml.push_str("</feed>\n");

    info!(entries, title = feed.title, "rendered atom feed");
    Ok(xml)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
