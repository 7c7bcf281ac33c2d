//! HTML output.
//!
//! Two shapes:
//!
//! - [`render_document`]: one document as an HTML fragment (or a full page
//!   with [`HtmlOptions::standalone`]). Each section heading carries the
//!   anchor from [`anchor_for`](crate::naming::anchor_for) as its `id`, so
//!   refdex links of the form `file#anchor` land on it.
//! - [`render_snippet`]: a `<ul>` of the newest sections across a batch,
//!   suitable for embedding in a front page.
//!
//! Markdown inside bodies and property values is converted with
//! `pulldown-cmark`; the surrounding markup is built with `maud`.

use super::RenderError;
use crate::model::{Document, PropertyValue, SectionRef, collect_sections};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use regex::Regex;
use std::sync::LazyLock;

static OUTER_P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<p>\s*(.*?)\s*</p>\s*$").unwrap());

const CSS: &str = "\
body { max-width: 46em; margin: 2em auto; padding: 0 1em; font-family: sans-serif; line-height: 1.5; }
ul.properties { list-style: none; padding-left: 0; color: #555; }
img { max-width: 100%; }
";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Wrap the output in `<!DOCTYPE html>` page chrome.
    pub standalone: bool,
}

pub fn render_document(document: &Document, options: HtmlOptions) -> String {
    // Reference links may be defined anywhere in the document and used in any
    // section, so every body is converted with all definitions in scope.
    let definitions: String = document
        .reference_links
        .iter()
        .chain(document.sections.iter().flat_map(|s| &s.reference_links))
        .map(|link| format!("[{}]: {}\n", link.name, link.url))
        .collect();

    let content = html! {
        article.feedmark {
            h1 { (document.title) }
            @if !document.properties.is_empty() {
                (properties_list(document.properties.iter()))
            }
            (PreEscaped(markdown_to_html(&with_definitions(&document.preamble.join("\n"), &definitions))))
            @for entry in &document.sections {
                section {
                    h3 id=(entry.anchor()) { (entry.title) }
                    @for image in &entry.images {
                        p { img src=(image.url) alt=(image.alt); }
                    }
                    @if !entry.properties.is_empty() {
                        (properties_list(entry.properties.iter()))
                    }
                    (PreEscaped(markdown_to_html(&with_definitions(&entry.body(), &definitions))))
                }
            }
        }
    };

    if options.standalone {
        base_document(&document.title, content).into_string()
    } else {
        content.into_string()
    }
}

/// `<ul>` of the newest sections, `limit` at most.
///
/// Each item reads `{date}: {summary}`, where summary is the section's
/// `summary` property rendered inline, falling back to its title, and is
/// followed by a "Read more" link when the section has an entry URL.
pub fn render_snippet(documents: &[Document], limit: Option<usize>) -> Result<String, RenderError> {
    let sections = collect_sections(documents)?;
    let take = limit.unwrap_or(sections.len());
    let mut items = Vec::new();
    for section_ref in sections.into_iter().take(take) {
        items.push(snippet_item(section_ref)?);
    }
    let markup = html! {
        ul {
            @for item in &items {
                li { (PreEscaped(item)) }
            }
        }
    };
    Ok(markup.into_string())
}

fn snippet_item(section_ref: SectionRef<'_>) -> Result<String, RenderError> {
    let section = section_ref.section;
    let date = section.publication_date()?.format("%b %-d, %Y");
    let summary = match section.properties.get_scalar("summary") {
        Some(summary) => strip_outer_p(&markdown_to_html(summary)).to_string(),
        None => html! { (section.title) }.into_string(),
    };
    let item = match entry_url(section_ref) {
        Some(url) => {
            let read_more = html! { a href=(url) { "Read more..." } };
            format!("{date}: {summary} {}", read_more.into_string())
        }
        None => format!("{date}: {summary}"),
    };
    Ok(item)
}

/// Where a section can be read in full.
///
/// A document property `link-to-anchors-on` names the page the document is
/// published at, and the section's anchor is appended. Otherwise a section's
/// own `link` property is used, if it has one.
pub fn entry_url(section_ref: SectionRef<'_>) -> Option<String> {
    let SectionRef { document, section } = section_ref;
    if let Some(base) = document.properties.get_scalar("link-to-anchors-on") {
        return Some(format!("{}#{}", base, section.anchor()));
    }
    section.properties.get_scalar("link").map(str::to_string)
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Drop a single enclosing `<p>...</p>`, for inline use of a rendered value.
pub fn strip_outer_p(html: &str) -> &str {
    OUTER_P_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map_or(html, |m| m.as_str())
}

fn with_definitions(markdown: &str, definitions: &str) -> String {
    if definitions.is_empty() {
        markdown.to_string()
    } else {
        format!("{markdown}\n\n{definitions}")
    }
}

fn properties_list<'a>(properties: impl Iterator<Item = (&'a str, &'a PropertyValue)>) -> Markup {
    html! {
        ul.properties {
            @for (key, value) in properties {
                @for item in value.values() {
                    li {
                        strong { (key) } ": "
                        (PreEscaped(strip_outer_p(&markdown_to_html(item))))
                    }
                }
            }
        }
    }
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}
