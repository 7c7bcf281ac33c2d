//! Link harvesting and local link checking.
//!
//! Links are gathered from everywhere a Feedmark document can hold a URL:
//!
//! 1. the document's own reference-link definitions,
//! 2. then per section: images, links inside property values, reference-link
//!    definitions, and links inside the body.
//!
//! Property values and bodies are Markdown, so their links are found by
//! walking `pulldown-cmark` events rather than by pattern matching.
//!
//! Only links into the local tree are verified. Checking remote URLs is left
//! to other tools.

use crate::model::Document;
use crate::naming::unquote_filename;
use pulldown_cmark::{Event, Parser, Tag};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
    /// Title of the section the link appears in; `None` for document-level links.
    pub section: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkFailure {
    pub status: String,
    pub url: String,
    pub section: Option<String>,
}

/// Every link of every document, in document order.
pub fn extract_links(documents: &[Document]) -> Vec<Link> {
    let mut links = Vec::new();
    for document in documents {
        for reference in &document.reference_links {
            links.push(Link {
                url: reference.url.clone(),
                section: None,
            });
        }
        for section in &document.sections {
            let mut push = |url: String| {
                links.push(Link {
                    url,
                    section: Some(section.title.clone()),
                })
            };
            for image in &section.images {
                push(image.url.clone());
            }
            for (_, value) in section.properties.iter() {
                for item in value.values() {
                    markdown_links(item).into_iter().for_each(&mut push);
                }
            }
            for reference in &section.reference_links {
                push(reference.url.clone());
            }
            markdown_links(&section.body())
                .into_iter()
                .for_each(&mut push);
        }
    }
    debug!(links = links.len(), "extracted links");
    links
}

/// Destinations of inline links and images in a Markdown fragment.
pub fn markdown_links(markdown: &str) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link { dest_url, .. }) | Event::Start(Tag::Image { dest_url, .. }) => {
                Some(dest_url.into_string())
            }
            _ => None,
        })
        .collect()
}

/// Links that point at files under `article_root` which do not exist.
///
/// Same-page links (`#anchor`) and `http(s)://` URLs are skipped. For the
/// rest, any `#fragment` is dropped and the remaining path percent-decoded.
pub fn check_local_links(links: &[Link], article_root: &Path) -> Vec<LinkFailure> {
    let mut failures = Vec::new();
    for link in links {
        let url = link.url.as_str();
        if url.starts_with('#') || url.starts_with("http://") || url.starts_with("https://") {
            continue;
        }
        let filename = url.split_once('#').map_or(url, |(file, _)| file);
        let path = article_root.join(unquote_filename(filename).as_ref());
        if !path.exists() {
            failures.push(LinkFailure {
                status: format!("Local file \"{}\" does not exist", path.display()),
                url: link.url.clone(),
                section: link.section.clone(),
            });
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::fs;
    use tempfile::TempDir;

    const DOC: &str = "\
# Sightings

See the [Llama Club][].

[Llama Club]: http://example.com/club

### Bridge

![llama](http://example.com/llama.jpg)

*   date: Jan 1 1984 12:00:00
*   source @ [report](http://example.com/report)
*   source @ no link here

Reported by [a local](http://example.com/local), also [a note](notes.md#bridge).

[map]: http://example.com/map
";

    #[test]
    fn extracts_in_document_order() {
        let doc = parse(DOC).unwrap();
        let links = extract_links(&[doc]);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://example.com/club",
                "http://example.com/llama.jpg",
                "http://example.com/report",
                "http://example.com/map",
                "http://example.com/local",
                "notes.md#bridge",
            ]
        );
        assert_eq!(links[0].section, None);
        assert_eq!(links[1].section.as_deref(), Some("Bridge"));
    }

    #[test]
    fn markdown_links_include_images() {
        let found = markdown_links("An ![img](a.png) and a [link](b.html).");
        assert_eq!(found, vec!["a.png", "b.html"]);
    }

    #[test]
    fn local_check_reports_missing_files_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Present File.md"), "# P\n").unwrap();

        let links: Vec<Link> = [
            "Present%20File.md#anchor",
            "Absent.md",
            "#same-page",
            "http://example.com/unchecked",
        ]
        .iter()
        .map(|url| Link {
            url: url.to_string(),
            section: Some("S".to_string()),
        })
        .collect();

        let failures = check_local_links(&links, tmp.path());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].url, "Absent.md");
        assert!(failures[0].status.contains("does not exist"));
        assert_eq!(failures[0].section.as_deref(), Some("S"));
    }
}
