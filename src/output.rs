//! CLI output formatting for human-readable reports.
//!
//! Machine-readable output (JSON, Markdown, HTML, Atom) goes to stdout via
//! the renderers. This module covers the text meant for people: the document
//! inventory printed by `inspect`, and the summaries printed alongside the
//! JSON of `check` and `links --check-local`.
//!
//! # Entity Display Contract
//!
//! Every entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + title (+ optional count)
//! 2. **Context lines**: indented `Source:`, `Date:`, `Properties:`, etc.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! 001 Recent Llama Sightings (2 sections)
//!     Source: Recent Llama Sightings.md
//!     Properties: author, url
//!     001 2 Llamas Spotted Near Mall
//!         Date: 2024-01-01 10:00:00
//!         Properties: date
//!     002 A Possible Llama Under the Bridge
//!         Date: 1984-01-01 12:00:00
//!         Properties: date, link
//!         Images: 1
//!
//! Inspected 1 document, 2 sections
//! ```
//!
//! ## Check
//!
//! ```text
//! Ill-formed Llama Sightings
//!     Definite llama sighting with no date
//!         extra: excuse
//!         missing: date
//!
//! 1 section failed the schema
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes it out. Format functions
//! are pure: no I/O, no side effects.

use crate::links::LinkFailure;
use crate::model::{Document, Properties, Section};
use crate::schema::{DiscrepancyKind, SectionReport};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional section count.
///
/// ```text
/// 001 Recent Llama Sightings (3 sections)
/// 002 2 Llamas Spotted Near Mall
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "section")),
        None => format!("{} {}", format_index(index), title),
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn property_keys(properties: &Properties) -> String {
    properties.keys().collect::<Vec<_>>().join(", ")
}

// ============================================================================
// Inspect
// ============================================================================

/// Inventory of documents and their sections.
pub fn format_inspect_output(documents: &[Document]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut section_total = 0;

    for (i, document) in documents.iter().enumerate() {
        lines.push(entity_header(i + 1, &document.title, Some(document.sections.len())));
        if let Some(filename) = &document.filename {
            lines.push(format!("{}Source: {}", indent(1), filename));
        }
        if !document.properties.is_empty() {
            lines.push(format!(
                "{}Properties: {}",
                indent(1),
                property_keys(&document.properties)
            ));
        }
        for (j, section) in document.sections.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), entity_header(j + 1, &section.title, None)));
            lines.extend(section_context(section));
        }
        section_total += document.sections.len();
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Inspected {}, {}",
        plural(documents.len(), "document"),
        plural(section_total, "section")
    ));
    lines
}

fn section_context(section: &Section) -> Vec<String> {
    let mut lines = Vec::new();
    let date = match section.publication_date() {
        Ok(date) => date.to_string(),
        Err(e) => format!("({e})"),
    };
    lines.push(format!("{}Date: {}", indent(2), date));
    if !section.properties.is_empty() {
        lines.push(format!(
            "{}Properties: {}",
            indent(2),
            property_keys(&section.properties)
        ));
    }
    if !section.images.is_empty() {
        lines.push(format!("{}Images: {}", indent(2), section.images.len()));
    }
    lines
}

pub fn print_inspect_output(documents: &[Document]) {
    for line in format_inspect_output(documents) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Schema discrepancies grouped by document.
pub fn format_schema_report(reports: &[SectionReport]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_document: Option<&str> = None;

    for report in reports {
        if current_document != Some(report.document.as_str()) {
            lines.push(report.document.clone());
            current_document = Some(report.document.as_str());
        }
        lines.push(format!("{}{}", indent(1), report.section));
        for discrepancy in &report.result {
            let kind = match discrepancy.0 {
                DiscrepancyKind::Missing => "missing",
                DiscrepancyKind::Extra => "extra",
            };
            lines.push(format!("{}{}: {}", indent(2), kind, discrepancy.1));
        }
    }

    if reports.is_empty() {
        lines.push("All sections match the schema".to_string());
    } else {
        lines.push(String::new());
        let verb = if reports.len() == 1 { "section failed" } else { "sections failed" };
        lines.push(format!("{} {} the schema", reports.len(), verb));
    }
    lines
}

/// Writes to stderr, so the JSON report on stdout stays parseable.
pub fn print_schema_report(reports: &[SectionReport]) {
    for line in format_schema_report(reports) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Links
// ============================================================================

pub fn format_link_failures(failures: &[LinkFailure]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, failure) in failures.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), failure.url));
        if let Some(section) = &failure.section {
            lines.push(format!("{}Section: {}", indent(1), section));
        }
        lines.push(format!("{}Status: {}", indent(1), failure.status));
    }
    if failures.is_empty() {
        lines.push("All local links resolve".to_string());
    } else {
        lines.push(String::new());
        lines.push(format!("{} failed", plural(failures.len(), "link")));
    }
    lines
}

/// Writes to stderr, alongside the JSON failure list on stdout.
pub fn print_link_failures(failures: &[LinkFailure]) {
    for line in format_link_failures(failures) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::schema::Discrepancy;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn entity_header_with_count() {
        assert_eq!(entity_header(1, "Sightings", Some(3)), "001 Sightings (3 sections)");
        assert_eq!(entity_header(2, "Sightings", Some(1)), "002 Sightings (1 section)");
        assert_eq!(entity_header(3, "Bridge", None), "003 Bridge");
    }

    // =========================================================================
    // Inspect tests
    // =========================================================================

    #[test]
    fn inspect_lists_documents_and_sections() {
        let mut doc = parse(
            "# Sightings\n\n* author: A\n* url: u\n\n### Bridge\n\n![l](l.jpg)\n\n* date: Jan 1 1984 12:00:00\n* link: x\n\n### Undated\n",
        )
        .unwrap();
        doc.filename = Some("sightings.md".to_string());

        let lines = format_inspect_output(&[doc]);
        assert_eq!(lines[0], "001 Sightings (2 sections)");
        assert_eq!(lines[1], "    Source: sightings.md");
        assert_eq!(lines[2], "    Properties: author, url");
        assert_eq!(lines[3], "    001 Bridge");
        assert_eq!(lines[4], "        Date: 1984-01-01 12:00:00");
        assert_eq!(lines[5], "        Properties: date, link");
        assert_eq!(lines[6], "        Images: 1");
        assert_eq!(lines[7], "    002 Undated");
        assert!(lines[8].starts_with("        Date: (could not find 'date'"));
        assert_eq!(lines.last().unwrap(), "Inspected 1 document, 2 sections");
    }

    #[test]
    fn inspect_empty_batch() {
        assert_eq!(format_inspect_output(&[]), vec!["Inspected 0 documents, 0 sections"]);
    }

    // =========================================================================
    // Check tests
    // =========================================================================

    #[test]
    fn schema_report_groups_by_document() {
        let reports = vec![
            SectionReport {
                document: "Ill-formed".to_string(),
                section: "No date".to_string(),
                result: vec![
                    Discrepancy(DiscrepancyKind::Extra, "excuse".to_string()),
                    Discrepancy(DiscrepancyKind::Missing, "date".to_string()),
                ],
            },
            SectionReport {
                document: "Ill-formed".to_string(),
                section: "No location".to_string(),
                result: vec![Discrepancy(DiscrepancyKind::Missing, "location".to_string())],
            },
        ];
        let lines = format_schema_report(&reports);
        assert_eq!(
            lines,
            vec![
                "Ill-formed",
                "    No date",
                "        extra: excuse",
                "        missing: date",
                "    No location",
                "        missing: location",
                "",
                "2 sections failed the schema",
            ]
        );
    }

    #[test]
    fn schema_report_all_clear() {
        assert_eq!(format_schema_report(&[]), vec!["All sections match the schema"]);
    }

    // =========================================================================
    // Link tests
    // =========================================================================

    #[test]
    fn link_failures_listed() {
        let failures = vec![LinkFailure {
            status: "Local file \"x.md\" does not exist".to_string(),
            url: "x.md".to_string(),
            section: Some("Bridge".to_string()),
        }];
        let lines = format_link_failures(&failures);
        assert_eq!(lines[0], "001 x.md");
        assert_eq!(lines[1], "    Section: Bridge");
        assert_eq!(lines[2], "    Status: Local file \"x.md\" does not exist");
        assert_eq!(lines.last().unwrap(), "1 link failed");
    }
}
