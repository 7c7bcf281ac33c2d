//! Feedmark text from a parsed document.
//!
//! The output is normalized (Setext title, `*   ` property bullets, one blank
//! line between blocks) and parses back to an equal [`Document`].

use crate::model::{Document, Image, Properties, PropertyValue, ReferenceLink};
use crate::schema::PropertyOrder;

/// Render `document` as Feedmark.
///
/// With an `order`, properties it names come first in that order; the rest
/// follow in the order they were written.
pub fn render_document(document: &Document, order: Option<&PropertyOrder>) -> String {
    let mut md = String::new();

    // A title beginning with `#` would read back as an ATX heading.
    if document.title.starts_with('#') {
        md.push_str(&format!("# {}\n", document.title));
    } else {
        md.push_str(&format!("{}\n", document.title));
        md.push_str(&format!("{}\n", "=".repeat(document.title.chars().count())));
    }
    md.push('\n');

    write_properties(&mut md, &document.properties, order);
    write_lines(&mut md, &document.preamble);
    write_reference_links(&mut md, &document.reference_links);

    for section in &document.sections {
        md.push('\n');
        md.push_str(&format!("### {}\n", section.title));
        md.push('\n');
        write_images(&mut md, &section.images);
        write_properties(&mut md, &section.properties, order);
        write_lines(&mut md, &section.lines);
        write_reference_links(&mut md, &section.reference_links);
    }
    md
}

fn write_properties(md: &mut String, properties: &Properties, order: Option<&PropertyOrder>) {
    if properties.is_empty() {
        return;
    }
    for (key, value) in ordered(properties, order) {
        match value {
            PropertyValue::Scalar(v) => {
                md.push_str(&format!("*   {key}: {v}\n"));
            }
            PropertyValue::List(items) => {
                for item in items {
                    md.push_str(&format!("*   {key} @ {item}\n"));
                }
            }
        }
    }
    md.push('\n');
}

fn ordered<'a>(
    properties: &'a Properties,
    order: Option<&PropertyOrder>,
) -> Vec<(&'a str, &'a PropertyValue)> {
    let mut entries: Vec<(&str, &PropertyValue)> = properties.iter().collect();
    if let Some(order) = order {
        // Stable: unranked keys keep insertion order after the ranked ones.
        entries.sort_by_key(|(key, _)| order.position(key).unwrap_or(usize::MAX));
    }
    entries
}

fn write_images(md: &mut String, images: &[Image]) {
    if images.is_empty() {
        return;
    }
    for image in images {
        md.push_str(&format!("![{}]({})\n", image.alt, image.url));
    }
    md.push('\n');
}

fn write_lines(md: &mut String, lines: &[String]) {
    for line in lines {
        md.push_str(line);
        md.push('\n');
    }
}

fn write_reference_links(md: &mut String, links: &[ReferenceLink]) {
    if links.is_empty() {
        return;
    }
    md.push('\n');
    for link in links {
        md.push_str(&format!("[{}]: {}\n", link.name, link.url));
    }
}
