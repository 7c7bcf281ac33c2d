//! Line classification for the Feedmark grammar.
//!
//! Every predicate is a pure function of a single line backed by a fixed
//! pattern. Patterns are compiled once, on first use.
//!
//! | Kind | Shape |
//! |------|-------|
//! | heading | `# ...`, `### ...` (any line starting with `#`) |
//! | reference link | `[name]: url` |
//! | property | `* key: value` or `* key @ value` |
//! | image | `![alt](url)` and nothing else |
//! | blank | whitespace only |
//!
//! Where shapes overlap, [`classify`] resolves in the order
//! heading > reference link > property > image > blank > body.

use regex::Regex;
use std::sync::LazyLock;

static BLANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*$").unwrap());

static PROPERTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\s+(\S.*?)\s*([:@])\s*(.*?)\s*$").unwrap());

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[(.*?)\]\((.*?)\)\s*$").unwrap());

static UNTERMINATED_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[[^\]]*\]\([^)]*$").unwrap());

static REFERENCE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]:\s*(.*?)\s*$").unwrap());

static ATX_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*([^#].*?)\s*$").unwrap());

static SETEXT_UNDERLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^=+\s*$").unwrap());

static SECTION_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^###\s*([^#].*?)\s*$").unwrap());

/// Structural role of a line, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    ReferenceLink,
    Property,
    Image,
    Blank,
    Body,
}

/// Separator used on a property line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// `key: value`
    Scalar,
    /// `key @ value`
    ListItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLine<'a> {
    pub key: &'a str,
    pub kind: PropertyKind,
    pub value: &'a str,
}

pub fn classify(line: &str) -> LineKind {
    if is_heading(line) {
        LineKind::Heading
    } else if is_reference_link(line) {
        LineKind::ReferenceLink
    } else if is_property(line) {
        LineKind::Property
    } else if is_image(line) {
        LineKind::Image
    } else if is_blank(line) {
        LineKind::Blank
    } else {
        LineKind::Body
    }
}

pub fn is_blank(line: &str) -> bool {
    BLANK_RE.is_match(line)
}

pub fn is_property(line: &str) -> bool {
    PROPERTY_RE.is_match(line)
}

pub fn is_image(line: &str) -> bool {
    IMAGE_RE.is_match(line)
}

pub fn is_heading(line: &str) -> bool {
    line.starts_with('#')
}

pub fn is_reference_link(line: &str) -> bool {
    REFERENCE_LINK_RE.is_match(line)
}

/// `![alt](url` with the closing parenthesis missing. Such a line cannot be
/// anything but a broken image.
pub fn is_unterminated_image(line: &str) -> bool {
    UNTERMINATED_IMAGE_RE.is_match(line.trim_end())
}

pub fn property(line: &str) -> Option<PropertyLine<'_>> {
    let caps = PROPERTY_RE.captures(line)?;
    let kind = match &caps[2] {
        ":" => PropertyKind::Scalar,
        _ => PropertyKind::ListItem,
    };
    Some(PropertyLine {
        key: caps.get(1)?.as_str(),
        kind,
        value: caps.get(3)?.as_str(),
    })
}

/// `(alt, url)` of an image line.
pub fn image(line: &str) -> Option<(&str, &str)> {
    let caps = IMAGE_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// `(name, url)` of a reference-link line.
pub fn reference_link(line: &str) -> Option<(&str, &str)> {
    let caps = REFERENCE_LINK_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Title text of a `# Title` line, if non-empty.
pub fn atx_title(line: &str) -> Option<&str> {
    non_empty_capture(&ATX_TITLE_RE, line)
}

pub fn is_setext_underline(line: &str) -> bool {
    SETEXT_UNDERLINE_RE.is_match(line)
}

/// Title text of a `### Title` line. Other heading levels do not match.
pub fn section_heading(line: &str) -> Option<&str> {
    non_empty_capture(&SECTION_HEADING_RE, line)
}

fn non_empty_capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    let title = re.captures(line)?.get(1)?.as_str().trim();
    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_property() {
        let p = property("* author: Alfred J. Prufrock").unwrap();
        assert_eq!(p.key, "author");
        assert_eq!(p.kind, PropertyKind::Scalar);
        assert_eq!(p.value, "Alfred J. Prufrock");
    }

    #[test]
    fn value_may_contain_colons() {
        let p = property("*   url: http://example.com/llama.xml  ").unwrap();
        assert_eq!(p.key, "url");
        assert_eq!(p.value, "http://example.com/llama.xml");
    }

    #[test]
    fn list_property() {
        let p = property("*   link @ http://example.com/a").unwrap();
        assert_eq!(p.key, "link");
        assert_eq!(p.kind, PropertyKind::ListItem);
        assert_eq!(p.value, "http://example.com/a");
    }

    #[test]
    fn multi_word_key() {
        let p = property("* publication date: Jan 1 1984 12:00:00").unwrap();
        assert_eq!(p.key, "publication date");
        assert_eq!(p.value, "Jan 1 1984 12:00:00");
    }

    #[test]
    fn bullet_without_separator_is_not_a_property() {
        assert!(!is_property("* just a bullet point"));
        assert!(!is_property("*emphasis*: nope"));
    }

    #[test]
    fn image_must_stand_alone() {
        assert_eq!(
            image("![a llama](http://example.com/llama.jpg)"),
            Some(("a llama", "http://example.com/llama.jpg"))
        );
        assert!(!is_image("![a llama](llama.jpg) seen here"));
        assert!(!is_unterminated_image("![a llama](llama.jpg) seen here"));
        assert!(is_unterminated_image("![a llama](http://example.com"));
    }

    #[test]
    fn reference_link_shape() {
        assert_eq!(
            reference_link("[Llama Club]: http://example.com/club"),
            Some(("Llama Club", "http://example.com/club"))
        );
        assert!(!is_reference_link("[not a ref] at all"));
    }

    #[test]
    fn titles_and_headings() {
        assert_eq!(atx_title("# Recent Llama Sightings"), Some("Recent Llama Sightings"));
        assert_eq!(atx_title("## Second level"), None);
        assert_eq!(atx_title("#   "), None);
        assert_eq!(section_heading("### 2 Llamas Spotted"), Some("2 Llamas Spotted"));
        assert_eq!(section_heading("#### Too deep"), None);
        assert_eq!(section_heading("## Too shallow"), None);
        assert!(is_setext_underline("======"));
        assert!(!is_setext_underline("== x"));
    }

    #[test]
    fn classification_priority() {
        assert_eq!(classify("### Heading"), LineKind::Heading);
        assert_eq!(classify("[a]: http://x"), LineKind::ReferenceLink);
        assert_eq!(classify("* k: v"), LineKind::Property);
        assert_eq!(classify("![x](y)"), LineKind::Image);
        assert_eq!(classify("   "), LineKind::Blank);
        assert_eq!(classify("They were near the food court."), LineKind::Body);
    }
}
