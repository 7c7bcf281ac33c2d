//! Recursive-descent builder for Feedmark documents.
//!
//! ```text
//! Document   ::= Title Properties Preamble Section*
//! Section    ::= BlankLine* Heading(level=3) Image* Properties Body
//! Properties ::= (BlankLine | PropertyLine)*
//! Preamble   ::= BodyLine* ReferenceLinkBlock?
//! Body       ::= BodyLine* ReferenceLinkBlock?
//! ```
//!
//! There is no recovery: the first grammar violation aborts the parse with a
//! [`ParseError`] naming the offending line.

use crate::grammar::{self, LineKind, PropertyKind, PropertyLine};
use crate::model::{Document, Image, Properties, ReferenceLink, Section};
use crate::scanner::LineScanner;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected a title (`# Title`, or a line underlined with `=`)")]
    MissingTitle { line: usize },
    #[error("line {line}: property '{key}' already given")]
    DuplicateProperty { key: String, line: usize },
    #[error("line {line}: expected section (`### Title`), found {found:?}")]
    ExpectedSection { line: usize, found: String },
    #[error("line {line}: expected property, found {found:?}")]
    ExpectedProperty { line: usize, found: String },
    #[error("line {line}: malformed image {found:?}")]
    MalformedImage { line: usize, found: String },
    #[error("line {line}: unexpected end of input")]
    OutOfInput { line: usize },
}

/// Parse a complete Feedmark document.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    Parser::new(text).parse_document()
}

pub struct Parser<'a> {
    scanner: LineScanner<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            scanner: LineScanner::new(text),
        }
    }

    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let title = self.parse_title()?;
        let mut document = Document::new(title);
        document.properties = self.parse_properties()?;
        let (preamble, reference_links) = self.parse_body()?;
        document.preamble = preamble;
        document.reference_links = reference_links;

        loop {
            self.skip_blank_lines()?;
            if self.scanner.at_end() {
                break;
            }
            let section = self.parse_section()?;
            debug!(
                title = %section.title,
                properties = section.properties.len(),
                "parsed section"
            );
            document.sections.push(section);
        }

        debug!(
            title = %document.title,
            sections = document.sections.len(),
            "parsed document"
        );
        Ok(document)
    }

    /// `# Title`, or a text line followed by a line of `=`.
    fn parse_title(&mut self) -> Result<String, ParseError> {
        let missing = ParseError::MissingTitle {
            line: self.scanner.line_number(),
        };
        let line = self.scanner.current().ok_or_else(|| missing.clone())?;

        if let Some(title) = grammar::atx_title(line) {
            self.scanner.advance()?;
            return Ok(title.to_string());
        }

        let underlined = self
            .scanner
            .peek()
            .is_some_and(grammar::is_setext_underline);
        let title = line.trim();
        if underlined && !title.is_empty() && !grammar::is_heading(line) {
            self.scanner.advance()?;
            self.scanner.advance()?;
            return Ok(title.to_string());
        }

        Err(missing)
    }

    /// Consume blank and property lines until anything else appears.
    pub fn parse_properties(&mut self) -> Result<Properties, ParseError> {
        let mut properties = Properties::new();
        while let Some(line) = self.scanner.current() {
            if grammar::is_blank(line) {
                self.scanner.advance()?;
                continue;
            }
            if !grammar::is_property(line) {
                break;
            }
            let line_number = self.scanner.line_number();
            let PropertyLine { key, kind, value } = self.parse_property()?;
            let added = match kind {
                PropertyKind::Scalar => properties.insert_scalar(key, value),
                PropertyKind::ListItem => properties.push_list(key, value),
            };
            added.map_err(|_| ParseError::DuplicateProperty {
                key: key.to_string(),
                line: line_number,
            })?;
        }
        Ok(properties)
    }

    /// Consume exactly one property line.
    pub fn parse_property(&mut self) -> Result<PropertyLine<'a>, ParseError> {
        let line = self.scanner.current().ok_or(ParseError::OutOfInput {
            line: self.scanner.line_number(),
        })?;
        let property = grammar::property(line).ok_or_else(|| ParseError::ExpectedProperty {
            line: self.scanner.line_number(),
            found: line.to_string(),
        })?;
        self.scanner.advance()?;
        Ok(property)
    }

    fn parse_section(&mut self) -> Result<Section, ParseError> {
        let line = self.scanner.current().ok_or(ParseError::OutOfInput {
            line: self.scanner.line_number(),
        })?;
        let title = grammar::section_heading(line).ok_or_else(|| ParseError::ExpectedSection {
            line: self.scanner.line_number(),
            found: line.to_string(),
        })?;
        self.scanner.advance()?;

        let mut section = Section::new(title);
        section.images = self.parse_images()?;
        section.properties = self.parse_properties()?;
        let (lines, reference_links) = self.parse_body()?;
        section.lines = lines;
        section.reference_links = reference_links;
        Ok(section)
    }

    fn parse_images(&mut self) -> Result<Vec<Image>, ParseError> {
        let mut images = Vec::new();
        while let Some(line) = self.scanner.current() {
            if grammar::is_blank(line) {
                self.scanner.advance()?;
                continue;
            }
            if let Some((alt, url)) = grammar::image(line) {
                images.push(Image {
                    alt: alt.to_string(),
                    url: url.to_string(),
                });
                self.scanner.advance()?;
                continue;
            }
            if grammar::is_unterminated_image(line) {
                return Err(ParseError::MalformedImage {
                    line: self.scanner.line_number(),
                    found: line.to_string(),
                });
            }
            break;
        }
        Ok(images)
    }

    /// Body lines up to the next heading or reference-link block, then that block.
    fn parse_body(&mut self) -> Result<(Vec<String>, Vec<ReferenceLink>), ParseError> {
        let mut lines = Vec::new();
        while let Some(line) = self.scanner.current() {
            match grammar::classify(line) {
                LineKind::Heading | LineKind::ReferenceLink => break,
                _ => {
                    lines.push(line.trim_end().to_string());
                    self.scanner.advance()?;
                }
            }
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let reference_links = self.parse_reference_links()?;
        Ok((lines, reference_links))
    }

    /// Reference-link lines, with blank lines allowed in between.
    fn parse_reference_links(&mut self) -> Result<Vec<ReferenceLink>, ParseError> {
        let mut links = Vec::new();
        while let Some(line) = self.scanner.current() {
            if let Some((name, url)) = grammar::reference_link(line) {
                links.push(ReferenceLink {
                    name: name.to_string(),
                    url: url.to_string(),
                });
            } else if !grammar::is_blank(line) {
                break;
            }
            self.scanner.advance()?;
        }
        Ok(links)
    }

    fn skip_blank_lines(&mut self) -> Result<(), ParseError> {
        while self.scanner.current().is_some_and(grammar::is_blank) {
            self.scanner.advance()?;
        }
        Ok(())
    }
}
