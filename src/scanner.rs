//! Line-at-a-time cursor over the document text.

use crate::parser::ParseError;

/// Indexed sequence of lines with a single current position.
///
/// The grammar never needs more than one line of lookahead ([`peek`](Self::peek)),
/// which is only used to recognise Setext titles.
#[derive(Debug)]
pub struct LineScanner<'a> {
    lines: Vec<&'a str>,
    index: usize,
}

impl<'a> LineScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            index: 0,
        }
    }

    /// The line under the cursor, or `None` once every line has been consumed.
    pub fn current(&self) -> Option<&'a str> {
        self.lines.get(self.index).copied()
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.index + 1).copied()
    }

    pub fn advance(&mut self) -> Result<(), ParseError> {
        if self.at_end() {
            return Err(ParseError::OutOfInput {
                line: self.line_number(),
            });
        }
        self.index += 1;
        Ok(())
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.lines.len()
    }

    /// 1-based number of the current line (one past the last line at end).
    pub fn line_number(&self) -> usize {
        self.index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_line_then_ends() {
        let mut scanner = LineScanner::new("a\nb\n");
        assert_eq!(scanner.current(), Some("a"));
        assert_eq!(scanner.peek(), Some("b"));
        scanner.advance().unwrap();
        assert_eq!(scanner.current(), Some("b"));
        assert_eq!(scanner.line_number(), 2);
        scanner.advance().unwrap();
        assert!(scanner.at_end());
        assert_eq!(scanner.current(), None);
    }

    #[test]
    fn advance_past_end_is_out_of_input() {
        let mut scanner = LineScanner::new("only");
        scanner.advance().unwrap();
        assert!(matches!(
            scanner.advance(),
            Err(ParseError::OutOfInput { line: 2 })
        ));
    }

    #[test]
    fn crlf_lines() {
        let scanner = LineScanner::new("a\r\nb\r\n");
        assert_eq!(scanner.current(), Some("a"));
        assert_eq!(scanner.peek(), Some("b"));
    }

    #[test]
    fn empty_text_is_at_end() {
        let scanner = LineScanner::new("");
        assert!(scanner.at_end());
    }
}
