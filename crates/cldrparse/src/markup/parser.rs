//! Recursive-descent markup parser
//!
//! Produces the [`Node`] tree consumed by the flattener. Comments,
//! processing instructions, DOCTYPE declarations and CDATA sections are
//! skipped; entities are decoded; character data directly under an element
//! accumulates into its `text` field.

use indexmap::IndexMap;

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result};
use crate::markup::model::{Document, Node};

/// Configuration for the markup parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// Markup parser with depth and size limits
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
        }
    }

    /// Parse a complete document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size != 0 && self.cursor.len() > self.config.max_size {
            return Err(self.error_here(ErrorKind::MaxSizeExceeded {
                max: self.config.max_size,
            }));
        }

        self.cursor.skip_whitespace();
        let root = self.parse_element(0)?;
        self.cursor.skip_whitespace();

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::TrailingContent));
        }

        Ok(Document { root })
    }

    fn parse_element(&mut self, depth: u16) -> Result<Node> {
        if self.config.max_depth != 0 && depth >= self.config.max_depth {
            return Err(self.error_here(ErrorKind::MaxDepthExceeded {
                max: self.config.max_depth,
            }));
        }

        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'?') {
            self.skip_processing_instruction()?;
            self.cursor.skip_whitespace();
            return self.parse_element(depth);
        }

        if self.cursor.current() == Some(b'!') {
            self.skip_declaration_or_comment()?;
            self.cursor.skip_whitespace();
            return self.parse_element(depth);
        }

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here(ErrorKind::UnexpectedClosingTag));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        let mut node = Node {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        };

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            return Ok(node);
        }

        self.expect_byte(b'>')?;
        self.parse_content(&mut node, depth)?;
        Ok(node)
    }

    fn parse_content(&mut self, node: &mut Node, depth: u16) -> Result<()> {
        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnterminatedElement {
                    name: node.name.clone(),
                }));
            }

            if self.cursor.current() == Some(b'<') && self.cursor.peek(1) == Some(b'/') {
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != node.name {
                    return Err(self.error_here(ErrorKind::MismatchedClosingTag {
                        expected: node.name.clone(),
                        found: close_name,
                    }));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                return Ok(());
            }

            if self.cursor.current() == Some(b'<') {
                match self.cursor.peek(1) {
                    Some(b'?') => {
                        self.cursor.advance();
                        self.skip_processing_instruction()?;
                    }
                    Some(b'!') => {
                        self.cursor.advance();
                        self.skip_declaration_or_comment()?;
                    }
                    _ => {
                        let child = self.parse_element(depth.saturating_add(1))?;
                        node.children.push(child);
                    }
                }
                continue;
            }

            if let Some(text) = self.parse_text()? {
                node.text.push_str(&text);
            }
        }
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here(ErrorKind::DuplicateAttribute { name }));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b @ (b'"' | b'\'')) => b,
            _ => return Err(self.error_here(ErrorKind::UnexpectedByte)),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = self.bytes_to_string(raw)?;
                return self.decode_entities(&text);
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnterminatedAttributeValue))
    }

    fn parse_text(&mut self) -> Result<Option<String>> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = self.bytes_to_string(raw)?;
        let text = self.decode_entities(&text)?;

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        let Some(first) = self.cursor.current() else {
            return Err(self.error_here(ErrorKind::UnexpectedEof));
        };
        if !is_name_start(first) {
            return Err(self.error_here(ErrorKind::InvalidName));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        self.bytes_to_string(raw)
    }

    fn skip_declaration_or_comment(&mut self) -> Result<()> {
        // cursor currently at '!'
        if self.cursor.peek_bytes(3) == Some(b"!--") {
            self.cursor.advance_by(3);
            return self.skip_until(b"-->");
        }

        if self.cursor.peek_bytes(8) == Some(b"![CDATA[") {
            self.cursor.advance_by(8);
            return self.skip_until(b"]]>");
        }

        // DOCTYPE and other declarations
        self.skip_until(b">")
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        // cursor currently at '?'
        self.cursor.advance();
        self.skip_until(b"?>")
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while self.cursor.current().is_some() {
            if self.cursor.peek_bytes(pattern.len()) == Some(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnterminatedMarkup))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(self.error_here(ErrorKind::UnexpectedEof))
        } else {
            Err(self.error_here(ErrorKind::UnexpectedByte))
        }
    }

    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| self.error_here(ErrorKind::InvalidUtf8))
    }

    fn decode_entities(&self, input: &str) -> Result<String> {
        if !input.contains('&') {
            return Ok(input.to_string());
        }

        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '&' {
                result.push(ch);
                continue;
            }

            let mut entity = String::new();
            let mut terminated = false;
            for next in chars.by_ref() {
                if next == ';' {
                    terminated = true;
                    break;
                }
                entity.push(next);
            }

            let decoded = if terminated {
                match entity.as_str() {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => decode_numeric_entity(&entity),
                }
            } else {
                None
            };

            match decoded {
                Some(ch) => result.push(ch),
                None => {
                    return Err(self.error_here(ErrorKind::InvalidEntity { entity }));
                }
            }
        }

        Ok(result)
    }

    fn error_here(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.cursor.position())
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<root></root>")?;
        assert_eq!(doc.root.name, "root");
        assert!(doc.root.is_leaf());
        assert_eq!(doc.root.text, "");
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes() -> Result<()> {
        let doc = parse("<calendar type=\"gregorian\" draft='unconfirmed'/>")?;
        assert_eq!(doc.root.attribute("type"), Some("gregorian"));
        assert_eq!(doc.root.attribute("draft"), Some("unconfirmed"));
        Ok(())
    }

    #[test]
    fn test_parse_nested_with_text() -> Result<()> {
        let doc = parse("<months><month type=\"1\">January</month></months>")?;
        let month = &doc.root.children[0];
        assert_eq!(month.name, "month");
        assert_eq!(month.text, "January");
        Ok(())
    }

    #[test]
    fn test_parse_prolog_and_doctype() -> Result<()> {
        let doc = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE ldml SYSTEM \"ldml.dtd\">\n\
             <ldml><identity/></ldml>",
        )?;
        assert_eq!(doc.root.name, "ldml");
        assert_eq!(doc.root.children.len(), 1);
        Ok(())
    }

    #[test]
    fn test_comments_skipped() -> Result<()> {
        let doc = parse("<root><!-- note --><child/><!-- another --></root>")?;
        assert_eq!(doc.root.children.len(), 1);
        Ok(())
    }

    #[test]
    fn test_entity_decoding() -> Result<()> {
        let doc = parse("<sep>&amp;&#x2019;&#65;</sep>")?;
        assert_eq!(doc.root.text, "&\u{2019}A");
        Ok(())
    }

    #[test]
    fn test_invalid_entity() {
        let err = parse("<x>&nosuch;</x>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidEntity { .. }));
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse("<dates></calendars>").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MismatchedClosingTag { .. }
        ));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = parse("<x type=\"a\" type=\"b\"/>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateAttribute { name } if name == "type"));
    }

    #[test]
    fn test_trailing_content() {
        let err = parse("<a/><b/>").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::TrailingContent);
    }

    #[test]
    fn test_unterminated_element() {
        let err = parse("<root><child>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnterminatedElement { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let config = Config::new(4, 0);
        let input = "<a><b><c><d><e/></d></c></b></a>";
        let err = Parser::with_config(input.as_bytes(), config)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxDepthExceeded { max: 4 });
    }

    #[test]
    fn test_size_limit() {
        let config = Config::new(0, 8);
        let err = Parser::with_config(b"<root></root>", config)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxSizeExceeded { max: 8 });
    }

    #[test]
    fn test_unlimited_config() -> Result<()> {
        let mut input = String::new();
        for _ in 0..200 {
            input.push_str("<n>");
        }
        input.push('x');
        for _ in 0..200 {
            input.push_str("</n>");
        }
        let doc = Parser::with_config(input.as_bytes(), Config::unlimited()).parse()?;
        assert_eq!(doc.root.name, "n");
        Ok(())
    }
}
