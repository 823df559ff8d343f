//! XML parser for documents and well-balanced fragments
//!
//! Text is kept exactly as written, whitespace included, so a rendered
//! document parses back into a tree that renders to the same bytes.

use indexmap::IndexMap;

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::name::{is_name_char, is_name_start, is_valid_name};
use crate::xml::is_xml_char;
use crate::xml::model::{Content, Declaration, Document, Element};

/// Configuration for the XML parser
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
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    depth: u16,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
        }
    }

    /// Count `depth` enclosing elements that live outside the input
    #[must_use]
    pub fn starting_at_depth(mut self, depth: u16) -> Self {
        self.depth = depth;
        self
    }

    /// Parse a complete document: optional declaration, one root element
    pub fn parse(&mut self) -> Result<Document> {
        self.check_size()?;
        if self.cursor.starts_with(b"\xEF\xBB\xBF") {
            self.cursor.advance_by(3);
        }

        let declaration = if self.cursor.starts_with(b"<?xml")
            && self
                .cursor
                .peek(5)
                .is_some_and(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        {
            self.parse_declaration()?
        } else {
            Declaration::default()
        };

        self.skip_misc()?;
        if self.cursor.current() != Some(b'<') {
            return Err(self.expected("root element"));
        }
        let root = self.parse_element(None)?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here("content after root element"));
        }

        Ok(Document::new(declaration, root))
    }

    /// Parse a sequence of nodes with no enclosing root element
    pub fn parse_fragment(&mut self) -> Result<Vec<Content>> {
        self.check_size()?;
        self.parse_children(None)
    }

    fn check_size(&self) -> Result<()> {
        let len = self.cursor.remaining().len();
        if self.config.max_size > 0 && len > self.config.max_size {
            return Err(Error::from_kind(ErrorKind::MaxSizeExceeded {
                max: self.config.max_size,
            }));
        }
        Ok(())
    }

    fn parse_declaration(&mut self) -> Result<Declaration> {
        // cursor at "<?xml"
        self.cursor.advance_by(5);
        let mut declaration = Declaration::default();

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"?>") {
                self.cursor.advance_by(2);
                return Ok(declaration);
            }
            if self.cursor.is_eof() {
                return Err(self.eof());
            }

            let name = self.parse_name(None)?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            match name.as_str() {
                "version" => declaration.version = value,
                "encoding" => declaration.encoding = value,
                "standalone" => {}
                _ => return Err(self.error_here("unknown pseudo-attribute in xml declaration")),
            }
        }
    }

    /// Skip comments, processing instructions, doctype and whitespace around the root
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<!--") {
                self.parse_comment()?;
            } else if self.cursor.starts_with(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else if self.cursor.starts_with(b"<?") {
                self.parse_processing_instruction()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<()> {
        let mut in_subset = false;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => in_subset = true,
                b']' => in_subset = false,
                b'>' if !in_subset => return Ok(()),
                _ => {}
            }
        }
        Err(self.eof())
    }

    fn parse_element(&mut self, parent: Option<&str>) -> Result<Element> {
        self.expect_byte(b'<')?;
        self.enter_nested()?;
        let element = self.parse_element_body(parent);
        self.depth = self.depth.saturating_sub(1);
        element
    }

    fn parse_element_body(&mut self, parent: Option<&str>) -> Result<Element> {
        let name = self.parse_name(parent)?;
        let mut element = Element::new(name);

        for (key, value) in self.parse_attributes(element.name())? {
            element.set_attribute(key, value);
        }

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            return Ok(element);
        }
        self.expect_byte(b'>')?;

        let children = self.parse_children(Some(element.name()))?;

        for child in children {
            element.push(child);
        }
        Ok(element)
    }

    fn enter_nested(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            let pos = self.cursor.position();
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                pos.offset,
                pos.line,
                pos.col,
            ));
        }
        Ok(())
    }

    /// Parse content until the closing tag of `parent`, or end of input for fragments
    fn parse_children(&mut self, parent: Option<&str>) -> Result<Vec<Content>> {
        let mut children = Vec::new();

        loop {
            if self.cursor.is_eof() {
                if parent.is_some() {
                    return Err(self.eof());
                }
                break;
            }

            if self.cursor.starts_with(b"</") {
                let Some(open) = parent else {
                    return Err(self.error_here("unexpected closing tag"));
                };
                self.cursor.advance_by(2);
                let close_name = self.parse_name(Some(open))?;
                if close_name != open {
                    return Err(self.error_here("mismatched closing tag"));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                children.push(Content::Comment(self.parse_comment()?));
            } else if self.cursor.starts_with(b"<![CDATA[") {
                children.push(Content::CData(self.parse_cdata()?));
            } else if self.cursor.starts_with(b"<?") {
                let (target, data) = self.parse_processing_instruction()?;
                children.push(Content::ProcessingInstruction { target, data });
            } else if self.cursor.starts_with(b"<!") {
                return Err(self.error_here("unexpected markup declaration"));
            } else if self.cursor.current() == Some(b'<') {
                children.push(Content::Element(self.parse_element(parent)?));
            } else {
                children.push(Content::Text(self.parse_text()?));
            }
        }

        Ok(children)
    }

    fn parse_attributes(&mut self, element: &str) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            let had_space = matches!(
                self.cursor.current(),
                Some(b' ' | b'\t' | b'\r' | b'\n')
            );
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) if !had_space => return Err(self.expected("whitespace before attribute")),
                Some(_) => {}
                None => return Err(self.eof()),
            }

            let name = self.parse_name(Some(element))?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here("duplicate attribute"));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            Some(_) => return Err(self.expected("quoted attribute value")),
            None => return Err(self.eof()),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw)?;
                // literal whitespace normalizes to spaces; character references survive
                let text = text.replace(['\t', '\n', '\r'], " ");
                return self.decode(&text);
            }
            if b == b'<' {
                return Err(self.error_here("'<' in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.eof())
    }

    fn parse_text(&mut self) -> Result<String> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_string(raw)?;
        self.decode(&text)
    }

    fn parse_comment(&mut self) -> Result<String> {
        self.cursor.advance_by(4); // "<!--"
        let text = self.read_until(b"-->")?;
        if text.contains("--") || text.ends_with('-') {
            return Err(self.error_here("'--' inside comment"));
        }
        Ok(text)
    }

    fn parse_cdata(&mut self) -> Result<String> {
        self.cursor.advance_by(9); // "<![CDATA["
        self.read_until(b"]]>")
    }

    fn parse_processing_instruction(&mut self) -> Result<(String, String)> {
        self.cursor.advance_by(2); // "<?"
        let target = self.parse_name(None)?;
        if target.eq_ignore_ascii_case("xml") {
            return Err(self.error_here("misplaced xml declaration"));
        }
        self.cursor.skip_whitespace();
        let data = self.read_until(b"?>")?;
        Ok((target, data))
    }

    /// Read raw text up to `pattern`, consuming the pattern
    fn read_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let text = bytes_to_string(self.cursor.slice_from(start))?;
                self.cursor.advance_by(pattern.len());
                return Ok(text);
            }
            self.cursor.advance();
        }
        Err(self.eof())
    }

    fn parse_name(&mut self, parent: Option<&str>) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        let Some(first) = self.cursor.current() else {
            return Err(self.eof());
        };
        if !is_name_start(first) {
            return Err(self.expected("name"));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let name = bytes_to_string(self.cursor.slice_from(start))?;
        if !is_valid_name(&name) {
            return Err(Error::new(
                ErrorKind::InvalidName {
                    name,
                    parent: parent.map(str::to_string),
                },
                Span::new(start_pos, self.cursor.position()),
            ));
        }
        Ok(name)
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(self.eof())
        } else {
            Err(self.expected(&format!("'{}'", char::from(expected))))
        }
    }

    fn decode(&self, input: &str) -> Result<String> {
        decode_entities(input).ok_or_else(|| self.error_here("invalid xml entity"))
    }

    fn expected(&self, what: &str) -> Error {
        let found = match self.cursor.current() {
            Some(b) if b.is_ascii_graphic() => format!("'{}'", char::from(b)),
            Some(b) => format!("byte 0x{b:02x}"),
            None => "end of input".to_string(),
        };
        let pos = self.cursor.position();
        Error::at(
            ErrorKind::Expected {
                expected: what.to_string(),
                found,
            },
            pos.offset,
            pos.line,
            pos.col,
        )
    }

    fn eof(&self) -> Error {
        let pos = self.cursor.position();
        Error::at(ErrorKind::UnexpectedEof, pos.offset, pos.line, pos.col)
    }

    fn error_here(&self, message: &str) -> Error {
        let pos = self.cursor.position();
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::new(Pos::new(pos.offset, pos.line, pos.col), pos),
            message.to_string(),
        )
    }
}

/// Parse a complete document from text
pub fn parse_document(input: &str) -> Result<Document> {
    Parser::new(input.as_bytes()).parse()
}

/// Parse a well-balanced fragment from text
pub fn parse_fragment(input: &str) -> Result<Vec<Content>> {
    Parser::new(input.as_bytes()).parse_fragment()
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes).map_err(|_| {
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::empty(),
            "invalid utf-8".to_string(),
        )
    })?;
    if let Some(c) = text.chars().find(|&c| !is_xml_char(c)) {
        return Err(Error::with_message(
            ErrorKind::InvalidToken,
            Span::empty(),
            format!("character U+{:04X} is not allowed in XML", u32::from(c)),
        ));
    }
    Ok(text.to_string())
}

fn decode_entities(input: &str) -> Option<String> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);
        let after = after.get(1..)?;
        let end = after.find(';')?;
        let entity = after.get(..end)?;

        let decoded = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => decode_numeric_entity(entity)?,
        };
        result.push(decoded);
        rest = after.get(end + 1..)?;
    }
    result.push_str(rest);
    Some(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let c = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    };
    c.filter(|&c| is_xml_char(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_of(input: &str) -> Result<Element> {
        Ok(parse_document(input)?.root().clone())
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let root = root_of("<root></root>")?;
        assert_eq!(root.name(), "root");
        assert!(root.children().is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes() -> Result<()> {
        let root = root_of("<root id=\"1\" name='a &amp; b' nl=\"x&#10;y\"></root>")?;
        assert_eq!(root.attribute("id"), Some("1"));
        assert_eq!(root.attribute("name"), Some("a & b"));
        assert_eq!(root.attribute("nl"), Some("x\ny"));
        Ok(())
    }

    #[test]
    fn test_parse_declaration() -> Result<()> {
        let doc = parse_document("<?xml version=\"1.1\" encoding='ISO-8859-1'?>\n<a/>\n")?;
        assert_eq!(doc.declaration().version, "1.1");
        assert_eq!(doc.declaration().encoding, "ISO-8859-1");
        assert_eq!(doc.root().name(), "a");
        Ok(())
    }

    #[test]
    fn test_parse_keeps_whitespace_and_nodes() -> Result<()> {
        let root = root_of("<r>\n  <!--c-->\n  <![CDATA[<raw>]]><?pi data?><e/></r>")?;
        assert_eq!(
            root.children(),
            &[
                Content::Text("\n  ".into()),
                Content::Comment("c".into()),
                Content::Text("\n  ".into()),
                Content::CData("<raw>".into()),
                Content::ProcessingInstruction {
                    target: "pi".into(),
                    data: "data".into(),
                },
                Content::Element(Element::new("e")),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_prolog_and_epilogue_are_skipped() -> Result<()> {
        let input = "<!-- head --><!DOCTYPE r [<!ENTITY x \"y\">]>\n<r/><!-- tail -->\n";
        assert_eq!(root_of(input)?.name(), "r");
        Ok(())
    }

    #[test]
    fn test_parse_fragment() -> Result<()> {
        let nodes = parse_fragment("text <b>bold</b><i/>")?;
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.first(), Some(&Content::Text("text ".into())));
        match nodes.get(1) {
            Some(Content::Element(b)) => assert_eq!(b.text(), "bold"),
            other => panic!("expected element, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_empty_fragment() -> Result<()> {
        assert!(parse_fragment("")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_inputs() {
        for input in [
            "<a>",
            "<a></b>",
            "<a x=1/>",
            "<a x=\"1\" x=\"2\"/>",
            "<a>&bogus;</a>",
            "<a>&amp</a>",
            "<a/><b/>",
            "<1a/>",
            "<a><!-- a -- b --></a>",
            "<a y=\"<\"/>",
            "<a x=\"1\"y=\"2\"/>",
        ] {
            assert!(parse_document(input).is_err(), "{input} should fail");
        }
        assert!(parse_fragment("</a>").is_err());
        assert!(parse_fragment("<a>").is_err());
    }

    #[test]
    fn test_invalid_name_carries_parent() {
        let err = parse_document("<root><a:/></root>").unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InvalidName {
                name: "a:".to_string(),
                parent: Some("root".to_string()),
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let input = "<a><a><a><a/></a></a></a>";
        let mut parser = Parser::with_config(input.as_bytes(), Config::new(2, 0));
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxDepthExceeded { max: 2 });

        let mut parser = Parser::with_config(input.as_bytes(), Config::unlimited());
        assert!(parser.parse().is_ok());
    }

    #[test]
    fn test_size_limit() {
        let mut parser = Parser::with_config(b"<a/>", Config::new(0, 3));
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxSizeExceeded { max: 3 });
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("&lt;&#65;&#x42;&gt;").as_deref(),
            Some("<AB>")
        );
        assert_eq!(decode_entities("plain").as_deref(), Some("plain"));
        assert_eq!(decode_entities("&nope;"), None);
        assert_eq!(decode_entities("&#0;"), None);
        assert_eq!(decode_entities("&#x1;"), None);
        assert_eq!(decode_entities("&#xFFFE;"), None);
    }

    #[test]
    fn test_self_closing_elements_count_toward_depth() {
        let mut parser = Parser::with_config(b"<a><b/></a>", Config::new(1, 0));
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxDepthExceeded { max: 1 });

        let mut parser = Parser::with_config(b"<a><b/><c/></a>", Config::new(2, 0));
        assert!(parser.parse().is_ok());
    }

    #[test]
    fn test_starting_depth_is_counted() {
        let mut parser =
            Parser::with_config(b"<x/>", Config::new(3, 0)).starting_at_depth(3);
        let err = parser.parse_fragment().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxDepthExceeded { max: 3 });

        let mut parser =
            Parser::with_config(b"text <x/>", Config::new(3, 0)).starting_at_depth(2);
        assert!(parser.parse_fragment().is_ok());
    }

    #[test]
    fn test_control_characters_are_rejected() {
        for input in ["<a>x\u{1}y</a>", "<a b=\"\u{8}\"/>", "<a><!--\u{1f}--></a>", "<a><![CDATA[\u{b}]]></a>", "<a>&#1;</a>"] {
            let err = parse_document(input).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidToken, "{input:?}");
        }
        assert!(parse_document("<a>tab\there&#9;&#10;&#13;</a>").is_ok());
    }
}
