//! XML data model

use indexmap::IndexMap;
use std::fmt;

use crate::config::WriteConfig;
use crate::error::Result;
use crate::xml::{parser, writer};

/// The `<?xml ...?>` declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: String,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
        }
    }
}

/// XML document owning a single root element
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    declaration: Declaration,
    root: Element,
}

impl Document {
    pub(crate) fn new(declaration: Declaration, root: Element) -> Self {
        Self { declaration, root }
    }

    /// Parse a complete document from text
    pub fn parse(input: &str) -> Result<Self> {
        parser::Parser::new(input.as_bytes()).parse()
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Render with the default pretty-printed layout
    pub fn to_xml_string(&self) -> String {
        writer::write_document(self, &WriteConfig::default())
    }

    pub fn to_xml_string_with(&self, config: &WriteConfig) -> String {
        writer::write_document(self, config)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Content>,
}

impl Element {
    /// Callers validate `name` before constructing
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub(crate) fn push(&mut self, content: Content) {
        self.children.push(content);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children(&self) -> &[Content] {
        &self.children
    }

    /// Child elements in document order, skipping other content
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Content::as_element)
    }

    /// Concatenated text and CDATA of the direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Content::Text(text) | Content::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// True if the element has neither attributes nor children
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl Content {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text and CDATA nodes switch their parent to inline layout
    pub(crate) fn is_character_data(&self) -> bool {
        matches!(self, Self::Text(_) | Self::CData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_accessors() {
        let mut element = Element::new("item");
        assert!(element.is_empty());

        element.set_attribute("id", "7");
        element.push(Content::Text("a".into()));
        element.push(Content::Element(Element::new("child")));
        element.push(Content::CData("b".into()));

        assert_eq!(element.name(), "item");
        assert_eq!(element.attribute("id"), Some("7"));
        assert_eq!(element.attribute("missing"), None);
        assert_eq!(element.text(), "ab");
        assert_eq!(element.child_elements().count(), 1);
        assert!(!element.is_empty());
    }

    #[test]
    fn test_attribute_overwrite_keeps_position() {
        let mut element = Element::new("e");
        element.set_attribute("a", "1");
        element.set_attribute("b", "2");
        element.set_attribute("a", "3");

        let attrs: Vec<_> = element.attributes().iter().collect();
        assert_eq!(
            attrs,
            vec![
                (&"a".to_string(), &"3".to_string()),
                (&"b".to_string(), &"2".to_string())
            ]
        );
    }
}
