//! Conversion of a [`Node`] tree into a [`Document`]
//!
//! Mappings may carry reserved keys that shape the element they describe:
//!
//! | key           | effect                                              | stops |
//! |---------------|-----------------------------------------------------|-------|
//! | `@attributes` | mapping of name to scalar, written as attributes    | no    |
//! | `@values`     | scalar written as the element's only text child     | yes   |
//! | `@cdata`      | scalar written as a CDATA section                   | yes   |
//! | `@comment`    | text written as a comment child                     | no    |
//! | `@xml`        | markup parsed and appended as child nodes           | yes   |
//!
//! `@attributes` is always applied first. The content keys are then tried in
//! table order and only the first present one is used; a `@comment` whose
//! value isn't text is skipped over. Every key left afterwards, reserved or
//! not, is treated as a child element name.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, instrument, trace};

use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::name::validate_name;
use crate::node::{Mapping, Node, Scalar};
use crate::xml::is_xml_char;
use crate::xml::model::{Content, Declaration, Document, Element};
use crate::xml::parser::{self, Parser};

/// Keys with special meaning inside a mapping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReservedKey {
    Attributes,
    Values,
    CData,
    Comment,
    Xml,
}

impl ReservedKey {
    /// Content keys in priority order
    pub const CONTENT: [Self; 4] = [Self::Values, Self::CData, Self::Comment, Self::Xml];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attributes => "@attributes",
            Self::Values => "@values",
            Self::CData => "@cdata",
            Self::Comment => "@comment",
            Self::Xml => "@xml",
        }
    }

    /// Whether a match ends processing of the mapping
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Values | Self::CData | Self::Xml)
    }
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds documents from node trees
#[derive(Clone, Debug, Default)]
pub struct Serializer {
    config: Config,
}

impl Serializer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert `node` into a fresh document whose root element is `root_name`
    #[instrument(level = "debug", skip(self, node), fields(max_depth = self.config.max_depth))]
    pub fn serialize(&self, root_name: &str, node: &Node) -> Result<Document> {
        debug!(kind = node.kind_name(), "converting tree");
        validate_name(root_name, None)?;
        self.config.validate_declaration(root_name)?;
        let root = self.build_element(root_name, None, node, 1)?;

        let declaration = Declaration {
            version: self.config.version.clone(),
            encoding: self.config.encoding.clone(),
        };
        debug!(children = root.children().len(), "conversion finished");
        Ok(Document::new(declaration, root))
    }

    /// `name` has already been validated by the caller
    fn build_element(
        &self,
        name: &str,
        parent: Option<&str>,
        node: &Node,
        depth: u16,
    ) -> Result<Element> {
        if self.config.max_depth > 0 && depth > self.config.max_depth {
            return Err(Error::from_kind(ErrorKind::MaxDepthExceeded {
                max: self.config.max_depth,
            }));
        }
        trace!(name, depth, "building element");

        let mut element = Element::new(name);
        match node {
            Node::Scalar(scalar) => {
                element.push(Content::Text(
                    checked(scalar.coerce(), name, parent.unwrap_or(name))?.into_owned(),
                ));
            }
            Node::Mapping(mapping) => self.fill_from_mapping(&mut element, name, mapping, depth)?,
            // items of a bare list have no key to be named after
            Node::List(items) if items.is_empty() => {}
            Node::List(_) => return Err(Error::invalid_name("0", Some(name))),
        }
        Ok(element)
    }

    fn fill_from_mapping(
        &self,
        element: &mut Element,
        name: &str,
        mapping: &Mapping,
        depth: u16,
    ) -> Result<()> {
        if let Some(attributes) = mapping.get(ReservedKey::Attributes.as_str()) {
            apply_attributes(element, name, attributes)?;
        }

        let mut consumed = None;
        for key in ReservedKey::CONTENT {
            let Some(value) = mapping.get(key.as_str()) else {
                continue;
            };

            match key {
                ReservedKey::Values => {
                    let scalar = expect_scalar(key, name, value)?;
                    let text = checked(scalar.coerce(), key.as_str(), name)?;
                    element.push(Content::Text(text.into_owned()));
                }
                ReservedKey::CData => {
                    let scalar = expect_scalar(key, name, value)?;
                    let text = checked(scalar.coerce(), key.as_str(), name)?;
                    element.push(Content::CData(text.into_owned()));
                }
                ReservedKey::Comment => {
                    let Some(comment) = value.as_scalar().and_then(Scalar::as_text) else {
                        continue;
                    };
                    if comment.contains("--") || comment.ends_with('-') {
                        return Err(Error::invalid_content(
                            key.as_str(),
                            name,
                            "comment text without '--' or a trailing '-'",
                        ));
                    }
                    let comment = checked(Cow::Borrowed(comment), key.as_str(), name)?;
                    element.push(Content::Comment(comment.into_owned()));
                }
                ReservedKey::Xml => {
                    let markup = expect_scalar(key, name, value)?.coerce();
                    for content in self.parse_fragment(&markup, depth)? {
                        element.push(content);
                    }
                }
                ReservedKey::Attributes => {}
            }

            if key.is_terminal() {
                return Ok(());
            }
            consumed = Some(key);
            break;
        }

        for (key, value) in mapping {
            if key == ReservedKey::Attributes.as_str()
                || consumed.is_some_and(|reserved| key == reserved.as_str())
            {
                continue;
            }
            validate_name(key, Some(name))?;

            match value {
                Node::List(items) => {
                    for item in items {
                        let child =
                            self.build_element(key, Some(name), item, depth.saturating_add(1))?;
                        element.push(Content::Element(child));
                    }
                }
                _ => {
                    let child =
                        self.build_element(key, Some(name), value, depth.saturating_add(1))?;
                    element.push(Content::Element(child));
                }
            }
        }

        Ok(())
    }

    /// Parse `markup` as the children of an element sitting at `depth`
    fn parse_fragment(&self, markup: &str, depth: u16) -> Result<Vec<Content>> {
        let config = parser::Config::new(self.config.max_depth, 0);
        Parser::with_config(markup.as_bytes(), config)
            .starting_at_depth(depth)
            .parse_fragment()
            .map_err(Error::into_fragment_error)
    }
}

fn apply_attributes(element: &mut Element, name: &str, attributes: &Node) -> Result<()> {
    const EXPECTED: &str = "a mapping of attribute names to scalars";
    let key = ReservedKey::Attributes.as_str();

    let Node::Mapping(attributes) = attributes else {
        return Err(Error::invalid_content(key, name, EXPECTED));
    };
    for (attribute, value) in attributes {
        validate_name(attribute, Some(name))?;
        let Node::Scalar(value) = value else {
            return Err(Error::invalid_content(key, name, EXPECTED));
        };
        element.set_attribute(attribute.as_str(), checked(value.coerce(), key, name)?);
    }
    Ok(())
}

fn expect_scalar<'a>(key: ReservedKey, parent: &str, value: &'a Node) -> Result<&'a Scalar> {
    value
        .as_scalar()
        .ok_or_else(|| Error::invalid_content(key.as_str(), parent, "a scalar"))
}

/// Reject text holding characters that can't appear in an XML document
fn checked<'a>(text: Cow<'a, str>, key: &str, parent: &str) -> Result<Cow<'a, str>> {
    if text.chars().all(is_xml_char) {
        Ok(text)
    } else {
        Err(Error::invalid_content(key, parent, "text made of XML characters"))
    }
}
