//! nodexml - convert nested key/value trees into XML documents
//!
//! # Quick Start
//!
//! ```
//! use nodexml::{Mapping, Node};
//! # fn main() -> Result<(), nodexml::Error> {
//! let person = Mapping::new()
//!     .with("@attributes", Mapping::new().with("id", 7))
//!     .with("name", "Tio Jobs")
//!     .with("city", "São Paulo");
//!
//! let xml = nodexml::to_string("person", &Node::from(person))?;
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
//!      <person id=\"7\">\n  <name>Tio Jobs</name>\n  <city>São Paulo</city>\n</person>\n"
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub use config::{Config, WriteConfig};

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

mod cursor;

pub mod name;
pub use name::{is_valid_name, validate_name};

pub mod node;
pub use node::{Mapping, Node, Scalar};

pub mod serializer;
pub use serializer::{ReservedKey, Serializer};

pub mod xml;
pub use xml::{
    Content as XmlContent, Declaration, Document as XmlDocument, Element as XmlElement,
    Parser as XmlParser,
};

#[cfg(feature = "serde")]
mod de;

/// Convert `node` into a document rooted at `root_name` using the default config
pub fn to_document(root_name: &str, node: &Node) -> Result<XmlDocument> {
    Serializer::default().serialize(root_name, node)
}

/// Convert `node` with custom configuration
pub fn to_document_with_config(
    root_name: &str,
    node: &Node,
    config: Config,
) -> Result<XmlDocument> {
    Serializer::new(config).serialize(root_name, node)
}

/// Convert `node` and render it with the default pretty layout
pub fn to_string(root_name: &str, node: &Node) -> Result<String> {
    Ok(to_document(root_name, node)?.to_xml_string())
}

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    xml::parse_document(s)
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    XmlParser::new(bytes).parse()
}
