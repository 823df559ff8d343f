//! XML document model, parser and writer

pub mod model;
pub mod parser;
mod writer;

pub use model::{Content, Declaration, Document, Element};
pub use parser::{parse_document, parse_fragment, Config, Parser};

/// Returns true if `c` matches the XML 1.0 `Char` production
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
