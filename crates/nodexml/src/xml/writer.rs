//! Rendering of documents to text
//!
//! Pretty layout only touches elements whose children are all elements,
//! comments or processing instructions. Once an element holds text or CDATA
//! its whole subtree is written inline, so mixed content keeps its exact
//! characters and parsing the output back reproduces the same text.

use crate::config::WriteConfig;
use crate::xml::model::{Content, Document, Element};

pub(crate) fn write_document(doc: &Document, config: &WriteConfig) -> String {
    let declaration = doc.declaration();
    let mut output = String::new();
    output.push_str("<?xml version=\"");
    output.push_str(&escape_attribute(&declaration.version));
    output.push_str("\" encoding=\"");
    output.push_str(&escape_attribute(&declaration.encoding));
    output.push_str("\"?>\n");

    write_element(doc.root(), 0, config, config.pretty, &mut output);
    output.push('\n');
    output
}

fn write_element(
    element: &Element,
    depth: usize,
    config: &WriteConfig,
    pretty: bool,
    output: &mut String,
) {
    output.push('<');
    output.push_str(element.name());

    for (key, value) in element.attributes() {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attribute(value));
        output.push('"');
    }

    let children: Vec<&Content> = element
        .children()
        .iter()
        .filter(|child| !matches!(child, Content::Text(text) if text.is_empty()))
        .collect();

    if children.is_empty() {
        output.push_str("/>");
        return;
    }

    output.push('>');
    let pretty = pretty && !children.iter().any(|child| child.is_character_data());
    for child in &children {
        if pretty {
            output.push('\n');
            push_indent(output, depth + 1, config);
        }
        write_content(child, depth + 1, config, pretty, output);
    }
    if pretty {
        output.push('\n');
        push_indent(output, depth, config);
    }
    output.push_str("</");
    output.push_str(element.name());
    output.push('>');
}

fn write_content(
    content: &Content,
    depth: usize,
    config: &WriteConfig,
    pretty: bool,
    output: &mut String,
) {
    match content {
        Content::Element(element) => write_element(element, depth, config, pretty, output),
        Content::Text(text) => output.push_str(&escape_text(text)),
        Content::CData(text) => {
            output.push_str("<![CDATA[");
            output.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
            output.push_str("]]>");
        }
        Content::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
        Content::ProcessingInstruction { target, data } => {
            output.push_str("<?");
            output.push_str(target);
            if !data.is_empty() {
                output.push(' ');
                output.push_str(data);
            }
            output.push_str("?>");
        }
    }
}

fn push_indent(output: &mut String, depth: usize, config: &WriteConfig) {
    output.extend(std::iter::repeat(' ').take(depth * config.indent));
}

fn escape_text(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\r' => result.push_str("&#13;"),
            _ => result.push(ch),
        }
    }
    result
}

fn escape_attribute(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\t' => result.push_str("&#9;"),
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            _ => result.push(ch),
        }
    }
    result
}
