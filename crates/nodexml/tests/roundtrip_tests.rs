use nodexml::{from_xml_str, to_document, Mapping, Node, WriteConfig, XmlDocument};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn assert_idempotent(doc: &XmlDocument, config: &WriteConfig) -> TestResult {
    let rendered = doc.to_xml_string_with(config);
    let reparsed = from_xml_str(&rendered)?;
    assert_eq!(reparsed.to_xml_string_with(config), rendered);
    Ok(())
}

fn sample() -> Node {
    Node::from(
        Mapping::new()
            .with("@attributes", Mapping::new().with("version", 2i32).with("note", "a \"quoted\"\tvalue\n"))
            .with("@comment", "catalog export")
            .with("title", "Fish & Chips <deluxe>")
            .with(
                "item",
                vec![
                    Node::from(
                        Mapping::new()
                            .with("@attributes", Mapping::new().with("sku", "A-1"))
                            .with("price", 9.75)
                            .with("tags", vec!["x", "y"]),
                    ),
                    Node::from(Mapping::new().with("@cdata", "raw ]]> text")),
                    Node::from(Mapping::new().with("@values", "  padded  ")),
                    Node::from(Mapping::new().with("empty", Mapping::new())),
                ],
            )
            .with("crlf", "line\r\nbreak")
            .with("nothing", Node::null()),
    )
}

#[test]
fn test_pretty_output_is_idempotent() -> TestResult {
    let doc = to_document("catalog", &sample())?;
    assert_idempotent(&doc, &WriteConfig::default())
}

#[test]
fn test_compact_output_is_idempotent() -> TestResult {
    let doc = to_document("catalog", &sample())?;
    assert_idempotent(&doc, &WriteConfig::compact())
}

#[test]
fn test_wide_indent_is_idempotent() -> TestResult {
    let doc = to_document("catalog", &sample())?;
    assert_idempotent(&doc, &WriteConfig::new(true, 8))
}

#[test]
fn test_reparsed_tree_matches() -> TestResult {
    // split CDATA sections and empty text don't survive as identical nodes
    let node = Node::from(
        Mapping::new()
            .with("@attributes", Mapping::new().with("lang", "pt-BR"))
            .with("@comment", "people")
            .with(
                "person",
                vec![
                    Node::from(Mapping::new().with("name", "Ana").with("age", 30i32)),
                    Node::from(Mapping::new().with("@cdata", "<b>Bia</b>")),
                ],
            ),
    );
    let doc = to_document("people", &node)?;
    let reparsed = from_xml_str(&doc.to_xml_string_with(&WriteConfig::compact()))?;

    assert_eq!(reparsed.declaration(), doc.declaration());
    assert_eq!(reparsed.root(), doc.root());
    Ok(())
}

#[test]
fn test_pretty_layout() -> TestResult {
    let doc = to_document("catalog", &sample())?;
    let expected = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<catalog version=\"2\" note=\"a &quot;quoted&quot;&#9;value&#10;\">\n",
        "  <!--catalog export-->\n",
        "  <title>Fish &amp; Chips &lt;deluxe&gt;</title>\n",
        "  <item sku=\"A-1\">\n",
        "    <price>9.75</price>\n",
        "    <tags>x</tags>\n",
        "    <tags>y</tags>\n",
        "  </item>\n",
        "  <item><![CDATA[raw ]]]]><![CDATA[> text]]></item>\n",
        "  <item>  padded  </item>\n",
        "  <item>\n",
        "    <empty/>\n",
        "  </item>\n",
        "  <crlf>line&#13;\nbreak</crlf>\n",
        "  <nothing/>\n",
        "</catalog>\n",
    );
    assert_eq!(doc.to_xml_string(), expected);
    Ok(())
}
