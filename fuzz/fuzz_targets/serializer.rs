#![no_main]
use libfuzzer_sys::fuzz_target;
use nodexml::xml::is_xml_char;
use nodexml::Node;

fuzz_target!(|data: &[u8]| {
    let Ok(node) = serde_json::from_slice::<Node>(data) else {
        return;
    };
    if let Ok(doc) = nodexml::to_document("root", &node) {
        let rendered = doc.to_xml_string();
        assert!(rendered.chars().all(is_xml_char));
        let reparsed = nodexml::from_xml_str(&rendered);
        assert!(reparsed.is_ok(), "{rendered:?}");
    }
});
