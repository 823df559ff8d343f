#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = nodexml::from_xml_bytes(data) {
        // anything the parser accepts must render and reparse to the same bytes
        let rendered = doc.to_xml_string();
        if let Ok(reparsed) = nodexml::from_xml_str(&rendered) {
            assert_eq!(reparsed.to_xml_string(), rendered);
        }
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = nodexml::xml::parse_fragment(s);
    }
});
