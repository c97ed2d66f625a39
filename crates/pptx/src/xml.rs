//! Small helpers shared by the XML part parsers.

use quick_xml::events::BytesStart;
use quick_xml::Reader;
use xtract_core::{Error, Result};

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Look up an attribute by local name, unescaping its value.
pub(crate) fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if local_name(a.key.as_ref()) != name {
            return None;
        }
        Some(match a.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
    })
}

/// Look up a namespace-prefixed attribute (such as `r:id`) by local name.
///
/// Unprefixed attributes with the same local name are ignored.
pub(crate) fn prefixed_attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        let key = a.key.as_ref();
        if !key.contains(&b':') || local_name(key) != name {
            return None;
        }
        Some(String::from_utf8_lossy(&a.value).into_owned())
    })
}

/// Look up an attribute by local name and parse it as an integer.
pub(crate) fn attr_i64(e: &BytesStart<'_>, name: &[u8]) -> Option<i64> {
    attr(e, name).and_then(|v| v.trim().parse().ok())
}

/// Create a reader that keeps whitespace inside text nodes.
pub(crate) fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    reader
}

/// Decode raw part bytes to a string, dropping a UTF-8 byte order mark.
pub(crate) fn decode_part(name: &str, bytes: Vec<u8>) -> Result<String> {
    let bytes = match bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };
    String::from_utf8(bytes).map_err(|e| Error::Xml(format!("'{}' is not valid UTF-8: {}", name, e)))
}

/// Wrap a quick-xml error with the name of the part being parsed.
pub(crate) fn xml_error(part: &str, err: impl std::fmt::Display) -> Error {
    Error::Xml(format!("Error parsing '{}': {}", part, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_attr_by_local_name() {
        let mut reader = reader(r#"<p:sldId id="256" r:id="rId2" name="a &amp; b"/>"#);
        match reader.read_event() {
            Ok(Event::Empty(e)) => {
                assert_eq!(attr(&e, b"id").as_deref(), Some("256"));
                assert_eq!(attr_i64(&e, b"id"), Some(256));
                assert_eq!(attr(&e, b"name").as_deref(), Some("a & b"));
                assert_eq!(attr(&e, b"missing"), None);
                assert_eq!(prefixed_attr(&e, b"id").as_deref(), Some("rId2"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_part_strips_bom() {
        let bytes = b"\xEF\xBB\xBF<a/>".to_vec();
        assert_eq!(decode_part("x.xml", bytes).unwrap(), "<a/>");
        assert!(decode_part("x.xml", vec![0xFF, 0xFE, 0x00]).is_err());
    }
}
