//! quick-xml helpers shared by the RESX and XLIFF formats.

use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use std::io::Write;

use crate::error::Error;

/// Returns the unescaped value of the attribute whose local name is `name`.
pub(super) fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Reads everything up to the end of the element that was just opened and
/// returns its concatenated text, including text of nested elements.
pub(super) fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, Error> {
    let mut depth = 0usize;
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(text),
            Event::End(_) => depth -= 1,
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&cdata_text(&e)?),
            Event::Eof => {
                return Err(Error::DataMismatch(
                    "unexpected end of document inside an element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

pub(super) fn cdata_text(bytes: &[u8]) -> Result<String, Error> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::DataMismatch(format!("CDATA section is not UTF-8: {e}")))
}

/// Fails when a document ended with elements still open.
pub(super) fn ensure_closed(depth: usize) -> Result<(), Error> {
    if depth == 0 {
        Ok(())
    } else {
        Err(Error::DataMismatch(format!(
            "unexpected end of document: {depth} element(s) left open"
        )))
    }
}

/// Writes `<name>text</name>`.
pub(super) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_content_concatenates_nested_text() {
        let mut reader = Reader::from_str("<target>Hello <g id=\"1\">big</g> &amp; <![CDATA[<world>]]></target>");
        match reader.read_event().unwrap() {
            Event::Start(_) => {}
            other => panic!("unexpected event {other:?}"),
        }
        let text = read_text_content(&mut reader).unwrap();
        assert_eq!(text, "Hello big & <world>");
    }

    #[test]
    fn test_read_text_content_fails_at_eof() {
        let mut reader = Reader::from_str("<value>never closed");
        reader.read_event().unwrap();
        assert!(read_text_content(&mut reader).is_err());
    }

    #[test]
    fn test_attribute_matches_local_name() {
        let mut reader = Reader::from_str(r#"<file xml:lang="fr" source-language="en"/>"#);
        match reader.read_event().unwrap() {
            Event::Empty(e) => {
                assert_eq!(attribute(&e, b"lang").unwrap().as_deref(), Some("fr"));
                assert_eq!(
                    attribute(&e, b"source-language").unwrap().as_deref(),
                    Some("en")
                );
                assert_eq!(attribute(&e, b"target-language").unwrap(), None);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_write_text_element_escapes() {
        let mut writer = Writer::new(Vec::new());
        write_text_element(&mut writer, "value", "a < b & c").unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "<value>a &lt; b &amp; c</value>");
    }
}
