//! Support for .NET `.resx` resource files.
//!
//! Every `<data name="KEY">` element becomes one entry. RESX does not declare
//! its language, so parsed entries carry none; the uploader supplies it.

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io::{BufRead, Write};

use super::xml::{attribute, cdata_text, ensure_closed, read_text_content, write_text_element};
use crate::{
    error::Error,
    fallback::TranslationLookup,
    formats::FormatType,
    traits::{TranslationFileExporter, TranslationFileParser, read_text},
    types::{ResourceTranslation, TranslatableResource, TranslationEntry, TranslationFileParseResult},
};

const RESHEADERS: [(&str, &str); 4] = [
    ("resmimetype", "text/microsoft-resx"),
    ("version", "2.0"),
    (
        "reader",
        "System.Resources.ResXResourceReader, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
    ),
    (
        "writer",
        "System.Resources.ResXResourceWriter, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
    ),
];

/// The RESX format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

impl TranslationFileParser for Format {
    fn can_parse(&self, file_extension: &str) -> bool {
        file_extension.eq_ignore_ascii_case(FormatType::Resx.extension())
    }

    fn parse(&self, reader: &mut dyn BufRead) -> Result<TranslationFileParseResult, Error> {
        let text = read_text(reader)?;
        let mut xml_reader = Reader::from_str(&text);

        let mut result = TranslationFileParseResult::new();
        let mut depth = 0usize;

        loop {
            match xml_reader.read_event()? {
                Event::Start(ref e) if e.local_name().as_ref() == b"data" => {
                    let name = attribute(e, b"name")?;
                    let (value, comment) = parse_data_children(&mut xml_reader)?;
                    if let Some(name) = name.filter(|n| !n.is_empty()) {
                        result.push(
                            TranslationEntry::new(name, value.unwrap_or_default())
                                .with_description(comment),
                        );
                    }
                }
                Event::Empty(ref e) if e.local_name().as_ref() == b"data" => {
                    if let Some(name) = attribute(e, b"name")?.filter(|n| !n.is_empty()) {
                        result.push(TranslationEntry::new(name, String::new()));
                    }
                }
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
        }
        ensure_closed(depth)?;

        log::debug!("parsed {} RESX entries", result.entries.len());
        Ok(result)
    }
}

/// Reads the children of a `<data>` element: its `<value>` and `<comment>` text.
fn parse_data_children(
    xml_reader: &mut Reader<&[u8]>,
) -> Result<(Option<String>, Option<String>), Error> {
    let mut value = None;
    let mut comment = None;
    let mut loose_text = String::new();

    loop {
        match xml_reader.read_event()? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"value" => value = Some(read_text_content(xml_reader)?),
                b"comment" => comment = Some(read_text_content(xml_reader)?),
                _ => {
                    read_text_content(xml_reader)?;
                }
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"value" => {
                value = Some(String::new());
            }
            Event::Text(e) => loose_text.push_str(&e.unescape()?),
            Event::CData(e) => loose_text.push_str(&cdata_text(&e)?),
            Event::End(_) => break,
            Event::Eof => {
                return Err(Error::InvalidResource(
                    "unexpected end of document inside <data>".to_string(),
                ));
            }
            _ => {}
        }
    }

    // `<data name="k">text</data>` without a <value> child
    if value.is_none() && !loose_text.trim().is_empty() {
        value = Some(loose_text.trim().to_string());
    }
    Ok((value, comment))
}

impl TranslationFileExporter for Format {
    fn file_extension(&self) -> &'static str {
        FormatType::Resx.extension()
    }

    fn content_type(&self) -> &'static str {
        FormatType::Resx.content_type()
    }

    fn export_to(
        &self,
        resources: &[TranslatableResource],
        translations: &[ResourceTranslation],
        language: &str,
        writer: &mut dyn Write,
    ) -> Result<(), Error> {
        let lookup = TranslationLookup::new(translations, language);
        let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Start(BytesStart::new("root")))?;

        for (name, value) in RESHEADERS {
            let mut header = BytesStart::new("resheader");
            header.push_attribute(("name", name));
            xml_writer.write_event(Event::Start(header))?;
            write_text_element(&mut xml_writer, "value", value)?;
            xml_writer.write_event(Event::End(BytesEnd::new("resheader")))?;
        }

        for resource in resources {
            let mut data = BytesStart::new("data");
            data.push_attribute(("name", resource.key.as_str()));
            data.push_attribute(("xml:space", "preserve"));
            xml_writer.write_event(Event::Start(data))?;
            write_text_element(&mut xml_writer, "value", &lookup.value_for(resource))?;
            if let Some(description) = &resource.description {
                write_text_element(&mut xml_writer, "comment", description)?;
            }
            xml_writer.write_event(Event::End(BytesEnd::new("data")))?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("root")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        log::debug!(
            "exported {} RESX resources for `{}` ({} translated)",
            resources.len(),
            language,
            lookup.translated_count()
        );
        Ok(())
    }
}
