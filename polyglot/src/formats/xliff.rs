//! Support for XLIFF 1.2 documents.
//!
//! Elements are matched by local name, so namespaced documents read the same
//! as bare ones. Each `<file>` contributes its `target-language` (falling back
//! to `source-language`) to every `<trans-unit>` it contains. A self-closing
//! `<trans-unit id="k"/>` reads as an empty value.

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io::{BufRead, Write};

use super::xml::{attribute, ensure_closed, read_text_content, write_text_element};
use crate::{
    error::Error,
    fallback::TranslationLookup,
    formats::FormatType,
    traits::{TranslationFileExporter, TranslationFileParser, read_text},
    types::{ResourceTranslation, TranslatableResource, TranslationEntry, TranslationFileParseResult},
};

const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// The XLIFF format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

/// Content of one `<trans-unit>`.
#[derive(Debug, Default)]
struct TransUnit {
    source: Option<String>,
    target: Option<String>,
    note: Option<String>,
}

impl TranslationFileParser for Format {
    fn can_parse(&self, file_extension: &str) -> bool {
        file_extension.eq_ignore_ascii_case(FormatType::Xliff.extension())
            || file_extension.eq_ignore_ascii_case(".xlf")
    }

    fn parse(&self, reader: &mut dyn BufRead) -> Result<TranslationFileParseResult, Error> {
        let text = read_text(reader)?;
        let mut xml_reader = Reader::from_str(&text);

        let mut result = TranslationFileParseResult::new();
        let mut depth = 0usize;
        // (depth of the <file> element, its language)
        let mut files: Vec<(usize, Option<String>)> = Vec::new();

        loop {
            match xml_reader.read_event()? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"file" => {
                        depth += 1;
                        let language = file_language(e)?;
                        if let Some(language) = &language {
                            result.add_language(language);
                        }
                        files.push((depth, language));
                    }
                    b"trans-unit" => {
                        let id = attribute(e, b"id")?;
                        let unit = parse_trans_unit(&mut xml_reader)?;
                        if let Some(id) = id.filter(|id| !id.is_empty()) {
                            let language = files.last().and_then(|(_, lang)| lang.clone());
                            let value = unit.target.or(unit.source).unwrap_or_default();
                            result.push(
                                TranslationEntry::new(id, value)
                                    .with_language(language)
                                    .with_description(unit.note),
                            );
                        }
                    }
                    _ => depth += 1,
                },
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"file" => {
                        if let Some(language) = file_language(e)? {
                            result.add_language(&language);
                        }
                    }
                    b"trans-unit" => {
                        if let Some(id) = attribute(e, b"id")?.filter(|id| !id.is_empty()) {
                            let language = files.last().and_then(|(_, lang)| lang.clone());
                            result.push(
                                TranslationEntry::new(id, String::new()).with_language(language),
                            );
                        }
                    }
                    _ => {}
                },
                Event::End(_) => {
                    if files.last().is_some_and(|(d, _)| *d == depth) {
                        files.pop();
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        ensure_closed(depth)?;

        log::debug!(
            "parsed {} XLIFF entries in {} language(s)",
            result.entries.len(),
            result.languages.len()
        );
        Ok(result)
    }
}

fn file_language(e: &BytesStart<'_>) -> Result<Option<String>, Error> {
    let target = attribute(e, b"target-language")?.filter(|l| !l.is_empty());
    match target {
        Some(language) => Ok(Some(language)),
        None => Ok(attribute(e, b"source-language")?.filter(|l| !l.is_empty())),
    }
}

/// Reads a `<trans-unit>` up to its end tag.
fn parse_trans_unit(xml_reader: &mut Reader<&[u8]>) -> Result<TransUnit, Error> {
    let mut unit = TransUnit::default();
    loop {
        match xml_reader.read_event()? {
            Event::Start(ref e) => {
                let name = e.local_name().as_ref().to_vec();
                let text = read_text_content(xml_reader)?;
                match name.as_slice() {
                    b"source" if unit.source.is_none() => unit.source = Some(text),
                    b"target" if unit.target.is_none() => unit.target = Some(text),
                    b"note" if unit.note.is_none() => unit.note = Some(text),
                    _ => {}
                }
            }
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"source" if unit.source.is_none() => unit.source = Some(String::new()),
                b"target" if unit.target.is_none() => unit.target = Some(String::new()),
                _ => {}
            },
            Event::End(_) => return Ok(unit),
            Event::Eof => {
                return Err(Error::InvalidResource(
                    "unexpected end of document inside <trans-unit>".to_string(),
                ));
            }
            _ => {}
        }
    }
}

impl TranslationFileExporter for Format {
    fn file_extension(&self) -> &'static str {
        FormatType::Xliff.extension()
    }

    fn content_type(&self) -> &'static str {
        FormatType::Xliff.content_type()
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

        let mut xliff = BytesStart::new("xliff");
        xliff.push_attribute(("version", "1.2"));
        xliff.push_attribute(("xmlns", XLIFF_NAMESPACE));
        xml_writer.write_event(Event::Start(xliff))?;

        let mut file = BytesStart::new("file");
        file.push_attribute(("source-language", language));
        file.push_attribute(("datatype", "plaintext"));
        file.push_attribute(("original", "file.ext"));
        xml_writer.write_event(Event::Start(file))?;
        xml_writer.write_event(Event::Start(BytesStart::new("body")))?;

        for resource in resources {
            let mut unit = BytesStart::new("trans-unit");
            unit.push_attribute(("id", resource.key.as_str()));
            xml_writer.write_event(Event::Start(unit))?;
            write_text_element(&mut xml_writer, "source", &resource.key)?;
            write_text_element(&mut xml_writer, "target", &lookup.value_for(resource))?;
            if let Some(description) = &resource.description {
                write_text_element(&mut xml_writer, "note", description)?;
            }
            xml_writer.write_event(Event::End(BytesEnd::new("trans-unit")))?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("body")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("file")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("xliff")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        log::debug!(
            "exported {} XLIFF resources for `{}` ({} translated)",
            resources.len(),
            language,
            lookup.translated_count()
        );
        Ok(())
    }
}
