//! Support for gettext `.po` catalogs.
//!
//! Reading is line-oriented: a `msgid "…"` followed by a `msgstr "…"` forms an
//! entry, and quoted continuation lines extend the current field. One layer of
//! surrounding quotes is trimmed; escape sequences are kept as written. The
//! writer escapes `"` as `\"` and line breaks as `\n` or `\r`, so such values
//! read back with the backslashes instead of being cut at the break. Plural
//! forms (`msgid_plural`, `msgstr[n]`) are not read.

use lazy_static::lazy_static;
use regex::Regex;
use std::io::{BufRead, Write};

use crate::{
    error::Error,
    fallback::TranslationLookup,
    formats::FormatType,
    traits::{TranslationFileExporter, TranslationFileParser, read_text},
    types::{ResourceTranslation, TranslatableResource, TranslationEntry, TranslationFileParseResult},
};

lazy_static! {
    static ref LANGUAGE_HEADER: Regex =
        Regex::new(r"(?i)^language:\s*([\w\-]+)").expect("valid language header regex");
}

/// The PO format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Str,
    Other,
}

#[derive(Debug, Default)]
struct Pending {
    msgid: Option<String>,
    msgstr: Option<String>,
    comment: Option<String>,
}

impl Pending {
    fn take_entry(&mut self) -> Option<(String, String, Option<String>)> {
        let pending = std::mem::take(self);
        match (pending.msgid, pending.msgstr) {
            (Some(msgid), Some(msgstr)) => Some((msgid, msgstr, pending.comment)),
            _ => None,
        }
    }
}

impl TranslationFileParser for Format {
    fn can_parse(&self, file_extension: &str) -> bool {
        file_extension.eq_ignore_ascii_case(FormatType::Po.extension())
    }

    fn parse(&self, reader: &mut dyn BufRead) -> Result<TranslationFileParseResult, Error> {
        let text = read_text(reader)?;

        let mut language: Option<String> = None;
        let mut pairs: Vec<(String, String, Option<String>)> = Vec::new();
        let mut pending = Pending::default();
        let mut field = Field::Other;

        for line in text.lines() {
            let line = line.trim();

            if let Some(code) = language_header(line) {
                language.get_or_insert(code);
            }

            if let Some(rest) = line.strip_prefix("msgid ") {
                if pending.msgid.is_some() {
                    pairs.extend(pending.take_entry());
                }
                pending.msgid = Some(unquote(rest).to_string());
                field = Field::Id;
            } else if let Some(rest) = line.strip_prefix("msgstr ") {
                pending.msgstr = Some(unquote(rest).to_string());
                field = Field::Str;
            } else if line.starts_with('"') {
                let target = match field {
                    Field::Id => pending.msgid.as_mut(),
                    Field::Str => pending.msgstr.as_mut(),
                    Field::Other => None,
                };
                if let Some(target) = target {
                    target.push_str(unquote(line));
                }
            } else if let Some(comment) = line.strip_prefix("#.") {
                if pending.msgid.is_some() {
                    pairs.extend(pending.take_entry());
                }
                let comment = comment.trim();
                match pending.comment.as_mut() {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(comment);
                    }
                    None => pending.comment = Some(comment.to_string()),
                }
                field = Field::Other;
            } else {
                // blank lines, other comments, msgctxt, plural forms
                field = Field::Other;
            }
        }
        pairs.extend(pending.take_entry());

        let mut result = TranslationFileParseResult::new();
        if let Some(language) = &language {
            result.add_language(language);
        }
        for (msgid, msgstr, comment) in pairs {
            result.push(
                TranslationEntry::new(msgid, msgstr)
                    .with_language(language.clone())
                    .with_description(comment),
            );
        }

        log::debug!(
            "parsed {} PO entries (language: {})",
            result.entries.len(),
            language.as_deref().unwrap_or("none")
        );
        Ok(result)
    }
}

/// Extracts the code of a `Language: xx` header line, quoted or not.
fn language_header(line: &str) -> Option<String> {
    let line = line.strip_prefix('"').unwrap_or(line);
    LANGUAGE_HEADER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Trims whitespace and one layer of surrounding quotes.
fn unquote(s: &str) -> &str {
    let s = s.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

fn escape(s: &str) -> String {
    s.replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

impl TranslationFileExporter for Format {
    fn file_extension(&self) -> &'static str {
        FormatType::Po.extension()
    }

    fn content_type(&self) -> &'static str {
        FormatType::Po.content_type()
    }

    fn export_to(
        &self,
        resources: &[TranslatableResource],
        translations: &[ResourceTranslation],
        language: &str,
        writer: &mut dyn Write,
    ) -> Result<(), Error> {
        let lookup = TranslationLookup::new(translations, language);
        let mut content = String::new();

        for resource in resources {
            if let Some(description) = &resource.description {
                for line in description.lines() {
                    content.push_str(&format!("#. {line}\n"));
                }
            }
            content.push_str(&format!("msgid \"{}\"\n", resource.key));
            content.push_str(&format!(
                "msgstr \"{}\"\n",
                escape(&lookup.value_for(resource))
            ));
            content.push('\n');
        }

        writer.write_all(content.as_bytes())?;

        log::debug!(
            "exported {} PO resources for `{}` ({} translated)",
            resources.len(),
            language,
            lookup.translated_count()
        );
        Ok(())
    }
}
