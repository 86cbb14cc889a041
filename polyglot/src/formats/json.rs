//! Support for JSON translation files.
//!
//! Two shapes are read:
//!
//! - flat: `{"Hello": "Bonjour"}`, entries without a language;
//! - per-language: `{"en": {"Hello": "Hello"}, "fr": {"Hello": "Bonjour"}}`,
//!   chosen when *every* top-level value is an object.
//!
//! The shape is a heuristic. A flat file whose values are all objects is read
//! as per-language. Output is always flat and single-language.

use serde_json::{Map, Value};
use std::io::{BufRead, Write};

use crate::{
    error::Error,
    fallback::TranslationLookup,
    formats::FormatType,
    traits::{TranslationFileExporter, TranslationFileParser, read_text},
    types::{ResourceTranslation, TranslatableResource, TranslationEntry, TranslationFileParseResult},
};

/// The JSON format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

impl TranslationFileParser for Format {
    fn can_parse(&self, file_extension: &str) -> bool {
        file_extension.eq_ignore_ascii_case(FormatType::Json.extension())
    }

    fn parse(&self, reader: &mut dyn BufRead) -> Result<TranslationFileParseResult, Error> {
        let text = read_text(reader)?;
        let mut result = TranslationFileParseResult::new();
        if text.trim().is_empty() {
            return Ok(result);
        }

        let root: Value = serde_json::from_str(&text)?;
        let Value::Object(root) = root else {
            log::debug!("JSON root is not an object, no entries read");
            return Ok(result);
        };

        if is_per_language(&root) {
            for (language, scope) in &root {
                result.add_language(language);
                if let Value::Object(scope) = scope {
                    collect_entries(scope, "", Some(language), &mut result)?;
                }
            }
        } else {
            collect_entries(&root, "", None, &mut result)?;
        }

        log::debug!(
            "parsed {} JSON entries in {} language(s)",
            result.entries.len(),
            result.languages.len()
        );
        Ok(result)
    }
}

fn is_per_language(root: &Map<String, Value>) -> bool {
    root.values().all(Value::is_object)
}

/// Adds every leaf of `scope`; nested objects are flattened with `.`-joined keys.
fn collect_entries(
    scope: &Map<String, Value>,
    prefix: &str,
    language: Option<&str>,
    result: &mut TranslationFileParseResult,
) -> Result<(), Error> {
    for (key, value) in scope {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Object(nested) => {
                collect_entries(nested, &key, language, result)?;
                continue;
            }
            Value::Array(_) => {
                return Err(Error::InvalidResource(format!(
                    "array value for key `{key}` is not supported"
                )));
            }
        };
        result.push(TranslationEntry::new(key, text).with_language(language.map(str::to_string)));
    }
    Ok(())
}

impl TranslationFileExporter for Format {
    fn file_extension(&self) -> &'static str {
        FormatType::Json.extension()
    }

    fn content_type(&self) -> &'static str {
        FormatType::Json.content_type()
    }

    fn export_to(
        &self,
        resources: &[TranslatableResource],
        translations: &[ResourceTranslation],
        language: &str,
        writer: &mut dyn Write,
    ) -> Result<(), Error> {
        let lookup = TranslationLookup::new(translations, language);
        let mut object = Map::new();
        for resource in resources {
            object.insert(
                resource.key.clone(),
                Value::String(lookup.value_for(resource).into_owned()),
            );
        }

        serde_json::to_writer_pretty(&mut *writer, &Value::Object(object))?;
        writer.write_all(b"\n")?;

        log::debug!(
            "exported {} JSON resources for `{}` ({} translated)",
            resources.len(),
            language,
            lookup.translated_count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_per_language_detection() {
        let json = r#"{"en":{"Hello":"Hello"},"fr":{"Hello":"Bonjour"}}"#;
        let result = Format.parse_str(json).unwrap();
        assert_eq!(result.languages, vec!["en", "fr"]);
        assert_eq!(result.entries.len(), 2);
        assert!(result.entries.iter().all(|e| e.key == "Hello"));
        assert_eq!(result.value_of("Hello", Some("en")), Some("Hello"));
        assert_eq!(result.value_of("Hello", Some("fr")), Some("Bonjour"));
    }

    #[test]
    fn test_flat_detection() {
        let result = Format.parse_str(r#"{"Hello":"Bonjour"}"#).unwrap();
        assert!(result.languages.is_empty());
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].key, "Hello");
        assert_eq!(result.entries[0].value, "Bonjour");
        assert_eq!(result.entries[0].language, None);
    }

    #[test]
    fn test_mixed_values_are_flat() {
        let json = r#"{"title":"Shop","menu":{"open":"Open","close":"Close"},"count":3,"enabled":true,"none":null}"#;
        let result = Format.parse_str(json).unwrap();
        assert!(result.languages.is_empty());
        assert_eq!(
            result.keys(),
            vec!["title", "menu.open", "menu.close", "count", "enabled", "none"]
        );
        assert_eq!(result.value_of("count", None), Some("3"));
        assert_eq!(result.value_of("enabled", None), Some("true"));
        assert_eq!(result.value_of("none", None), Some(""));
    }

    #[test]
    fn test_nested_keys_inside_language() {
        let json = r#"{"de":{"menu":{"open":"Öffnen"}}}"#;
        let result = Format.parse_str(json).unwrap();
        assert_eq!(result.languages, vec!["de"]);
        assert_eq!(result.value_of("menu.open", Some("de")), Some("Öffnen"));
    }

    #[test]
    fn test_source_order_is_preserved() {
        let json = r#"{"zebra":"Z","apple":"A","mango":"M"}"#;
        let result = Format.parse_str(json).unwrap();
        assert_eq!(result.keys(), vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(Format.parse_str("").unwrap().is_empty());
        assert!(Format.parse_str("{}").unwrap().is_empty());
        assert!(Format.parse_str(r#"["not", "an", "object"]"#).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Format.parse_str(r#"{"Hello": "#),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Format.parse_str(r#"{"list": ["a", "b"]}"#),
            Err(Error::InvalidResource(_))
        ));
    }

    #[test]
    fn test_export_is_flat_and_pretty() {
        let resources: Vec<TranslatableResource> = ["Hello", "World"]
            .iter()
            .map(|key| TranslatableResource {
                id: Uuid::new_v4(),
                resource_file_id: Uuid::nil(),
                key: key.to_string(),
                source_value: key.to_string(),
                description: None,
            })
            .collect();
        let bytes = Format.export(&resources, &[], "en").unwrap();
        let out = String::from_utf8(bytes).unwrap();

        assert_eq!(
            out,
            "{\n  \"Hello\": \"##Hello in en##\",\n  \"World\": \"##World in en##\"\n}\n"
        );
    }
}
