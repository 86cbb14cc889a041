//! Traits for format-agnostic parsing and serialization in polyglot.

use std::io::{BufRead, Cursor, Read, Write};

use crate::{
    error::Error,
    types::{ResourceTranslation, TranslatableResource, TranslationFileParseResult},
};

/// Reads a translation file into the normalized entry model.
///
/// # Example
///
/// ```rust
/// use polyglot::formats::JsonFormat;
/// use polyglot::traits::TranslationFileParser;
///
/// let result = JsonFormat.parse_str(r#"{"Hello": "Bonjour"}"#)?;
/// assert_eq!(result.entries.len(), 1);
/// assert!(result.languages.is_empty());
/// # Ok::<(), polyglot::Error>(())
/// ```
pub trait TranslationFileParser: Send + Sync {
    /// Returns true if the parser handles the given extension (e.g. `.resx`).
    fn can_parse(&self, file_extension: &str) -> bool;

    /// Parse from any reader. An empty file yields zero entries, not an error.
    fn parse(&self, reader: &mut dyn BufRead) -> Result<TranslationFileParseResult, Error>;

    /// Parse from bytes.
    fn parse_bytes(&self, bytes: &[u8]) -> Result<TranslationFileParseResult, Error> {
        self.parse(&mut Cursor::new(bytes))
    }

    /// Parse from a string.
    fn parse_str(&self, s: &str) -> Result<TranslationFileParseResult, Error> {
        self.parse_bytes(s.as_bytes())
    }
}

/// Writes resources and their translations for one language.
///
/// Exporting never fails because of missing data: unresolved values become the
/// [`crate::placeholder`]. Errors only come from the output sink.
pub trait TranslationFileExporter: Send + Sync {
    /// The extension (e.g. `.json`) this exporter produces.
    fn file_extension(&self) -> &'static str;

    /// MIME type of the produced bytes.
    fn content_type(&self) -> &'static str {
        "application/octet-stream"
    }

    /// Write to any writer (file, memory, etc.).
    fn export_to(
        &self,
        resources: &[TranslatableResource],
        translations: &[ResourceTranslation],
        language: &str,
        writer: &mut dyn Write,
    ) -> Result<(), Error>;

    /// Export into an in-memory buffer.
    fn export(
        &self,
        resources: &[TranslatableResource],
        translations: &[ResourceTranslation],
        language: &str,
    ) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.export_to(resources, translations, language, &mut buf)?;
        Ok(buf)
    }
}

/// Reads the whole input as text.
///
/// A UTF-8 or UTF-16 BOM selects the decoding; input without a BOM must be
/// valid UTF-8.
pub(crate) fn read_text(reader: &mut dyn BufRead) -> Result<String, Error> {
    // Auto-detect BOM, decode to UTF-8; passthrough everything else
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .bom_override(true)
        .build(reader);

    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_utf8() {
        let text = read_text(&mut Cursor::new("héllo".as_bytes())).unwrap();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn test_read_text_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"{}");
        let text = read_text(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(text, "{}");
    }

    #[test]
    fn test_read_text_decodes_utf16le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "msgid".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let text = read_text(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(text, "msgid");
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let result = read_text(&mut Cursor::new(vec![0x66, 0xFF, 0xFE, 0x66]));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
