//! Dispatch from file extensions to parsers and exporters.
//!
//! Adding a format means implementing [`TranslationFileParser`] and
//! [`TranslationFileExporter`] and registering an instance; nothing else
//! changes.

use std::{fmt, path::Path};

use crate::{
    formats::{JsonFormat, PoFormat, ResxFormat, XliffFormat},
    traits::{TranslationFileExporter, TranslationFileParser},
};

/// The set of formats available to the orchestrator.
pub struct FormatRegistry {
    parsers: Vec<Box<dyn TranslationFileParser>>,
    exporters: Vec<Box<dyn TranslationFileExporter>>,
}

impl FormatRegistry {
    /// Creates a registry without any format.
    pub fn empty() -> Self {
        FormatRegistry {
            parsers: Vec::new(),
            exporters: Vec::new(),
        }
    }

    pub fn register_parser(&mut self, parser: impl TranslationFileParser + 'static) -> &mut Self {
        self.parsers.push(Box::new(parser));
        self
    }

    pub fn register_exporter(
        &mut self,
        exporter: impl TranslationFileExporter + 'static,
    ) -> &mut Self {
        self.exporters.push(Box::new(exporter));
        self
    }

    /// Returns the first parser accepting `extension` (e.g. `.resx`, `RESX`).
    pub fn parser_for(&self, extension: &str) -> Option<&dyn TranslationFileParser> {
        let extension = normalize_extension(extension)?;
        self.parsers
            .iter()
            .find(|p| p.can_parse(&extension))
            .map(|p| p.as_ref())
    }

    /// Returns the first exporter producing `extension`.
    pub fn exporter_for(&self, extension: &str) -> Option<&dyn TranslationFileExporter> {
        let extension = normalize_extension(extension)?;
        self.exporters
            .iter()
            .find(|e| e.file_extension().eq_ignore_ascii_case(&extension))
            .map(|e| e.as_ref())
    }

    /// Extensions of the registered exporters, in registration order.
    pub fn supported_formats(&self) -> Vec<&'static str> {
        self.exporters.iter().map(|e| e.file_extension()).collect()
    }
}

impl Default for FormatRegistry {
    /// RESX, JSON, PO and XLIFF.
    fn default() -> Self {
        let mut registry = FormatRegistry::empty();
        registry
            .register_parser(ResxFormat)
            .register_parser(JsonFormat)
            .register_parser(PoFormat)
            .register_parser(XliffFormat);
        registry
            .register_exporter(ResxFormat)
            .register_exporter(JsonFormat)
            .register_exporter(PoFormat)
            .register_exporter(XliffFormat);
        registry
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("parsers", &self.parsers.len())
            .field("exporters", &self.supported_formats())
            .finish()
    }
}

/// Lowercases and dot-prefixes an extension; `None` when blank.
fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_ascii_lowercase()))
}

/// The final path component of an uploaded file name.
///
/// Both `/` and `\` count as separators, since browsers on Windows may send
/// full client paths.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path).trim()
}

/// Lowercased, dot-prefixed extension of `file_name`, if it has one.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name_of(file_name))
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(normalize_extension)
}

/// Replaces the extension of `file_name` with `extension` (dot-prefixed).
pub fn replace_extension(file_name: &str, extension: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    format!("{stem}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_resolves_all_formats() {
        let registry = FormatRegistry::default();
        for ext in [".resx", ".json", ".po", ".xliff"] {
            assert!(registry.parser_for(ext).is_some(), "parser for {ext}");
            assert_eq!(registry.exporter_for(ext).unwrap().file_extension(), ext);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_dot_optional() {
        let registry = FormatRegistry::default();
        assert!(registry.parser_for(".JSON").is_some());
        assert!(registry.parser_for("po").is_some());
        assert_eq!(registry.exporter_for("XLIFF").unwrap().file_extension(), ".xliff");
    }

    #[test]
    fn test_unknown_extension_has_no_match() {
        let registry = FormatRegistry::default();
        assert!(registry.parser_for(".unsupported").is_none());
        assert!(registry.exporter_for(".unsupported").is_none());
        assert!(registry.parser_for("").is_none());
        assert!(registry.exporter_for(" . ").is_none());
    }

    #[test]
    fn test_supported_formats_in_order() {
        assert_eq!(
            FormatRegistry::default().supported_formats(),
            vec![".resx", ".json", ".po", ".xliff"]
        );
        assert!(FormatRegistry::empty().supported_formats().is_empty());
    }

    #[test]
    fn test_registering_a_format() {
        let mut registry = FormatRegistry::empty();
        registry.register_parser(JsonFormat);
        assert!(registry.parser_for(".json").is_some());
        assert!(registry.exporter_for(".json").is_none());
    }

    #[test]
    fn test_file_name_helpers() {
        assert_eq!(file_name_of("C:\\Users\\me\\Strings.resx"), "Strings.resx");
        assert_eq!(file_name_of("uploads/app/messages.po"), "messages.po");
        assert_eq!(extension_of("Strings.fr.RESX").as_deref(), Some(".resx"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(replace_extension("test.resx", ".json"), "test.json");
        assert_eq!(replace_extension("Strings.fr.resx", ".po"), "Strings.fr.po");
        assert_eq!(replace_extension("noext", ".xliff"), "noext.xliff");
    }
}
