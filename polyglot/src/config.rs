//! Options for the upload and download pipelines.

use serde::{Deserialize, Serialize};

/// How entries without an in-band language are stored when the upload names one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UntaggedEntries {
    /// Stored as the suggested value; export keeps the fallback placeholder
    /// until someone validates it.
    #[default]
    Suggested,
    /// Stored as the validated value, like entries that declare their language.
    Validated,
    /// Not stored; only the resource and its source value are kept.
    Skip,
}

/// Behavior options for [`crate::ResourceFileService`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Export format used when a download does not name one.
    pub default_format: String,
    /// Language used when a download names none and the file has no translations.
    pub default_language: String,
    pub untagged_entries: UntaggedEntries,
    /// Status given to translations created by an upload.
    pub import_status: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            default_format: ".resx".to_string(),
            default_language: "en".to_string(),
            untagged_entries: UntaggedEntries::default(),
            import_status: "imported".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = format.into();
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_untagged_entries(mut self, untagged_entries: UntaggedEntries) -> Self {
        self.untagged_entries = untagged_entries;
        self
    }

    pub fn with_import_status(mut self, status: impl Into<String>) -> Self {
        self.import_status = status.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::new();
        assert_eq!(config.default_format, ".resx");
        assert_eq!(config.default_language, "en");
        assert_eq!(config.untagged_entries, UntaggedEntries::Suggested);
        assert_eq!(config.import_status, "imported");
    }

    #[test]
    fn test_builder() {
        let config = ServiceConfig::new()
            .with_default_format(".json")
            .with_default_language("fr")
            .with_untagged_entries(UntaggedEntries::Validated)
            .with_import_status("uploaded");
        assert_eq!(config.default_format, ".json");
        assert_eq!(config.default_language, "fr");
        assert_eq!(config.untagged_entries, UntaggedEntries::Validated);
        assert_eq!(config.import_status, "uploaded");
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"untagged_entries": "skip"}"#).unwrap();
        assert_eq!(config.untagged_entries, UntaggedEntries::Skip);
        assert_eq!(config.default_format, ".resx");
    }
}
