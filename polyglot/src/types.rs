//! Core types for polyglot.
//! Parsers decode into [`TranslationFileParseResult`]; exporters serialize
//! [`TranslatableResource`]s and their [`ResourceTranslation`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One (key, value, language) triple found in a translation file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationEntry {
    /// Resource key. Never empty.
    pub key: String,
    pub value: String,
    /// Language declared in-band by the file, if any.
    pub language: Option<String>,
    /// Translator comment attached to the entry (RESX `<comment>`, PO `#.`, XLIFF `<note>`).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub description: Option<String>,
}

impl TranslationEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        TranslationEntry {
            key: key.into(),
            value: value.into(),
            language: None,
            description: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }
}

/// Everything a parser extracted from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationFileParseResult {
    /// Language codes detected in the file, in order of first appearance.
    pub languages: Vec<String>,
    /// Entries in source-file order.
    pub entries: Vec<TranslationEntry>,
}

impl TranslationFileParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a detected language once.
    pub fn add_language(&mut self, language: &str) {
        if !language.is_empty() && !self.languages.iter().any(|l| l == language) {
            self.languages.push(language.to_string());
        }
    }

    /// Adds an entry, dropping it when its key is empty.
    pub fn push(&mut self, entry: TranslationEntry) {
        if !entry.key.is_empty() {
            self.entries.push(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct keys in first-appearance order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !keys.contains(&entry.key.as_str()) {
                keys.push(&entry.key);
            }
        }
        keys
    }

    /// Finds the value recorded for `key` in `language` (`None` matches untagged entries).
    pub fn value_of(&self, key: &str, language: Option<&str>) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key && e.language.as_deref() == language)
            .map(|e| e.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Solution {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub solution_id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Component {
    pub id: Uuid,
    pub project_id: Uuid,
    pub code: String,
    pub name: String,
}

/// A language (or variant) that a solution needs translations for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationNeed {
    pub id: Uuid,
    pub solution_id: Uuid,
    /// Language code, e.g. `fr` or `en-US`.
    pub code: String,
    pub label: String,
    pub is_default: bool,
}

/// One uploaded translation file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceFile {
    pub id: Uuid,
    /// File name, unique within the component.
    pub name: String,
    /// Storage path. Always empty: uploaded bytes are not kept.
    pub path: String,
    pub project_id: Uuid,
    pub component_id: Uuid,
}

/// A localizable string identified by its key within a resource file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslatableResource {
    pub id: Uuid,
    pub resource_file_id: Uuid,
    pub key: String,
    pub source_value: String,
    pub description: Option<String>,
}

/// The value of a resource in one translation need.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceTranslation {
    pub id: Uuid,
    pub translatable_resource_id: Uuid,
    pub translation_need_id: Uuid,
    /// Code of the referenced translation need.
    pub language: String,
    /// Value trusted for export.
    pub validated_value: Option<String>,
    pub suggested_value: Option<String>,
    pub status: String,
    pub last_modified_date: DateTime<Utc>,
}

impl ResourceTranslation {
    /// The validated value, treating an empty string as missing.
    pub fn exportable_value(&self) -> Option<&str> {
        self.validated_value.as_deref().filter(|v| !v.is_empty())
    }
}
