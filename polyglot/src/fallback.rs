//! Value selection for exports.
//!
//! Every exporter resolves values through [`TranslationLookup`], so a missing
//! translation produces the same [`placeholder`] text in every format.

use std::{borrow::Cow, collections::HashMap};

use uuid::Uuid;

use crate::types::{ResourceTranslation, TranslatableResource};

/// Marker exported when `key` has no validated value in `language`.
///
/// ```rust
/// assert_eq!(polyglot::placeholder("Hello", "fr"), "##Hello in fr##");
/// ```
pub fn placeholder(key: &str, language: &str) -> String {
    format!("##{key} in {language}##")
}

/// Validated values of one language, indexed by resource id.
#[derive(Debug)]
pub struct TranslationLookup<'a> {
    language: &'a str,
    values: HashMap<Uuid, Option<&'a str>>,
}

impl<'a> TranslationLookup<'a> {
    /// Indexes the first translation of each resource in `language`.
    pub fn new(translations: &'a [ResourceTranslation], language: &'a str) -> Self {
        let mut values = HashMap::new();
        for translation in translations.iter().filter(|t| t.language == language) {
            values
                .entry(translation.translatable_resource_id)
                .or_insert_with(|| translation.exportable_value());
        }
        TranslationLookup { language, values }
    }

    pub fn language(&self) -> &'a str {
        self.language
    }

    /// The validated value of `resource`, or the placeholder.
    pub fn value_for(&self, resource: &TranslatableResource) -> Cow<'a, str> {
        match self.values.get(&resource.id).copied().flatten() {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(placeholder(&resource.key, self.language)),
        }
    }

    /// Number of resources with an exportable value.
    pub fn translated_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }
}
