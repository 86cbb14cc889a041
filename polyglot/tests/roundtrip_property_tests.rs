use chrono::Utc;
use polyglot::{
    FormatRegistry, ResourceTranslation, TranslatableResource, TranslationFileExporter,
    TranslationFileParser,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use uuid::Uuid;

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,15}").expect("valid key regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_\\-\\.,!\\?]([A-Za-z0-9 _\\-\\.,!\\?éü]{0,28}[A-Za-z0-9\\.!])?")
        .expect("valid value regex")
}

fn dataset_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 1..8)
}

fn language_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["en", "fr", "de", "pt-BR", "zh-Hant"])
}

fn build_file(
    language: &str,
    values: &BTreeMap<String, String>,
) -> (Vec<TranslatableResource>, Vec<ResourceTranslation>) {
    let file_id = Uuid::new_v4();
    let need_id = Uuid::new_v4();
    let mut resources = Vec::new();
    let mut translations = Vec::new();
    for (key, value) in values {
        let resource = TranslatableResource {
            id: Uuid::new_v4(),
            resource_file_id: file_id,
            key: key.clone(),
            source_value: value.clone(),
            description: None,
        };
        translations.push(ResourceTranslation {
            id: Uuid::new_v4(),
            translatable_resource_id: resource.id,
            translation_need_id: need_id,
            language: language.to_string(),
            validated_value: Some(value.clone()),
            suggested_value: None,
            status: "validated".to_string(),
            last_modified_date: Utc::now(),
        });
        resources.push(resource);
    }
    (resources, translations)
}

fn roundtrip(
    extension: &str,
    language: &str,
    values: &BTreeMap<String, String>,
) -> (BTreeMap<String, String>, Vec<String>) {
    let registry = FormatRegistry::default();
    let (resources, translations) = build_file(language, values);
    let bytes = registry
        .exporter_for(extension)
        .unwrap()
        .export(&resources, &translations, language)
        .unwrap();
    let parsed = registry
        .parser_for(extension)
        .unwrap()
        .parse_bytes(&bytes)
        .unwrap();
    let map = parsed
        .entries
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect();
    (map, parsed.languages)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_resx_roundtrip(values in dataset_strategy(), language in language_strategy()) {
        let (parsed, languages) = roundtrip(".resx", language, &values);
        prop_assert_eq!(parsed, values);
        prop_assert!(languages.is_empty());
    }

    #[test]
    fn prop_json_roundtrip(values in dataset_strategy(), language in language_strategy()) {
        let (parsed, _) = roundtrip(".json", language, &values);
        prop_assert_eq!(parsed, values);
    }

    #[test]
    fn prop_po_roundtrip(values in dataset_strategy(), language in language_strategy()) {
        let (parsed, _) = roundtrip(".po", language, &values);
        prop_assert_eq!(parsed, values);
    }

    #[test]
    fn prop_xliff_roundtrip_keeps_language(values in dataset_strategy(), language in language_strategy()) {
        let (parsed, languages) = roundtrip(".xliff", language, &values);
        prop_assert_eq!(parsed, values);
        prop_assert_eq!(languages, vec![language.to_string()]);
    }
}
