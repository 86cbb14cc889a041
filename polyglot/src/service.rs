//! The upload and download pipelines.
//!
//! [`ResourceFileService`] ties the [`FormatRegistry`] to a [`TranslationStore`]:
//! uploads are parsed, grouped by key and written as one atomic import;
//! downloads read a snapshot of a resource file and export it in any
//! registered format, filling missing translations with the placeholder.

use std::{
    collections::{HashMap, HashSet},
    io::Cursor,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use unic_langid::LanguageIdentifier;
use uuid::Uuid;

use crate::{
    config::{ServiceConfig, UntaggedEntries},
    error::ServiceError,
    registry::{FormatRegistry, extension_of, file_name_of, replace_extension},
    store::{ImportRequest, ImportedResource, ImportedTranslation, StoreError, TranslationStore},
    types::{ResourceFile, TranslationFileParseResult},
};

/// Cooperative cancellation flag shared between a caller and a running pipeline.
///
/// Checked between pipeline stages; a cancelled upload never reaches the store.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.is_cancelled() {
            Err(ServiceError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// An exported file ready to be sent to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

impl FileDownload {
    /// The exported bytes as a readable stream.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.bytes)
    }
}

/// Import/export orchestrator over a translation store.
#[derive(Debug)]
pub struct ResourceFileService<S> {
    store: S,
    registry: FormatRegistry,
    config: ServiceConfig,
}

impl<S: TranslationStore> ResourceFileService<S> {
    /// Creates a service with the default formats and options.
    pub fn new(store: S) -> Self {
        ResourceFileService {
            store,
            registry: FormatRegistry::default(),
            config: ServiceConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: FormatRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Extensions that can be downloaded, e.g. `[".resx", ".json", ".po", ".xliff"]`.
    pub fn supported_formats(&self) -> Vec<&'static str> {
        self.registry.supported_formats()
    }

    /// Imports a translation file into a component.
    ///
    /// `language` applies to entries whose format carries no language of its
    /// own; an empty string counts as absent.
    pub fn upload(
        &mut self,
        component_id: Uuid,
        language: Option<&str>,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ResourceFile, ServiceError> {
        self.upload_with_cancellation(
            component_id,
            language,
            file_name,
            bytes,
            &CancellationToken::new(),
        )
    }

    pub fn upload_with_cancellation(
        &mut self,
        component_id: Uuid,
        language: Option<&str>,
        file_name: &str,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ResourceFile, ServiceError> {
        let result = self.run_upload(component_id, language, file_name, bytes, cancel);
        match &result {
            Ok(file) => log::info!(
                "uploaded `{}` into component {} as resource file {}",
                file.name,
                component_id,
                file.id
            ),
            Err(e) => log::warn!("rejected upload of `{file_name}`: {e}"),
        }
        result
    }

    fn run_upload(
        &mut self,
        component_id: Uuid,
        language: Option<&str>,
        file_name: &str,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ResourceFile, ServiceError> {
        let context = self
            .store
            .find_component(component_id)?
            .ok_or_else(|| ServiceError::component_not_found(component_id))?;

        let name = file_name_of(file_name).to_string();
        let extension = extension_of(&name).unwrap_or_default();
        let parser = self
            .registry
            .parser_for(&extension)
            .ok_or_else(|| ServiceError::UnsupportedFormat(display_extension(&extension)))?;

        if self.store.resource_file_exists(component_id, &name)? {
            return Err(ServiceError::Conflict { name });
        }

        let language = language.map(str::trim).filter(|l| !l.is_empty());

        cancel.check()?;
        let parsed = parser.parse_bytes(bytes).map_err(ServiceError::Parse)?;
        if parsed.is_empty() {
            return Err(ServiceError::EmptyFile(name));
        }

        cancel.check()?;
        let resources = build_import(
            &parsed,
            language,
            self.config.untagged_entries,
            &self.config.import_status,
        );

        cancel.check()?;
        let request = ImportRequest {
            name,
            component_id,
            project_id: context.project.id,
            solution_id: context.solution_id(),
            resources,
        };
        self.store.import(request).map_err(|e| match e {
            StoreError::Conflict { name, .. } => ServiceError::Conflict { name },
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Store(other),
        })
    }

    /// Exports a stored resource file.
    ///
    /// `format` defaults to [`ServiceConfig::default_format`]; `language`
    /// defaults to the language of the file's first translation, then to
    /// [`ServiceConfig::default_language`].
    pub fn download(
        &self,
        resource_file_id: Uuid,
        format: Option<&str>,
        language: Option<&str>,
    ) -> Result<FileDownload, ServiceError> {
        self.download_with_cancellation(
            resource_file_id,
            format,
            language,
            &CancellationToken::new(),
        )
    }

    pub fn download_with_cancellation(
        &self,
        resource_file_id: Uuid,
        format: Option<&str>,
        language: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<FileDownload, ServiceError> {
        let snapshot = self
            .store
            .load_resource_file(resource_file_id)?
            .ok_or_else(|| ServiceError::resource_file_not_found(resource_file_id))?;

        let format = format
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.config.default_format);
        let exporter = self
            .registry
            .exporter_for(format)
            .ok_or_else(|| ServiceError::DownloadFormatUnavailable(format.to_string()))?;

        let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
            Some(code) => code.to_string(),
            None => snapshot
                .translations
                .first()
                .map(|t| t.language.clone())
                .unwrap_or_else(|| self.config.default_language.clone()),
        };

        cancel.check()?;
        let bytes = exporter
            .export(&snapshot.resources, &snapshot.translations, &language)
            .map_err(ServiceError::Export)?;

        let download = FileDownload {
            bytes,
            content_type: exporter.content_type().to_string(),
            file_name: replace_extension(&snapshot.file.name, exporter.file_extension()),
        };
        log::info!(
            "downloaded resource file {} as `{}` in `{}` ({} bytes)",
            resource_file_id,
            download.file_name,
            language,
            download.bytes.len()
        );
        Ok(download)
    }
}

fn display_extension(extension: &str) -> String {
    if extension.is_empty() {
        "(none)".to_string()
    } else {
        extension.to_string()
    }
}

/// Whether `code` reads as a BCP 47 language identifier. Codes are stored
/// as given either way.
fn is_language_identifier(code: &str) -> bool {
    code.parse::<LanguageIdentifier>().is_ok()
}

/// Groups parsed entries by key into the resources and translations to create.
fn build_import(
    parsed: &TranslationFileParseResult,
    upload_language: Option<&str>,
    untagged: UntaggedEntries,
    status: &str,
) -> Vec<ImportedResource> {
    let mut resources: Vec<ImportedResource> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut checked_languages: HashSet<&str> = HashSet::new();

    for entry in &parsed.entries {
        let position = match index.get(entry.key.as_str()) {
            Some(position) => *position,
            None => {
                index.insert(&entry.key, resources.len());
                resources.push(ImportedResource {
                    key: entry.key.clone(),
                    source_value: entry.value.clone(),
                    description: None,
                    translations: Vec::new(),
                });
                resources.len() - 1
            }
        };
        let resource = &mut resources[position];
        if resource.description.is_none() {
            resource.description = entry.description.clone().filter(|d| !d.is_empty());
        }

        let (language, validated) = match entry.language.as_deref() {
            Some(language) => (language, true),
            None => match (upload_language, untagged) {
                (None, _) | (_, UntaggedEntries::Skip) => continue,
                (Some(language), UntaggedEntries::Validated) => (language, true),
                (Some(language), UntaggedEntries::Suggested) => (language, false),
            },
        };
        if checked_languages.insert(language) && !is_language_identifier(language) {
            log::warn!("language `{language}` is not a BCP 47 identifier, stored as given");
        }

        let translation = ImportedTranslation {
            language: language.to_string(),
            validated_value: validated.then(|| entry.value.clone()),
            suggested_value: (!validated).then(|| entry.value.clone()),
            status: status.to_string(),
        };
        match resource
            .translations
            .iter_mut()
            .find(|t| t.language == language)
        {
            Some(existing) => *existing = translation,
            None => resource.translations.push(translation),
        }
    }

    resources
}
