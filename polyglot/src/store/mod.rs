//! Persistence of resource files, resources, translations and translation needs.
//!
//! The orchestrator talks to storage through [`TranslationStore`]. An upload is
//! handed over as one [`ImportRequest`] so the store can write it atomically,
//! including the find-or-create of translation needs.

mod sqlite;

pub use sqlite::SqliteStore;

use thiserror::Error;
use uuid::Uuid;

use crate::types::{Component, Project, ResourceFile, ResourceTranslation, TranslatableResource};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("a file named `{name}` already exists for component `{component_id}`")]
    Conflict { component_id: Uuid, name: String },

    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: Uuid },
}

/// A component with the project (and so the solution) that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentContext {
    pub component: Component,
    pub project: Project,
}

impl ComponentContext {
    pub fn solution_id(&self) -> Uuid {
        self.project.solution_id
    }
}

/// Translation to create for an imported resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTranslation {
    /// Code of the translation need, created on demand in the solution.
    pub language: String,
    pub validated_value: Option<String>,
    pub suggested_value: Option<String>,
    pub status: String,
}

/// Resource to create, with its translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedResource {
    pub key: String,
    pub source_value: String,
    pub description: Option<String>,
    pub translations: Vec<ImportedTranslation>,
}

/// Everything one upload writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub name: String,
    pub component_id: Uuid,
    pub project_id: Uuid,
    /// Scope of the translation needs created on demand.
    pub solution_id: Uuid,
    /// Resources in source order; keys are distinct.
    pub resources: Vec<ImportedResource>,
}

/// A resource file with its resources and their translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFileSnapshot {
    pub file: ResourceFile,
    /// In source order.
    pub resources: Vec<TranslatableResource>,
    /// Grouped by resource, in creation order.
    pub translations: Vec<ResourceTranslation>,
}

pub trait TranslationStore {
    fn find_component(&self, id: Uuid) -> Result<Option<ComponentContext>, StoreError>;

    fn resource_file_exists(&self, component_id: Uuid, name: &str) -> Result<bool, StoreError>;

    /// Writes the whole request or nothing. A file of the same name in the
    /// component yields [`StoreError::Conflict`].
    fn import(&mut self, request: ImportRequest) -> Result<ResourceFile, StoreError>;

    /// Point-in-time read of one file's resource/translation graph.
    fn load_resource_file(&self, id: Uuid) -> Result<Option<ResourceFileSnapshot>, StoreError>;
}
