#![forbid(unsafe_code)]
//! Translation file interchange for a translation-management backend.
//!
//! Parses RESX, JSON, gettext PO and XLIFF files into a normalized
//! key → language → value model, persists it through a [`TranslationStore`],
//! and exports it back into any supported format.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use polyglot::{ResourceFileService, SqliteStore};
//!
//! let store = SqliteStore::open("polyglot.sqlite")?;
//! let solution = store.create_solution("shop", "Shop")?;
//! let project = store.create_project(solution.id, "web", "Web")?;
//! let component = store.create_component(project.id, "checkout", "Checkout")?;
//!
//! let mut service = ResourceFileService::new(store);
//! let file = service.upload(
//!     component.id,
//!     Some("en"),
//!     "checkout.resx",
//!     br#"<root><data name="Pay"><value>Pay now</value></data></root>"#,
//! )?;
//! let download = service.download(file.id, Some(".json"), Some("fr"))?;
//! assert_eq!(download.file_name, "checkout.json");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Formats
//!
//! - **RESX**: .NET XML resource files (monolingual)
//! - **JSON**: flat `{"key": "value"}` or per-language `{"fr": {"key": "value"}}`
//! - **PO**: gettext catalogs with an optional `Language:` header
//! - **XLIFF**: XLIFF 1.2 documents with one or more `<file>` elements
//!
//! Missing translations are exported as the `##key in language##` placeholder,
//! identical in every format.

pub mod config;
pub mod error;
pub mod fallback;
pub mod formats;
pub mod registry;
pub mod service;
pub mod store;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    config::{ServiceConfig, UntaggedEntries},
    error::{Error, ServiceError},
    fallback::{TranslationLookup, placeholder},
    formats::FormatType,
    registry::FormatRegistry,
    service::{CancellationToken, FileDownload, ResourceFileService},
    store::{SqliteStore, StoreError, TranslationStore},
    traits::{TranslationFileExporter, TranslationFileParser},
    types::{
        Component, Project, ResourceFile, ResourceTranslation, Solution, TranslatableResource,
        TranslationEntry, TranslationFileParseResult, TranslationNeed,
    },
};
