//! All error types for the polyglot crate.
//!
//! [`Error`] is raised by parsers and exporters for format-level failures.
//! [`ServiceError`] is the taxonomy surfaced by [`crate::ResourceFileService`].

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("invalid resource: {0}")]
    InvalidResource(String),
}

/// Errors returned by the upload and download pipelines.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("a file named `{name}` already exists for this component")]
    Conflict { name: String },

    #[error("file parsing failed: {0}")]
    Parse(#[source] Error),

    #[error("no translation entries found in `{0}`")]
    EmptyFile(String),

    #[error("no exporter available for format `{0}`")]
    DownloadFormatUnavailable(String),

    #[error("export failed: {0}")]
    Export(#[source] Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub(crate) fn component_not_found(id: Uuid) -> Self {
        ServiceError::NotFound {
            entity: "component",
            id,
        }
    }

    pub(crate) fn resource_file_not_found(id: Uuid) -> Self {
        ServiceError::NotFound {
            entity: "resource file",
            id,
        }
    }

    /// Whether the error was caused by the caller's input rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Store(_) | ServiceError::Export(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unknown_format_error() {
        let error = Error::UnknownFormat("invalid_format".to_string());
        assert_eq!(error.to_string(), "unknown format `invalid_format`");
    }

    #[test]
    fn test_parse_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::Parse(json_error);
        assert!(error.to_string().contains("parse error"));
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_resource_error() {
        let error = Error::InvalidResource("arrays are not supported".to_string());
        assert_eq!(
            error.to_string(),
            "invalid resource: arrays are not supported"
        );
    }

    #[test]
    fn test_not_found_messages() {
        let id = Uuid::nil();
        assert_eq!(
            ServiceError::component_not_found(id).to_string(),
            format!("component `{id}` not found")
        );
        assert_eq!(
            ServiceError::resource_file_not_found(id).to_string(),
            format!("resource file `{id}` not found")
        );
    }

    #[test]
    fn test_parse_error_keeps_source() {
        use std::error::Error as _;

        let inner = Error::DataMismatch("bad".to_string());
        let error = ServiceError::Parse(inner);
        assert!(error.to_string().starts_with("file parsing failed"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_service_error_display_is_never_empty() {
        let errors = vec![
            ServiceError::UnsupportedFormat(".unsupported".to_string()),
            ServiceError::Conflict {
                name: "test.json".to_string(),
            },
            ServiceError::EmptyFile("test.po".to_string()),
            ServiceError::DownloadFormatUnavailable(".csv".to_string()),
            ServiceError::Cancelled,
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
            assert!(error.is_client_error());
        }
    }
}
