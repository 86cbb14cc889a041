//! All supported translation file formats for polyglot.
//!
//! Each format is a unit struct implementing both
//! [`crate::traits::TranslationFileParser`] and
//! [`crate::traits::TranslationFileExporter`]. [`FormatType`] names them for
//! generic handling across the crate.

pub mod json;
pub mod po;
pub mod resx;
pub mod xliff;

mod xml;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

// Reexporting the formats for easier access
pub use json::Format as JsonFormat;
pub use po::Format as PoFormat;
pub use resx::Format as ResxFormat;
pub use xliff::Format as XliffFormat;

use crate::Error;

/// Represents all built-in translation file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// .NET `.resx` XML resources.
    Resx,
    /// Flat or per-language JSON objects.
    Json,
    /// gettext `.po` catalogs.
    Po,
    /// XLIFF 1.2 documents.
    Xliff,
}

impl FormatType {
    /// Every built-in format, in registration order.
    pub const ALL: [FormatType; 4] = [
        FormatType::Resx,
        FormatType::Json,
        FormatType::Po,
        FormatType::Xliff,
    ];

    /// Returns the dot-prefixed file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Resx => ".resx",
            FormatType::Json => ".json",
            FormatType::Po => ".po",
            FormatType::Xliff => ".xliff",
        }
    }

    /// Returns the MIME type used when serving this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            FormatType::Resx | FormatType::Xliff => "application/xml",
            FormatType::Json => "application/json",
            FormatType::Po => "text/plain",
        }
    }

    /// Infers the format from a file name such as `Strings.fr.resx`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        crate::registry::extension_of(file_name).and_then(|ext| ext.parse().ok())
    }
}

impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Resx => write!(f, "resx"),
            FormatType::Json => write!(f, "json"),
            FormatType::Po => write!(f, "po"),
            FormatType::Xliff => write!(f, "xliff"),
        }
    }
}

/// Accepts extensions with or without the leading dot, in any case.
///
/// ```rust
/// use polyglot::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str(".RESX").unwrap(), FormatType::Resx);
/// assert_eq!(FormatType::from_str("xlf").unwrap(), FormatType::Xliff);
/// assert!(FormatType::from_str(".unsupported").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match s.as_str() {
            "resx" => Ok(FormatType::Resx),
            "json" => Ok(FormatType::Json),
            "po" => Ok(FormatType::Po),
            "xliff" | "xlf" => Ok(FormatType::Xliff),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}
