//! Raw level documents
//!
//! A raw document is the untouched bytes read from storage plus the format
//! they are written in. Parsing produces an untyped `serde_json::Value`
//! tree; YAML documents are read into the same tree so the validation
//! engine never has to care which format a level was written in.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Serialization format of a raw level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// JSON (`.json`)
    #[default]
    Json,
    /// YAML (`.yaml`, `.yml`)
    Yaml,
}

impl DocumentFormat {
    /// File extensions recognized as level documents, in lookup order.
    pub const EXTENSIONS: [&'static str; 3] = ["json", "yaml", "yml"];

    /// Maps a file extension (without the dot, any case) to a format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Maps a file path to a format by its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes of one level document, exactly as storage returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Format the bytes are written in
    pub format: DocumentFormat,
    /// Document content
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Wraps raw bytes.
    pub fn new(format: DocumentFormat, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            bytes: bytes.into(),
        }
    }

    /// Wraps JSON text.
    pub fn json(text: impl Into<Vec<u8>>) -> Self {
        Self::new(DocumentFormat::Json, text)
    }

    /// Wraps YAML text.
    pub fn yaml(text: impl Into<Vec<u8>>) -> Self {
        Self::new(DocumentFormat::Yaml, text)
    }

    /// Parses the bytes into an untyped document tree.
    ///
    /// A leading UTF-8 BOM is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Syntax`] if the bytes are not UTF-8, the
    /// document is empty, or the parser rejects it.
    pub fn parse(&self) -> Result<Value, ValidationError> {
        let text = std::str::from_utf8(&self.bytes).map_err(|e| ValidationError::Syntax {
            format: self.format,
            line: None,
            message: format!("document is not valid UTF-8: {e}"),
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        if text.trim().is_empty() {
            return Err(ValidationError::Syntax {
                format: self.format,
                line: None,
                message: "document is empty".to_string(),
            });
        }

        match self.format {
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| ValidationError::Syntax {
                    format: self.format,
                    line: Some(e.line()),
                    message: e.to_string(),
                })
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| ValidationError::Syntax {
                    format: self.format,
                    line: e.location().map(|l| l.line()),
                    message: e.to_string(),
                })
            }
        }
    }
}
