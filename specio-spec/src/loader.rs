//! Specification document loaders

use crate::spec::Specification;
use crate::{Result, SpecError};
use std::fs;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }

    /// Guess the format of an in-memory document.
    ///
    /// JSON documents start with `{`; anything else is treated as YAML,
    /// which is a superset for our purposes.
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            DocumentFormat::Json
        } else {
            DocumentFormat::Yaml
        }
    }

    /// Guess the format from a `Content-Type` header value.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next()?.trim().to_lowercase();
        if mime.ends_with("json") {
            Some(DocumentFormat::Json)
        } else if mime.ends_with("yaml") || mime.ends_with("yml") {
            Some(DocumentFormat::Yaml)
        } else {
            None
        }
    }
}

impl Specification {
    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a document in the given format.
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self> {
        match format {
            DocumentFormat::Json => Self::from_json_str(content),
            DocumentFormat::Yaml => Self::from_yaml_str(content),
        }
    }

    /// Convert an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load a document from disk, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SpecError::UnsupportedFormat(path.display().to_string()))?;
        let format = DocumentFormat::from_extension(ext)
            .ok_or_else(|| SpecError::UnsupportedFormat(ext.to_string()))?;

        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), ?format, "Loading specification");
        Self::parse(&content, format)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
