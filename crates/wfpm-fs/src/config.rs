//! Typed configuration loading

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result, io};

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Loads typed configuration documents.
///
/// The format is always given by the caller, since files such as the `.wfpm`
/// marker carry no extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file in the given format.
    pub fn load_as<T: DeserializeOwned>(&self, path: &Path, format: ConfigFormat) -> Result<T> {
        let content = io::read_text(path)?;
        self.parse(path, &content, format)
    }

    /// Parse already-read content; `path` is only used for error reporting.
    pub fn parse<T: DeserializeOwned>(
        &self,
        path: &Path,
        content: &str,
        format: ConfigFormat,
    ) -> Result<T> {
        let parsed = match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.label().into(),
            message,
        })
    }
}
