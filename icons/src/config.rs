use crate::rules::{MatchRule, RuleError};
use crate::tables::{FileIconEntry, IconDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_ICON: &str = "text";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid match rule: {0}")]
    Rule(#[from] RuleError),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// User settings, read from a TOML file with camelCase keys.
///
/// ```toml
/// bigImageFilePaths = ["logo.*", "**/icon.png"]
/// defaultIcon = "text"
///
/// [[fileIcons]]
/// pattern = '/^justfile$/i'
/// icon = "makefile"
///
/// [languageIcons]
/// astro = "astro"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Glob patterns selecting which tracked file becomes the repository icon
    pub big_image_file_paths: Vec<String>,
    /// Extra file name rules, checked before the built-in table
    pub file_icons: Vec<FileIconEntry>,
    /// Extra language rules, checked before the built-in table
    pub language_icons: BTreeMap<String, IconDescriptor>,
    /// Key returned when nothing matches
    pub default_icon: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            big_image_file_paths: Vec::new(),
            file_icons: Vec::new(),
            language_icons: BTreeMap::new(),
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_toml_str(&contents)?;
        tracing::debug!(
            "Loaded settings from {} ({} image patterns, {} file rules)",
            path.display(),
            settings.big_image_file_paths.len(),
            settings.file_icons.len()
        );
        Ok(settings)
    }

    pub fn with_big_image_file_paths<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.big_image_file_paths = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_file_icon(mut self, pattern: impl Into<String>, icon: IconDescriptor) -> Self {
        self.file_icons.push(FileIconEntry {
            pattern: pattern.into(),
            icon,
        });
        self
    }

    pub fn with_language_icon(mut self, language: impl Into<String>, icon: IconDescriptor) -> Self {
        self.language_icons.insert(language.into(), icon);
        self
    }

    pub fn with_default_icon(mut self, icon: impl Into<String>) -> Self {
        self.default_icon = icon.into();
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.big_image_file_paths.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                message: "bigImageFilePaths cannot contain empty patterns".to_string(),
            });
        }

        if self.default_icon.is_empty() {
            return Err(ConfigError::Invalid {
                message: "defaultIcon cannot be empty".to_string(),
            });
        }

        for entry in &self.file_icons {
            MatchRule::parse(&entry.pattern)?;
            if entry.icon.icon_key().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("fileIcons entry '{}' has an empty icon", entry.pattern),
                });
            }
        }

        if let Some((language, _)) = self
            .language_icons
            .iter()
            .find(|(_, icon)| icon.icon_key().is_empty())
        {
            return Err(ConfigError::Invalid {
                message: format!("languageIcons entry '{}' has an empty icon", language),
            });
        }

        Ok(())
    }
}
