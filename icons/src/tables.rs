//! Icon lookup tables
//!
//! The built-in tables ship as an embedded TOML asset and are compiled into an
//! [`IconTable`] once. User entries from [`Settings`] are placed in front of the
//! built-in ones so they win on overlap.

use crate::config::{ConfigResult, Settings};
use crate::rules::MatchRule;
use serde::{Deserialize, Serialize};

const BUILTIN_TABLES: &str = include_str!("../assets/icons.toml");

/// An icon mapping: either a bare key or a record carrying one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IconDescriptor {
    Key(String),
    Record { image: String },
}

impl IconDescriptor {
    pub fn icon_key(&self) -> &str {
        match self {
            IconDescriptor::Key(key) => key,
            IconDescriptor::Record { image } => image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileIconEntry {
    pub pattern: String,
    pub icon: IconDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageIconEntry {
    pub language: String,
    pub icon: IconDescriptor,
}

#[derive(Debug, Deserialize)]
struct RawTables {
    files: Vec<FileIconEntry>,
    languages: Vec<LanguageIconEntry>,
}

#[derive(Debug, Clone)]
pub struct IconTable {
    files: Vec<(MatchRule, IconDescriptor)>,
    languages: Vec<(String, IconDescriptor)>,
    default_icon: String,
}

impl IconTable {
    /// Built-in tables only
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_settings(&Settings::default())
    }

    pub fn from_settings(settings: &Settings) -> ConfigResult<Self> {
        let raw: RawTables = toml::from_str(BUILTIN_TABLES)?;

        let mut files = Vec::with_capacity(settings.file_icons.len() + raw.files.len());
        for entry in settings.file_icons.iter().chain(raw.files.iter()) {
            files.push((MatchRule::parse(&entry.pattern)?, entry.icon.clone()));
        }

        let languages = settings
            .language_icons
            .iter()
            .map(|(language, icon)| (language.clone(), icon.clone()))
            .chain(raw.languages.into_iter().map(|e| (e.language, e.icon)))
            .collect::<Vec<_>>();

        tracing::debug!(
            "Compiled icon table: {} file rules, {} language rules",
            files.len(),
            languages.len()
        );

        Ok(Self {
            files,
            languages,
            default_icon: settings.default_icon.clone(),
        })
    }

    /// First file rule matching the final path segment of `path`
    pub fn match_file_name(&self, path: &str) -> Option<&IconDescriptor> {
        let name = file_name(path);
        self.files
            .iter()
            .find(|(rule, _)| rule.matches(name))
            .map(|(_, icon)| icon)
    }

    pub fn match_language(&self, language_id: &str) -> Option<&IconDescriptor> {
        self.languages
            .iter()
            .find(|(language, _)| language == language_id)
            .map(|(_, icon)| icon)
    }

    /// Resolve an icon key: file name first, then language, then the default.
    pub fn lookup(&self, path: &str, language_id: &str) -> &str {
        self.match_file_name(path)
            .or_else(|| self.match_language(language_id))
            .map(IconDescriptor::icon_key)
            .unwrap_or(self.default_icon.as_str())
    }

    /// Language rules in lookup order, shadowed duplicates removed
    pub fn languages(&self) -> Vec<(&str, &str)> {
        let mut seen = std::collections::HashSet::new();
        self.languages
            .iter()
            .filter(|(language, _)| seen.insert(language.as_str()))
            .map(|(language, icon)| (language.as_str(), icon.icon_key()))
            .collect()
    }

    pub fn default_icon(&self) -> &str {
        &self.default_icon
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> IconTable {
        IconTable::builtin().unwrap()
    }

    #[test]
    fn test_builtin_tables_compile() {
        let table = table();
        assert!(!table.files.is_empty());
        assert!(!table.languages.is_empty());
        assert_eq!(table.default_icon(), "text");
    }

    #[test]
    fn test_suffix_lookup() {
        assert_eq!(table().lookup("src/main.rs", "rust"), "rust");
        assert_eq!(table().lookup("notes.txt", "plaintext"), "text");
    }

    #[test]
    fn test_specific_names_before_extensions() {
        let table = table();
        assert_eq!(table.lookup("Cargo.toml", "toml"), "cargo");
        assert_eq!(table.lookup("config.toml", "toml"), "toml");
        assert_eq!(table.lookup("types.d.ts", "typescript"), "typescript-def");
        assert_eq!(table.lookup("app.test.tsx", "typescriptreact"), "test");
    }

    #[test]
    fn test_regex_rules() {
        let table = table();
        assert_eq!(table.lookup("Dockerfile", "dockerfile"), "docker");
        assert_eq!(table.lookup("docker-compose.prod.yml", "yaml"), "docker");
        assert_eq!(table.lookup("server.mjs", "javascript"), "js");
        assert_eq!(table.lookup("README.md", "markdown"), "readme");
    }

    #[test]
    fn test_file_name_wins_over_language() {
        // A .rs file declared as plaintext still gets the rust icon
        assert_eq!(table().lookup("lib.rs", "plaintext"), "rust");
    }

    #[test]
    fn test_language_fallback() {
        assert_eq!(table().lookup("BUILD", "python"), "python");
        assert_eq!(table().lookup("COMMIT_EDITMSG", "git-commit"), "git");
    }

    #[test]
    fn test_default_when_nothing_matches() {
        assert_eq!(table().lookup("mystery", "unknown-language"), "text");
    }

    #[test]
    fn test_record_descriptor() {
        assert_eq!(table().lookup("photo.JPEG", "unknown"), "image");
    }

    #[test]
    fn test_windows_separators() {
        assert_eq!(table().lookup(r"C:\work\crate\build.rs", ""), "rust");
    }

    #[test]
    fn test_user_entries_take_precedence() {
        let settings = Settings::new()
            .with_file_icon(".rs", IconDescriptor::Key("ferris".to_string()))
            .with_language_icon("python", IconDescriptor::Record {
                image: "snake".to_string(),
            })
            .with_default_icon("blank");
        let table = IconTable::from_settings(&settings).unwrap();

        assert_eq!(table.lookup("main.rs", "rust"), "ferris");
        assert_eq!(table.lookup("BUILD", "python"), "snake");
        assert_eq!(table.lookup("mystery", "none"), "blank");
    }

    #[test]
    fn test_languages_listing_deduplicates() {
        let settings = Settings::new()
            .with_language_icon("rust", IconDescriptor::Key("ferris".to_string()));
        let table = IconTable::from_settings(&settings).unwrap();
        let rust: Vec<_> = table
            .languages()
            .into_iter()
            .filter(|(language, _)| *language == "rust")
            .collect();
        assert_eq!(rust, vec![("rust", "ferris")]);
    }
}
