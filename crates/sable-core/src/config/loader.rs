//! Configuration file discovery and loading

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{ConfigWarning, StyleSettings};
use crate::error::SableError;
use crate::result::Result;

/// File names searched in every directory, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[".sablerc.json", "sable.json", "stylecop.json"];

/// Settings together with where they came from and what was wrong with them
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub settings: StyleSettings,
    pub warnings: Vec<ConfigWarning>,
    /// `None` when no file was found and defaults are in use
    pub path: Option<PathBuf>,
}

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by walking up from `start_path`
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| SableError::io_error(start_path, e))?;
        if current.is_file()
            && let Some(parent) = current.parent()
        {
            current = parent.to_path_buf();
        }

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<LoadedConfig> {
        let content = fs::read_to_string(path).map_err(|e| SableError::io_error(path, e))?;
        let mut loaded = Self::parse_document(&content).map_err(|e| match e {
            SableError::ConfigError { message } => SableError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            )),
            other => other,
        })?;
        for warning in &loaded.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        loaded.path = Some(path.to_path_buf());
        Ok(loaded)
    }

    /// Load from an explicit path, or auto-discover from `start_dir`
    ///
    /// An explicit path must exist. When discovery finds nothing the
    /// defaults are returned.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<LoadedConfig> {
        if let Some(path) = custom_path {
            if !path.is_file() {
                return Err(SableError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(LoadedConfig::default())
            }
        }
    }

    /// Parse a JSON-with-comments document
    ///
    /// Both `{ "settings": { ... } }` and a bare settings object are accepted.
    /// Only a document that is not valid JSON5 is an error.
    pub fn parse_document(content: &str) -> Result<LoadedConfig> {
        let document: Value = json5::from_str(content)
            .map_err(|e| SableError::config_error(format!("invalid JSON: {e}")))?;

        let settings_value = match &document {
            Value::Object(object) if object.contains_key("settings") => &object["settings"],
            other => other,
        };
        let (settings, warnings) = StyleSettings::from_value(settings_value);

        Ok(LoadedConfig {
            settings,
            warnings,
            path: None,
        })
    }

    /// Document written by `sable config init`
    pub fn default_document() -> String {
        let document = serde_json::json!({ "settings": StyleSettings::default() });
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
    }

    /// JSON Schema of the settings object
    pub fn schema() -> String {
        let schema = schemars::schema_for!(StyleSettings);
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NewlineAtEndOfFile;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_wrapped_document_with_comments() {
        let loaded = ConfigLoader::parse_document(
            r#"{
                // stylecop.json layout
                "settings": {
                    "layoutRules": { "newlineAtEndOfFile": "require", },
                },
            }"#,
        )
        .unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(
            loaded.settings.layout_rules.newline_at_end_of_file,
            NewlineAtEndOfFile::Require
        );
    }

    #[test]
    fn test_parse_bare_document() {
        let loaded =
            ConfigLoader::parse_document(r#"{ "indentation": { "indentationSize": 2 } }"#).unwrap();
        assert_eq!(loaded.settings.indentation.indentation_size, 2);
    }

    #[test]
    fn test_broken_document_is_an_error() {
        let err = ConfigLoader::parse_document("{ settings: ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_invalid_option_is_a_warning() {
        let loaded =
            ConfigLoader::parse_document(r#"{ "layoutRules": { "allowDoWhileOnClosingBrace": 3 } }"#)
                .unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(!loaded.settings.layout_rules.allow_do_while_on_closing_brace);
    }

    #[test]
    fn test_auto_discover_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/Project");
        fs::create_dir_all(&nested).unwrap();
        let config = create_temp_config(temp_dir.path(), "stylecop.json", "{}");

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert_eq!(found, config.canonicalize().unwrap());
    }

    #[test]
    fn test_auto_discover_priority() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "stylecop.json", "{}");
        create_temp_config(temp_dir.path(), ".sablerc.json", "{}");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap().unwrap();
        assert!(found.ends_with(".sablerc.json"));
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.json");
        assert!(ConfigLoader::load(Some(&missing), None).is_err());
    }

    #[test]
    fn test_load_records_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            "sable.json",
            r#"{ "settings": { "preprocessorSymbols": ["DEBUG"] } }"#,
        );
        let loaded = ConfigLoader::load(Some(&path), None).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.settings.preprocessor_symbols, vec!["DEBUG"]);
    }

    #[test]
    fn test_default_document_round_trips() {
        let loaded = ConfigLoader::parse_document(&ConfigLoader::default_document()).unwrap();
        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
        assert_eq!(loaded.settings, StyleSettings::default());
    }

    #[test]
    fn test_schema_mentions_settings() {
        let schema = ConfigLoader::schema();
        assert!(schema.contains("layoutRules"));
        assert!(schema.contains("allowDoWhileOnClosingBrace"));
    }
}
