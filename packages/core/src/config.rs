//! Configuration for the page tree services
//!
//! All fields have defaults, so an empty JSON object (or no file at all) is a
//! valid configuration.
//!
//! ```rust
//! use pagetree_core::config::TreeConfig;
//!
//! let config = TreeConfig::from_json_str(r#"{ "defaultLanguage": "de" }"#).unwrap();
//! assert_eq!(config.default_language, "de");
//! assert_eq!(config.min_urlname_length, 3);
//! ```

use crate::naming::MIN_URLNAME_LENGTH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeConfig {
    /// Urlnames that can never be assigned
    pub reserved_urlnames: Vec<String>,

    /// Minimum urlname length; also the padding width of short segments
    pub min_urlname_length: usize,

    /// Language for pages created without one and without a parent
    pub default_language: String,

    /// Copy suffix per language code ("Source (Copy)")
    pub copy_labels: BTreeMap<String, String>,

    /// Prefix of generated cache keys
    pub cache_namespace: String,

    /// Actor attribute used as the lock owner id
    pub actor_identity_field: String,

    /// Also record legacy urls for descendants rewritten by a cascade
    pub record_descendant_legacy_urls: bool,

    /// Retry budget of the conflict retry queue
    pub conflict_retries: usize,

    /// Fallback log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        let copy_labels = [("en", "Copy"), ("de", "Kopie")]
            .into_iter()
            .map(|(lang, label)| (lang.to_string(), label.to_string()))
            .collect();

        Self {
            reserved_urlnames: vec![
                "admin".to_string(),
                "messages".to_string(),
                "new".to_string(),
            ],
            min_urlname_length: MIN_URLNAME_LENGTH,
            default_language: "en".to_string(),
            copy_labels,
            cache_namespace: "pagetree/pages".to_string(),
            actor_identity_field: "id".to_string(),
            record_descendant_legacy_urls: true,
            conflict_retries: 3,
            log_filter: "info".to_string(),
        }
    }
}

impl TreeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_urlname_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "minUrlnameLength".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.default_language.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "defaultLanguage".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        if self.actor_identity_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "actorIdentityField".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_reserved(&self, urlname: &str) -> bool {
        self.reserved_urlnames.iter().any(|reserved| reserved == urlname)
    }

    /// Copy suffix for a language, falling back to English, then "Copy"
    pub fn copy_label(&self, language_code: &str) -> &str {
        self.copy_labels
            .get(language_code)
            .or_else(|| self.copy_labels.get("en"))
            .map(String::as_str)
            .unwrap_or("Copy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::default();

        assert!(config.is_reserved("admin"));
        assert!(config.is_reserved("messages"));
        assert!(config.is_reserved("new"));
        assert!(!config.is_reserved("news"));
        assert_eq!(config.min_urlname_length, 3);
        assert_eq!(config.actor_identity_field, "id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TreeConfig::from_json_str(
            r#"{ "reservedUrlnames": ["login"], "actorIdentityField": "user_id" }"#,
        )
        .unwrap();

        assert!(config.is_reserved("login"));
        assert!(!config.is_reserved("admin"));
        assert_eq!(config.actor_identity_field, "user_id");
        assert_eq!(config.default_language, "en");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = TreeConfig::from_json_str(r#"{ "minUrlnameLength": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = TreeConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_copy_label_falls_back() {
        let config = TreeConfig::default();

        assert_eq!(config.copy_label("de"), "Kopie");
        assert_eq!(config.copy_label("fr"), "Copy");

        let bare = TreeConfig {
            copy_labels: BTreeMap::new(),
            ..TreeConfig::default()
        };
        assert_eq!(bare.copy_label("de"), "Copy");
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, r#"{{ "cacheNamespace": "site/pages", "conflictRetries": 5 }}"#)?;

        let config = TreeConfig::load(file.path())?;
        assert_eq!(config.cache_namespace, "site/pages");
        assert_eq!(config.conflict_retries, 5);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let err = TreeConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
