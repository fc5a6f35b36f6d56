//! Configuration and Logging Tests
//!
//! Loading `TreeConfig` from disk and checking that the loaded values
//! change service behaviour.

#[cfg(test)]
mod config_tests {
    use anyhow::Result;
    use pagetree_core::config::{ConfigError, TreeConfig};
    use pagetree_core::db::MemoryStore;
    use pagetree_core::models::{CopyOverrides, NewPage};
    use pagetree_core::services::{PageService, ValidationRule};
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(json.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn test_loaded_config_drives_services() -> Result<()> {
        let file = write_config(
            r#"{
                "reservedUrlnames": ["login"],
                "defaultLanguage": "fr",
                "copyLabels": { "fr": "Copie" }
            }"#,
        )?;
        let config = TreeConfig::load(file.path())?;
        pagetree_core::logging::init(&config);

        let service = PageService::new(Arc::new(MemoryStore::new()), config);
        tokio_test::block_on(async {
            let page = service.create(NewPage::new("Accueil")).await?;
            assert_eq!(page.language_code, "fr");

            let copy = service.copy(&page.id, CopyOverrides::new()).await?;
            assert_eq!(copy.name, "Accueil (Copie)");

            let err = service.create(NewPage::new("Login")).await.unwrap_err();
            assert_eq!(err.as_validation().map(|v| v.rule), Some(ValidationRule::Reserved));

            // The default reserved set was replaced
            tokio_test::assert_ok!(service.create(NewPage::new("Admin")).await);
            Ok::<(), anyhow::Error>(())
        })
    }

    #[test]
    fn test_invalid_config_is_rejected() -> Result<()> {
        let file = write_config(r#"{ "minUrlnameLength": 0 }"#)?;
        let err = TreeConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let file = write_config("not json")?;
        let err = TreeConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        Ok(())
    }
}
