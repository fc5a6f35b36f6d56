//! Urlname Validation
//!
//! Rules run in a fixed order and stop at the first failure:
//!
//! 1. presence of `name`
//! 2. uniqueness of `urlname` inside its scope (excluding the page itself)
//! 3. `urlname` is not a reserved system name
//! 4. `urlname` reaches the minimum length
//!
//! Uniqueness is read through the open transaction, so it sees the writes
//! the same operation has already buffered. The store checks uniqueness
//! again at commit; that later check is what catches concurrent writers.

use crate::config::TreeConfig;
use crate::db::StoreTransaction;
use crate::models::{Page, UrlScope};
use crate::services::error::{PageServiceError, ValidationError, ValidationRule};

/// Anything that owns a derived urlname
///
/// Validation and path derivation only need these accessors, whichever
/// partition the owner lives in.
pub trait PathOwner: Send + Sync {
    fn owner_id(&self) -> &str;
    fn path_name(&self) -> &str;
    fn urlname(&self) -> Option<&str>;
    fn url_scope(&self) -> UrlScope;
}

impl PathOwner for Page {
    fn owner_id(&self) -> &str {
        &self.id
    }

    fn path_name(&self) -> &str {
        &self.name
    }

    fn urlname(&self) -> Option<&str> {
        self.urlname.as_deref()
    }

    fn url_scope(&self) -> UrlScope {
        self.scope()
    }
}

fn check_presence(owner: &dyn PathOwner) -> Result<(), ValidationError> {
    if owner.path_name().trim().is_empty() {
        return Err(ValidationError::new("name", ValidationRule::Presence));
    }
    Ok(())
}

/// Reserved names, then minimum length
fn check_urlname_shape(owner: &dyn PathOwner, config: &TreeConfig) -> Result<(), ValidationError> {
    let Some(urlname) = owner.urlname() else {
        return Ok(());
    };
    if config.is_reserved(urlname) {
        return Err(ValidationError::new("urlname", ValidationRule::Reserved));
    }
    if urlname.chars().count() < config.min_urlname_length {
        return Err(ValidationError::new("urlname", ValidationRule::MinLength));
    }
    Ok(())
}

/// Run every rule in order against the state visible to `tx`
pub async fn validate_page(
    tx: &mut dyn StoreTransaction,
    owner: &dyn PathOwner,
    config: &TreeConfig,
) -> Result<(), PageServiceError> {
    check_presence(owner)?;

    if let Some(urlname) = owner.urlname() {
        if let Some(existing) = tx.find_by_urlname(urlname, &owner.url_scope()).await? {
            if existing.id != owner.owner_id() {
                tracing::debug!(
                    "Urlname '{}' in {} already taken by page {}",
                    urlname,
                    owner.url_scope(),
                    existing.id
                );
                return Err(ValidationError::new("urlname", ValidationRule::Uniqueness).into());
            }
        }
    }

    check_urlname_shape(owner, config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, PageStore};
    use crate::models::NewPage;
    use chrono::Utc;

    fn page(name: &str, urlname: Option<&str>) -> Page {
        let mut page = Page::from_new(NewPage::new(name), "en".to_string(), Utc::now());
        page.urlname = urlname.map(str::to_string);
        page
    }

    #[test]
    fn test_blank_name_fails_presence() {
        let err = check_presence(&page("  ", None)).unwrap_err();
        assert_eq!(err, ValidationError::new("name", ValidationRule::Presence));
        assert!(check_presence(&page("Home", None)).is_ok());
    }

    #[test]
    fn test_reserved_checked_before_length() {
        let mut config = TreeConfig::default();
        config.reserved_urlnames.push("ab".to_string());

        let err = check_urlname_shape(&page("Ab", Some("ab")), &config).unwrap_err();
        assert_eq!(err.rule, ValidationRule::Reserved);
    }

    #[test]
    fn test_short_urlname_fails_min_length() {
        let config = TreeConfig::default();
        let err = check_urlname_shape(&page("Ab", Some("ab")), &config).unwrap_err();
        assert_eq!(err.rule, ValidationRule::MinLength);

        assert!(check_urlname_shape(&page("Ab", Some("-ab")), &config).is_ok());
    }

    #[tokio::test]
    async fn test_uniqueness_excludes_self_and_precedes_reserved() {
        let store = MemoryStore::new();
        let config = TreeConfig::default();
        let existing = page("Admin", Some("admin"));
        {
            let mut tx = store.begin(&[]).await.unwrap();
            tx.insert_page(existing.clone()).await.unwrap();
            tx.commit().await.unwrap();
        }

        let mut tx = store.begin(&[]).await.unwrap();
        // The page itself: uniqueness passes, reserved fails
        let err = validate_page(tx.as_mut(), &existing, &config).await.unwrap_err();
        assert_eq!(err.as_validation().map(|e| e.rule), Some(ValidationRule::Reserved));

        // Another page with the same urlname: uniqueness fails first
        let other = page("Other", Some("admin"));
        let err = validate_page(tx.as_mut(), &other, &config).await.unwrap_err();
        assert_eq!(err.as_validation().map(|e| e.rule), Some(ValidationRule::Uniqueness));
    }

    #[tokio::test]
    async fn test_same_urlname_allowed_in_other_language() {
        let store = MemoryStore::new();
        let config = TreeConfig::default();
        {
            let mut tx = store.begin(&[]).await.unwrap();
            tx.insert_page(page("Contact", Some("contact"))).await.unwrap();
            tx.commit().await.unwrap();
        }

        let mut german = page("Contact", Some("contact"));
        german.language_code = "de".to_string();
        let mut tx = store.begin(&[]).await.unwrap();
        assert!(validate_page(tx.as_mut(), &german, &config).await.is_ok());
    }
}
