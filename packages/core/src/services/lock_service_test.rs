//! Tests for LockService
//!
//! Tests cover:
//! - Lock/unlock leave `updated_at` alone
//! - Exclusive holder and idempotent relock
//! - Preview marker clearing on unlock, only after a successful commit
//! - Lock queries and locker display names

#[cfg(test)]
mod tests {
    use crate::config::TreeConfig;
    use crate::db::{MemoryStore, PageStore, StoreError, StoreResult, StoreTransaction};
    use crate::models::{
        Actor, LegacyUrl, ManualTimeProvider, NewPage, Page, PageFilter, PreviewContext, UrlScope,
    };
    use crate::services::{
        LockService, MemoryActorDirectory, PageService, PageServiceError, UNKNOWN_ACTOR,
    };
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// MemoryStore whose commits fail while `fail` is set
    struct FlakyStore {
        inner: MemoryStore,
        fail: Arc<AtomicBool>,
    }

    struct FlakyTransaction {
        inner: Box<dyn StoreTransaction>,
        fail: bool,
    }

    #[async_trait]
    impl PageStore for FlakyStore {
        async fn get_page(&self, id: &str) -> StoreResult<Option<Page>> {
            self.inner.get_page(id).await
        }

        async fn find_by_urlname(
            &self,
            urlname: &str,
            scope: &UrlScope,
        ) -> StoreResult<Option<Page>> {
            self.inner.find_by_urlname(urlname, scope).await
        }

        async fn get_children(&self, id: &str) -> StoreResult<Vec<Page>> {
            self.inner.get_children(id).await
        }

        async fn get_ancestors(&self, id: &str) -> StoreResult<Vec<Page>> {
            self.inner.get_ancestors(id).await
        }

        async fn get_descendants(&self, id: &str) -> StoreResult<Vec<Page>> {
            self.inner.get_descendants(id).await
        }

        async fn query_pages(&self, filter: &PageFilter) -> StoreResult<Vec<Page>> {
            self.inner.query_pages(filter).await
        }

        async fn legacy_urls_for(&self, page_id: &str) -> StoreResult<Vec<LegacyUrl>> {
            self.inner.legacy_urls_for(page_id).await
        }

        async fn find_legacy_urls(&self, urlname: &str) -> StoreResult<Vec<LegacyUrl>> {
            self.inner.find_legacy_urls(urlname).await
        }

        async fn begin(&self, roots: &[&str]) -> StoreResult<Box<dyn StoreTransaction>> {
            Ok(Box::new(FlakyTransaction {
                inner: self.inner.begin(roots).await?,
                fail: self.fail.load(Ordering::SeqCst),
            }))
        }
    }

    #[async_trait]
    impl StoreTransaction for FlakyTransaction {
        async fn get_page(&mut self, id: &str) -> StoreResult<Option<Page>> {
            self.inner.get_page(id).await
        }

        async fn get_children(&mut self, id: &str) -> StoreResult<Vec<Page>> {
            self.inner.get_children(id).await
        }

        async fn find_by_urlname(
            &mut self,
            urlname: &str,
            scope: &UrlScope,
        ) -> StoreResult<Option<Page>> {
            self.inner.find_by_urlname(urlname, scope).await
        }

        async fn insert_page(&mut self, page: Page) -> StoreResult<()> {
            self.inner.insert_page(page).await
        }

        async fn update_page(&mut self, page: Page) -> StoreResult<()> {
            self.inner.update_page(page).await
        }

        async fn delete_page(&mut self, id: &str) -> StoreResult<bool> {
            self.inner.delete_page(id).await
        }

        async fn legacy_urls_for(&mut self, page_id: &str) -> StoreResult<Vec<LegacyUrl>> {
            self.inner.legacy_urls_for(page_id).await
        }

        async fn insert_legacy_url(&mut self, entry: LegacyUrl) -> StoreResult<bool> {
            self.inner.insert_legacy_url(entry).await
        }

        async fn delete_legacy_urls_for(&mut self, page_id: &str) -> StoreResult<usize> {
            self.inner.delete_legacy_urls_for(page_id).await
        }

        async fn commit(self: Box<Self>) -> StoreResult<()> {
            if self.fail {
                return Err(StoreError::backend("commit refused"));
            }
            self.inner.commit().await
        }
    }

    async fn setup(config: TreeConfig) -> (PageService, LockService, Arc<ManualTimeProvider>, Page) {
        let clock = Arc::new(ManualTimeProvider::new());
        let directory = MemoryActorDirectory::new(config.actor_identity_field.clone())
            .with_actor(Actor::new(1).with_attribute("name", "Jane Editor"));
        let service = PageService::new(Arc::new(MemoryStore::new()), config)
            .with_clock(clock.clone())
            .with_actor_resolver(Arc::new(directory));
        let page = service.create(NewPage::new("Home")).await.unwrap();
        let locks = service.lock_service();
        (service, locks, clock, page)
    }

    #[tokio::test]
    async fn test_lock_and_unlock_keep_updated_at() {
        let (_service, locks, clock, page) = setup(TreeConfig::default()).await;
        clock.advance(Duration::hours(1));

        let locked = locks.lock_to(&page.id, &Actor::new(1)).await.unwrap();
        assert!(locked.locked);
        assert_eq!(locked.locked_by.as_deref(), Some("1"));
        assert_eq!(locked.updated_at, page.updated_at);
        assert!(locks.is_locked(&page.id).await.unwrap());

        clock.advance(Duration::hours(1));
        let unlocked = locks.unlock(&page.id, None).await.unwrap();
        assert!(!unlocked.locked);
        assert_eq!(unlocked.locked_by, None);
        assert_eq!(unlocked.updated_at, page.updated_at);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let (_service, locks, _clock, page) = setup(TreeConfig::default()).await;
        locks.lock_to(&page.id, &Actor::new(1)).await.unwrap();

        // Same actor again is fine
        locks.lock_to(&page.id, &Actor::new(1)).await.unwrap();

        let err = locks.lock_to(&page.id, &Actor::new(2)).await.unwrap_err();
        assert!(matches!(err, PageServiceError::LockedByOther { ref locked_by, .. } if locked_by == "1"));
    }

    #[tokio::test]
    async fn test_unlock_clears_preview_of_this_page_only() {
        let (service, locks, _clock, page) = setup(TreeConfig::default()).await;
        let other = service.create(NewPage::new("Other")).await.unwrap();
        locks.lock_to(&page.id, &Actor::new(1)).await.unwrap();

        let mut preview = PreviewContext::previewing(other.id.clone());
        locks.unlock(&page.id, Some(&mut preview)).await.unwrap();
        assert!(preview.is_previewing(&other.id));

        let mut preview = PreviewContext::previewing(page.id.clone());
        locks.unlock(&page.id, Some(&mut preview)).await.unwrap();
        assert_eq!(preview.current(), None);
    }

    #[tokio::test]
    async fn test_failed_unlock_keeps_preview() {
        let fail = Arc::new(AtomicBool::new(false));
        let store = FlakyStore {
            inner: MemoryStore::new(),
            fail: fail.clone(),
        };
        let service = PageService::new(Arc::new(store), TreeConfig::default());
        let page = service.create(NewPage::new("Home")).await.unwrap();
        let locks = service.lock_service();
        locks.lock_to(&page.id, &Actor::new(1)).await.unwrap();

        fail.store(true, Ordering::SeqCst);
        let mut preview = PreviewContext::previewing(page.id.clone());
        let err = locks.unlock(&page.id, Some(&mut preview)).await.unwrap_err();
        assert!(matches!(err, PageServiceError::Store(StoreError::Backend(_))));
        assert!(preview.is_previewing(&page.id));
        assert!(locks.is_locked(&page.id).await.unwrap());

        fail.store(false, Ordering::SeqCst);
        locks.unlock(&page.id, Some(&mut preview)).await.unwrap();
        assert_eq!(preview.current(), None);
    }

    #[tokio::test]
    async fn test_lock_queries() {
        let (service, locks, _clock, page) = setup(TreeConfig::default()).await;
        let second = service.create(NewPage::new("Second")).await.unwrap();
        let third = service.create(NewPage::new("Third")).await.unwrap();
        locks.lock_to(&page.id, &Actor::new(1)).await.unwrap();
        locks.lock_to(&second.id, &Actor::new(2)).await.unwrap();

        assert_eq!(locks.all_locked().await.unwrap().len(), 2);
        let by_one = locks.all_locked_by(&Actor::new(1)).await.unwrap();
        assert_eq!(by_one.len(), 1);
        assert_eq!(by_one[0].id, page.id);
        let free: Vec<String> = locks.not_locked().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(free, vec![third.id]);

        assert!(locks.all_locked_by(&Actor::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identity_field_is_configurable() {
        let mut config = TreeConfig::default();
        config.actor_identity_field = "login".to_string();
        let (_service, locks, _clock, page) = setup(config).await;

        let actor = Actor::new(1).with_attribute("login", "jane");
        let locked = locks.lock_to(&page.id, &actor).await.unwrap();
        assert_eq!(locked.locked_by.as_deref(), Some("jane"));
        assert_eq!(locks.all_locked_by(&actor).await.unwrap().len(), 1);

        let err = locks.lock_to(&page.id, &Actor::new(2)).await.unwrap_err();
        assert!(matches!(err, PageServiceError::MissingActorIdentity { .. }));
    }

    #[tokio::test]
    async fn test_locker_name() {
        let (_service, locks, _clock, page) = setup(TreeConfig::default()).await;
        assert_eq!(locks.locker_name(&page.id).await.unwrap(), None);

        locks.lock_to(&page.id, &Actor::new(1)).await.unwrap();
        assert_eq!(locks.locker_name(&page.id).await.unwrap().as_deref(), Some("Jane Editor"));

        locks.unlock(&page.id, None).await.unwrap();
        locks.lock_to(&page.id, &Actor::new(99)).await.unwrap();
        assert_eq!(locks.locker_name(&page.id).await.unwrap().as_deref(), Some(UNKNOWN_ACTOR));
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let (_service, locks, _clock, _page) = setup(TreeConfig::default()).await;

        let err = locks.lock_to("ghost", &Actor::new(1)).await.unwrap_err();
        assert!(matches!(err, PageServiceError::NotFound { .. }));
        assert!(!err.is_user_recoverable());
    }
}
