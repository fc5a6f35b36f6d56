//! Event Emission Tests
//!
//! Events are sent after the transaction commits, one per affected page,
//! and never for an operation that failed validation.

#[cfg(test)]
mod event_emission_tests {
    use anyhow::Result;
    use pagetree_core::db::{MemoryStore, PageEvent};
    use pagetree_core::models::{Actor, NewPage};
    use pagetree_core::services::PageService;
    use pagetree_core::TreeConfig;
    use std::sync::Arc;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::{timeout, Duration};

    fn create_service() -> PageService {
        PageService::new(Arc::new(MemoryStore::new()), TreeConfig::default())
    }

    async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<PageEvent>) -> PageEvent {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("Event should be emitted within 1 second")
            .expect("Should receive event")
    }

    #[tokio::test]
    async fn test_create_emits_page_created() -> Result<()> {
        let service = create_service();
        let mut rx = service.subscribe_to_events();

        let page = service.create(NewPage::new("Home")).await?;

        match next_event(&mut rx).await {
            PageEvent::Created { page: created } => {
                assert_eq!(created.id, page.id);
                assert_eq!(created.urlname.as_deref(), Some("home"));
            }
            other => panic!("Expected Created event, got {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_validation_emits_nothing() -> Result<()> {
        let service = create_service();
        service.create(NewPage::new("Taken")).await?;
        let mut rx = service.subscribe_to_events();

        let result = service.create(NewPage::new("Taken")).await;
        tokio_test::assert_err!(result);

        let result = service.create(NewPage::new("")).await;
        tokio_test::assert_err!(result);

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        Ok(())
    }

    #[tokio::test]
    async fn test_lock_events() -> Result<()> {
        let service = create_service();
        let page = service.create(NewPage::new("Home")).await?;
        let locks = service.lock_service();
        let mut rx = service.subscribe_to_events();

        locks.lock_to(&page.id, &Actor::new("editor-7")).await?;
        locks.unlock(&page.id, None).await?;

        assert_eq!(
            next_event(&mut rx).await,
            PageEvent::Locked {
                id: page.id.clone(),
                locked_by: "editor-7".to_string()
            }
        );
        assert_eq!(next_event(&mut rx).await, PageEvent::Unlocked { id: page.id.clone() });
        Ok(())
    }

    #[tokio::test]
    async fn test_destroy_subtree_emits_one_event_per_page() -> Result<()> {
        let service = create_service();
        let root = service.create(NewPage::new("Root")).await?;
        let child = service
            .create(NewPage::new("Child").with_parent_id(root.id.clone()))
            .await?;
        let mut rx = service.subscribe_to_events();

        service.destroy_subtree(&root.id).await?;

        let first = next_event(&mut rx).await;
        let second = next_event(&mut rx).await;
        assert_eq!(first, PageEvent::Deleted { id: child.id.clone() });
        assert_eq!(second.page_id(), root.id);
        assert_eq!(second.event_type(), "page:deleted");
        Ok(())
    }

    #[tokio::test]
    async fn test_copy_emits_created_for_each_copy() -> Result<()> {
        let service = create_service();
        let source = service.create(NewPage::new("Source")).await?;
        service
            .create(NewPage::new("Child").with_parent_id(source.id.clone()))
            .await?;
        let target = service.create(NewPage::new("Target")).await?;
        let mut rx = service.subscribe_to_events();

        let pasted = service.copy_and_paste(&source.id, &target.id, "Pasted").await?;

        let mut created = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PageEvent::Created { page } = event {
                created.push(page.urlname.unwrap_or_default());
            }
        }
        assert_eq!(created, vec!["target/pasted", "target/pasted/child"]);
        assert_eq!(pasted.urlname.as_deref(), Some("target/pasted"));
        Ok(())
    }
}
