//! Handles shared by the page services
//!
//! `PageService`, `LockService`, `StatusService` and `LegacyUrlService` all
//! work on the same store, clock and configuration and publish on the same
//! event channel. They hold one `Arc<ServiceContext>` between them.
//!
//! `actor_id` is the identity stamped into `creator_id` / `updater_id`. It
//! is set per handle by [`crate::services::PageService::acting_as`], never
//! globally.

use crate::config::TreeConfig;
use crate::db::{PageEvent, PageStore, StoreTransaction};
use crate::models::{Page, TimeProvider};
use crate::services::error::PageServiceError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast capacity for page events
pub const PAGE_EVENT_CHANNEL_CAPACITY: usize = 128;

#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub store: Arc<dyn PageStore>,
    pub config: Arc<TreeConfig>,
    pub clock: Arc<dyn TimeProvider>,
    pub event_tx: broadcast::Sender<PageEvent>,
    pub actor_id: Option<String>,
}

impl ServiceContext {
    pub fn new(
        store: Arc<dyn PageStore>,
        config: TreeConfig,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(PAGE_EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            config: Arc::new(config),
            clock,
            event_tx,
            actor_id: None,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Record the acting actor, if any, as the page's last updater
    pub fn stamp_updater(&self, page: &mut Page) {
        if let Some(actor_id) = &self.actor_id {
            page.updater_id = Some(actor_id.clone());
        }
    }

    /// Ignores send errors; having no subscriber is normal
    pub fn emit(&self, event: PageEvent) {
        let _ = self.event_tx.send(event);
    }

    pub async fn require_page(&self, id: &str) -> Result<Page, PageServiceError> {
        self.store
            .get_page(id)
            .await?
            .ok_or_else(|| PageServiceError::not_found(id))
    }
}

/// Load a page through a transaction or fail with `NotFound`
pub(crate) async fn load_page(
    tx: &mut dyn StoreTransaction,
    id: &str,
) -> Result<Page, PageServiceError> {
    tx.get_page(id)
        .await?
        .ok_or_else(|| PageServiceError::not_found(id))
}
