//! Lock Service - Collaborative Editing Locks
//!
//! A page locked to an actor is being edited by that actor. The lock is not
//! a lease: it stays until `unlock` is called. It is unrelated to the store
//! transactions that serialise tree mutations; a locked page can still be
//! renamed or moved by the coordinator.
//!
//! Locking and unlocking are metadata changes. They never touch
//! `updated_at`, so they do not show up as content modifications or change
//! a page's cache key.

use crate::db::PageEvent;
use crate::models::{Actor, Page, PageFilter, PreviewContext};
use crate::services::collaborators::{display_name_or_unknown, ActorResolver};
use crate::services::context::{load_page, ServiceContext};
use crate::services::error::PageServiceError;
use std::sync::Arc;

#[derive(Clone)]
pub struct LockService {
    ctx: Arc<ServiceContext>,
    actors: Arc<dyn ActorResolver>,
}

impl LockService {
    pub(crate) fn new(ctx: Arc<ServiceContext>, actors: Arc<dyn ActorResolver>) -> Self {
        Self { ctx, actors }
    }

    /// Lock a page to `actor`
    ///
    /// The actor's identity is read from the configured identity attribute.
    /// Locking again by the same actor is a no-op.
    ///
    /// # Errors
    ///
    /// - `LockedByOther` when another actor holds the lock
    /// - `MissingActorIdentity` when the actor has no identity attribute
    /// - `NotFound` for an unknown page, which callers should treat as a bug
    pub async fn lock_to(&self, page_id: &str, actor: &Actor) -> Result<Page, PageServiceError> {
        let field = &self.ctx.config.actor_identity_field;
        let actor_id = actor
            .identity(field)
            .ok_or_else(|| PageServiceError::MissingActorIdentity {
                field: field.clone(),
            })?;

        let mut tx = self.ctx.store.begin(&[page_id]).await?;
        let mut page = load_page(tx.as_mut(), page_id).await?;

        if page.is_locked_by(&actor_id) {
            return Ok(page);
        }
        if let (true, Some(holder)) = (page.locked, page.locked_by.as_ref()) {
            return Err(PageServiceError::LockedByOther {
                id: page.id.clone(),
                locked_by: holder.clone(),
            });
        }

        page.locked = true;
        page.locked_by = Some(actor_id.clone());
        tx.update_page(page.clone()).await?;
        tx.commit().await?;

        tracing::debug!("Page {} locked by {}", page.id, actor_id);
        self.ctx.emit(PageEvent::Locked {
            id: page.id.clone(),
            locked_by: actor_id,
        });
        Ok(page)
    }

    /// Release the lock on a page
    ///
    /// When `preview` currently points at this page it is cleared once the
    /// unlock has committed. Unlocking an unlocked page changes nothing in
    /// the store.
    pub async fn unlock(
        &self,
        page_id: &str,
        preview: Option<&mut PreviewContext>,
    ) -> Result<Page, PageServiceError> {
        let mut tx = self.ctx.store.begin(&[page_id]).await?;
        let mut page = load_page(tx.as_mut(), page_id).await?;

        if page.locked || page.locked_by.is_some() {
            page.locked = false;
            page.locked_by = None;
            tx.update_page(page.clone()).await?;
            tx.commit().await?;

            tracing::debug!("Page {} unlocked", page.id);
            self.ctx.emit(PageEvent::Unlocked {
                id: page.id.clone(),
            });
        }

        if let Some(preview) = preview {
            preview.clear_if(&page.id);
        }
        Ok(page)
    }

    pub async fn is_locked(&self, page_id: &str) -> Result<bool, PageServiceError> {
        Ok(self.ctx.require_page(page_id).await?.locked)
    }

    pub async fn all_locked(&self) -> Result<Vec<Page>, PageServiceError> {
        let filter = PageFilter::new().with_locked(true);
        Ok(self.ctx.store.query_pages(&filter).await?)
    }

    /// Pages locked by `actor`; empty when the actor has no identity
    pub async fn all_locked_by(&self, actor: &Actor) -> Result<Vec<Page>, PageServiceError> {
        let Some(actor_id) = actor.identity(&self.ctx.config.actor_identity_field) else {
            return Ok(Vec::new());
        };
        let filter = PageFilter::new().with_locked_by(actor_id);
        Ok(self.ctx.store.query_pages(&filter).await?)
    }

    pub async fn not_locked(&self) -> Result<Vec<Page>, PageServiceError> {
        let filter = PageFilter::new().with_locked(false);
        Ok(self.ctx.store.query_pages(&filter).await?)
    }

    /// Display name of the lock holder
    ///
    /// `None` for an unlocked page. A holder the resolver does not know is
    /// reported as "unknown".
    pub async fn locker_name(&self, page_id: &str) -> Result<Option<String>, PageServiceError> {
        let page = self.ctx.require_page(page_id).await?;
        let holder = page.locked_by.as_deref().filter(|_| page.locked);
        Ok(display_name_or_unknown(self.actors.as_ref(), holder).await)
    }
}

#[cfg(test)]
#[path = "lock_service_test.rs"]
mod lock_service_test;
