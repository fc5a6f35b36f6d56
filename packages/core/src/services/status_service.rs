//! Status Service - Publish State and Restriction
//!
//! - `published_at` is stamped the first time a page goes public and is
//!   never overwritten or cleared afterwards
//! - `restricted` set on a page is written to its whole subtree

use crate::db::PageEvent;
use crate::models::{Page, PageFilter};
use crate::services::context::{load_page, ServiceContext};
use crate::services::error::PageServiceError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Outcome of [`StatusService::set_restricted`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionChange {
    pub page: Page,
    pub rewritten_descendants: usize,
}

/// The address shown for a page: its last urlname segment
pub fn effective_address(page: &Page) -> Option<&str> {
    page.slug()
}

#[derive(Clone)]
pub struct StatusService {
    ctx: Arc<ServiceContext>,
}

impl StatusService {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Make a page public
    pub async fn publish(&self, page_id: &str) -> Result<Page, PageServiceError> {
        self.set_public(page_id, true).await
    }

    /// Set the public flag
    ///
    /// Going public stamps `published_at` only if it was never set. Going
    /// private leaves `published_at` as it is.
    pub async fn set_public(&self, page_id: &str, public: bool) -> Result<Page, PageServiceError> {
        let mut tx = self.ctx.store.begin(&[page_id]).await?;
        let mut page = load_page(tx.as_mut(), page_id).await?;

        let now = self.ctx.now();
        page.public = public;
        if public && page.published_at.is_none() {
            page.published_at = Some(now);
        }
        page.updated_at = now;
        self.ctx.stamp_updater(&mut page);
        tx.update_page(page.clone()).await?;
        tx.commit().await?;

        tracing::debug!("Page {} public={}", page.id, public);
        self.ctx.emit(PageEvent::Updated {
            page: Box::new(page.clone()),
        });
        Ok(page)
    }

    /// Set `restricted` on a page and on every page below it
    ///
    /// Descendants are overwritten whatever their current value, without
    /// touching their timestamps.
    pub async fn set_restricted(
        &self,
        page_id: &str,
        restricted: bool,
    ) -> Result<RestrictionChange, PageServiceError> {
        let mut tx = self.ctx.store.begin(&[page_id]).await?;
        let mut page = load_page(tx.as_mut(), page_id).await?;

        page.restricted = restricted;
        page.updated_at = self.ctx.now();
        self.ctx.stamp_updater(&mut page);
        tx.update_page(page.clone()).await?;

        let mut rewritten_descendants = 0;
        let mut queue = VecDeque::from([page.id.clone()]);
        while let Some(parent_id) = queue.pop_front() {
            for mut child in tx.get_children(&parent_id).await? {
                queue.push_back(child.id.clone());
                child.restricted = restricted;
                tx.update_page(child).await?;
                rewritten_descendants += 1;
            }
        }
        tx.commit().await?;

        tracing::info!(
            "Page {} restricted={}, propagated to {} descendants",
            page.id,
            restricted,
            rewritten_descendants
        );
        self.ctx.emit(PageEvent::Updated {
            page: Box::new(page.clone()),
        });
        Ok(RestrictionChange {
            page,
            rewritten_descendants,
        })
    }

    pub async fn published(&self) -> Result<Vec<Page>, PageServiceError> {
        self.query(PageFilter::new().with_public(true)).await
    }

    pub async fn restricted(&self) -> Result<Vec<Page>, PageServiceError> {
        self.query(PageFilter::new().with_restricted(true)).await
    }

    pub async fn not_restricted(&self) -> Result<Vec<Page>, PageServiceError> {
        self.query(PageFilter::new().with_restricted(false)).await
    }

    pub async fn layoutpages(&self) -> Result<Vec<Page>, PageServiceError> {
        self.query(PageFilter::new().with_layoutpage(true)).await
    }

    async fn query(&self, filter: PageFilter) -> Result<Vec<Page>, PageServiceError> {
        Ok(self.ctx.store.query_pages(&filter).await?)
    }
}

#[cfg(test)]
#[path = "status_service_test.rs"]
mod status_service_test;
