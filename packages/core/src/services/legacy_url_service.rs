//! Legacy Url Service - Redirect Ledger
//!
//! Former urlnames are appended by path changes in
//! [`crate::services::PageService`]. Rows are never removed implicitly,
//! not even when their page is destroyed; `purge` removes them on request.

use crate::models::{LegacyUrl, Page};
use crate::services::context::ServiceContext;
use crate::services::error::PageServiceError;
use std::sync::Arc;

#[derive(Clone)]
pub struct LegacyUrlService {
    ctx: Arc<ServiceContext>,
}

impl LegacyUrlService {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Former urlnames of a page, oldest first
    pub async fn legacy_urls_for(&self, page_id: &str) -> Result<Vec<LegacyUrl>, PageServiceError> {
        Ok(self.ctx.store.legacy_urls_for(page_id).await?)
    }

    /// The page that most recently used `urlname`
    ///
    /// Entries whose page no longer exists are skipped. Callers should try
    /// live urlnames first; a legacy row never shadows a current page.
    pub async fn resolve(&self, urlname: &str) -> Result<Option<Page>, PageServiceError> {
        let entries = self.ctx.store.find_legacy_urls(urlname).await?;
        for entry in entries.iter().rev() {
            if let Some(page) = self.ctx.store.get_page(&entry.page_id).await? {
                return Ok(Some(page));
            }
        }
        tracing::debug!("No live page for legacy url '{}'", urlname);
        Ok(None)
    }

    /// Remove every legacy url of a page; the page itself may be gone
    pub async fn purge(&self, page_id: &str) -> Result<usize, PageServiceError> {
        let mut tx = self.ctx.store.begin(&[]).await?;
        let removed = tx.delete_legacy_urls_for(page_id).await?;
        tx.commit().await?;

        tracing::info!("Purged {} legacy urls of {}", removed, page_id);
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "legacy_url_service_test.rs"]
mod legacy_url_service_test;
