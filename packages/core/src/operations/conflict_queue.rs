//! Conflict retry queue for urlname races
//!
//! Two writers deriving the same urlname in the same scope are decided by
//! the store at commit: the second one fails with
//! `PageServiceError::ConcurrentConflict`. That failure is transient. The
//! winning page may be renamed again a moment later, or the loser's
//! operation may produce a different urlname once it sees the new state.
//! This queue re-runs the whole operation, validation included, with
//! exponential backoff.
//!
//! A conflict that persists turns into a uniqueness validation error on
//! the next attempt, since validation then sees the committed winner.
//!
//! # Example
//!
//! ```rust
//! use pagetree_core::config::TreeConfig;
//! use pagetree_core::db::MemoryStore;
//! use pagetree_core::models::NewPage;
//! use pagetree_core::operations::ConflictRetryQueue;
//! use pagetree_core::services::PageService;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(PageService::new(Arc::new(MemoryStore::new()), TreeConfig::default()));
//! let page = service.create(NewPage::new("Draft")).await?;
//!
//! // Retry up to 3 times with exponential backoff (10ms, 20ms, 40ms)
//! let queue = ConflictRetryQueue::new(service);
//! let change = queue.rename_with_retry(&page.id, "Final", 3).await?;
//! assert_eq!(change.page.urlname.as_deref(), Some("final"));
//! # Ok(())
//! # }
//! ```

use crate::models::{NewPage, Page};
use crate::services::{PageService, PageServiceError, PathChange};
use std::future::Future;
use std::sync::Arc;
use tokio::time::Duration;

/// Retries page mutations that lost a urlname race
pub struct ConflictRetryQueue {
    service: Arc<PageService>,
}

impl ConflictRetryQueue {
    pub fn new(service: Arc<PageService>) -> Self {
        Self { service }
    }

    /// Retry budget from `TreeConfig::conflict_retries`
    pub fn default_retries(&self) -> usize {
        self.service.config().conflict_retries
    }

    pub async fn create_with_retry(
        &self,
        new_page: NewPage,
        max_retries: usize,
    ) -> Result<Page, PageServiceError> {
        self.run("create", &new_page.name, max_retries, || {
            self.service.create(new_page.clone())
        })
        .await
    }

    pub async fn rename_with_retry(
        &self,
        page_id: &str,
        new_name: &str,
        max_retries: usize,
    ) -> Result<PathChange, PageServiceError> {
        self.run("rename", page_id, max_retries, || {
            self.service.rename(page_id, new_name)
        })
        .await
    }

    pub async fn change_urlname_with_retry(
        &self,
        page_id: &str,
        slug: &str,
        max_retries: usize,
    ) -> Result<PathChange, PageServiceError> {
        self.run("change_urlname", page_id, max_retries, || {
            self.service.change_urlname(page_id, slug)
        })
        .await
    }

    pub async fn reparent_with_retry(
        &self,
        page_id: &str,
        new_parent_id: Option<&str>,
        max_retries: usize,
    ) -> Result<PathChange, PageServiceError> {
        self.run("reparent", page_id, max_retries, || {
            self.service.reparent(page_id, new_parent_id)
        })
        .await
    }

    /// Run `operation` until it succeeds, fails with anything other than
    /// a conflict, or `max_retries` retries are used up
    ///
    /// - **Retry on**: `ConcurrentConflict` only
    /// - **Backoff**: Exponential (10ms, 20ms, 40ms, 80ms, ...)
    async fn run<T, F, Fut>(
        &self,
        operation_name: &str,
        target: &str,
        max_retries: usize,
        mut operation: F,
    ) -> Result<T, PageServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PageServiceError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(
                            "{} of '{}' succeeded after {} retry(ies)",
                            operation_name,
                            target,
                            attempt
                        );
                    }
                    return Ok(value);
                }

                Err(PageServiceError::ConcurrentConflict { ref urlname }) if attempt < max_retries => {
                    tracing::debug!(
                        "Urlname conflict on '{}' during {} of '{}', attempt {}/{}. Retrying...",
                        urlname,
                        operation_name,
                        target,
                        attempt + 1,
                        max_retries + 1
                    );

                    let backoff_ms = 10u64 * (1 << attempt.min(16));
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;

                    attempt += 1;
                }

                Err(e @ PageServiceError::ConcurrentConflict { .. }) => {
                    tracing::warn!(
                        "{} of '{}' still conflicting after {} attempts: {}",
                        operation_name,
                        target,
                        attempt + 1,
                        e
                    );
                    return Err(e);
                }

                Err(e) => return Err(e),
            }
        }
    }
}
