//! PageStore Trait - Storage Abstraction Layer
//!
//! The services never talk to a concrete database. They use:
//!
//! - [`PageStore`] for committed reads and to open transactions
//! - [`StoreTransaction`] for every write
//!
//! # Contract
//!
//! 1. **Scoped uniqueness**: no two committed pages share a urlname inside
//!    the same [`UrlScope`]. Writes check it eagerly and again atomically at
//!    commit; a commit-time violation is a [`StoreError::UniqueViolation`].
//! 2. **All-or-nothing**: a transaction dropped without `commit` leaves no
//!    trace. A failed commit applies nothing.
//! 3. **Subtree serialisation**: `begin(roots)` waits until no running
//!    transaction claims a subtree overlapping any of `roots` (one root an
//!    ancestor-or-self of the other). Transactions on disjoint subtrees run
//!    concurrently. An empty `roots` claims nothing.
//! 4. **Read your writes**: reads through a transaction see its own
//!    buffered writes.
//!
//! A transaction must not open another transaction on an overlapping
//! subtree; that would wait on itself.

use super::error::StoreResult;
use crate::models::{LegacyUrl, Page, PageFilter, UrlScope};
use async_trait::async_trait;

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn get_page(&self, id: &str) -> StoreResult<Option<Page>>;

    async fn find_by_urlname(&self, urlname: &str, scope: &UrlScope)
        -> StoreResult<Option<Page>>;

    async fn get_children(&self, id: &str) -> StoreResult<Vec<Page>>;

    /// Ancestors ordered from the tree root down to the direct parent
    async fn get_ancestors(&self, id: &str) -> StoreResult<Vec<Page>>;

    /// Descendants in breadth-first order
    async fn get_descendants(&self, id: &str) -> StoreResult<Vec<Page>>;

    async fn query_pages(&self, filter: &PageFilter) -> StoreResult<Vec<Page>>;

    async fn legacy_urls_for(&self, page_id: &str) -> StoreResult<Vec<LegacyUrl>>;

    /// Every ledger row recording `urlname`, oldest first
    async fn find_legacy_urls(&self, urlname: &str) -> StoreResult<Vec<LegacyUrl>>;

    /// Open a transaction claiming the subtrees rooted at `roots`
    async fn begin(&self, roots: &[&str]) -> StoreResult<Box<dyn StoreTransaction>>;
}

#[async_trait]
pub trait StoreTransaction: Send {
    async fn get_page(&mut self, id: &str) -> StoreResult<Option<Page>>;

    async fn get_children(&mut self, id: &str) -> StoreResult<Vec<Page>>;

    async fn find_by_urlname(
        &mut self,
        urlname: &str,
        scope: &UrlScope,
    ) -> StoreResult<Option<Page>>;

    /// Insert a new page, checking id and urlname uniqueness
    async fn insert_page(&mut self, page: Page) -> StoreResult<()>;

    /// Replace an existing page, checking urlname uniqueness
    async fn update_page(&mut self, page: Page) -> StoreResult<()>;

    /// Returns whether the page existed
    async fn delete_page(&mut self, id: &str) -> StoreResult<bool>;

    async fn legacy_urls_for(&mut self, page_id: &str) -> StoreResult<Vec<LegacyUrl>>;

    /// Append a ledger row; returns `false` without writing when the same
    /// `(urlname, page_id)` pair is already recorded
    async fn insert_legacy_url(&mut self, entry: LegacyUrl) -> StoreResult<bool>;

    /// Returns the number of removed rows
    async fn delete_legacy_urls_for(&mut self, page_id: &str) -> StoreResult<usize>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
