//! MemoryStore - in-process PageStore implementation
//!
//! Reference backend used by the test-suite and by embedders that keep the
//! tree in memory.
//!
//! # Design
//!
//! - Committed state sits behind a `std::sync::RwLock`; no lock is held
//!   across an `.await`
//! - Transactions buffer their writes and apply them in one step at commit,
//!   under the write lock, after re-checking scoped urlname uniqueness
//! - Transaction reads filter the committed map in place and overlay the
//!   buffered writes; only matching pages are cloned
//! - Subtree claims (see `subtree_lock`) serialise transactions touching
//!   overlapping parts of the tree

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::error::{StoreError, StoreResult};
use super::page_store::{PageStore, StoreTransaction};
use super::subtree_lock::{ClaimedRoot, SubtreeClaim, SubtreeLocks};
use crate::models::{LegacyUrl, Page, PageFilter, UrlScope};

#[derive(Debug, Default, Clone)]
struct StoreState {
    pages: HashMap<String, Page>,
    legacy_urls: Vec<LegacyUrl>,
}

impl StoreState {
    fn ancestor_chain(&self, id: &str) -> HashSet<String> {
        let mut chain = HashSet::new();
        let mut current = Some(id.to_string());
        while let Some(page_id) = current {
            // Guards against corrupt parent cycles
            if !chain.insert(page_id.clone()) {
                break;
            }
            current = self
                .pages
                .get(&page_id)
                .and_then(|page| page.parent_id.clone());
        }
        chain
    }

    fn sorted_children(&self, id: &str) -> Vec<Page> {
        let mut children: Vec<Page> = self
            .pages
            .values()
            .filter(|page| page.parent_id.as_deref() == Some(id))
            .cloned()
            .collect();
        sort_pages(&mut children);
        children
    }
}

/// Stable ordering for listings: creation time, then id
fn sort_pages(pages: &mut [Page]) {
    pages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

fn same_address(page: &Page, urlname: &str, scope: &UrlScope) -> bool {
    page.urlname.as_deref() == Some(urlname)
        && page.language_code == scope.language_code
        && page.layoutpage == scope.layoutpage
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: RwLock<StoreState>,
    locks: Arc<SubtreeLocks>,
}

/// In-memory page store
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> StoreResult<T> {
        let state = self.inner.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&state))
    }

    /// Number of committed pages
    pub fn page_count(&self) -> StoreResult<usize> {
        self.read(|state| state.pages.len())
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn get_page(&self, id: &str) -> StoreResult<Option<Page>> {
        self.read(|state| state.pages.get(id).cloned())
    }

    async fn find_by_urlname(
        &self,
        urlname: &str,
        scope: &UrlScope,
    ) -> StoreResult<Option<Page>> {
        self.read(|state| {
            state
                .pages
                .values()
                .find(|page| same_address(page, urlname, scope))
                .cloned()
        })
    }

    async fn get_children(&self, id: &str) -> StoreResult<Vec<Page>> {
        self.read(|state| state.sorted_children(id))
    }

    async fn get_ancestors(&self, id: &str) -> StoreResult<Vec<Page>> {
        self.read(|state| {
            let mut ancestors = Vec::new();
            let mut seen = HashSet::new();
            let mut current = state.pages.get(id).and_then(|p| p.parent_id.clone());
            while let Some(parent_id) = current {
                if !seen.insert(parent_id.clone()) {
                    break;
                }
                match state.pages.get(&parent_id) {
                    Some(parent) => {
                        current = parent.parent_id.clone();
                        ancestors.push(parent.clone());
                    }
                    None => break,
                }
            }
            ancestors.reverse();
            ancestors
        })
    }

    async fn get_descendants(&self, id: &str) -> StoreResult<Vec<Page>> {
        self.read(|state| {
            let mut descendants = Vec::new();
            let mut queue: VecDeque<String> = VecDeque::from([id.to_string()]);
            let mut seen: HashSet<String> = HashSet::from([id.to_string()]);
            while let Some(parent_id) = queue.pop_front() {
                for child in state.sorted_children(&parent_id) {
                    if seen.insert(child.id.clone()) {
                        queue.push_back(child.id.clone());
                        descendants.push(child);
                    }
                }
            }
            descendants
        })
    }

    async fn query_pages(&self, filter: &PageFilter) -> StoreResult<Vec<Page>> {
        self.read(|state| {
            let mut pages: Vec<Page> = state
                .pages
                .values()
                .filter(|page| filter.matches(page))
                .cloned()
                .collect();
            sort_pages(&mut pages);
            pages
        })
    }

    async fn legacy_urls_for(&self, page_id: &str) -> StoreResult<Vec<LegacyUrl>> {
        self.read(|state| {
            state
                .legacy_urls
                .iter()
                .filter(|entry| entry.page_id == page_id)
                .cloned()
                .collect()
        })
    }

    async fn find_legacy_urls(&self, urlname: &str) -> StoreResult<Vec<LegacyUrl>> {
        self.read(|state| {
            state
                .legacy_urls
                .iter()
                .filter(|entry| entry.urlname == urlname)
                .cloned()
                .collect()
        })
    }

    async fn begin(&self, roots: &[&str]) -> StoreResult<Box<dyn StoreTransaction>> {
        let inner = Arc::clone(&self.inner);
        let claim = self
            .inner
            .locks
            .acquire(roots, |wanted| {
                let state = inner.state.read().map_err(|_| StoreError::Poisoned)?;
                Ok(wanted
                    .iter()
                    .map(|root| ClaimedRoot {
                        root: root.to_string(),
                        chain: state.ancestor_chain(root),
                    })
                    .collect())
            })
            .await?;

        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            page_writes: HashMap::new(),
            legacy_inserts: Vec::new(),
            legacy_purges: HashSet::new(),
            _claim: claim,
        }))
    }
}

/// Buffered transaction over a [`MemoryStore`]
struct MemoryTransaction {
    inner: Arc<MemoryInner>,
    /// `None` marks a deletion
    page_writes: HashMap<String, Option<Page>>,
    legacy_inserts: Vec<LegacyUrl>,
    /// Page ids whose committed ledger rows are removed at commit
    legacy_purges: HashSet<String>,
    _claim: SubtreeClaim,
}

impl MemoryTransaction {
    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> StoreResult<T> {
        let state = self.inner.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&state))
    }

    /// Visible pages matching `pred`: committed pages overlaid with this
    /// transaction's writes
    fn visible_matching(&self, pred: impl Fn(&Page) -> bool) -> StoreResult<Vec<Page>> {
        self.read(|state| {
            state
                .pages
                .values()
                .filter(|page| !self.page_writes.contains_key(&page.id) && pred(*page))
                .chain(self.page_writes.values().flatten().filter(|page| pred(*page)))
                .cloned()
                .collect()
        })
    }

    fn any_visible(&self, pred: impl Fn(&Page) -> bool) -> StoreResult<bool> {
        self.read(|state| {
            state
                .pages
                .values()
                .any(|page| !self.page_writes.contains_key(&page.id) && pred(page))
                || self.page_writes.values().flatten().any(|page| pred(page))
        })
    }

    fn visible_page(&self, id: &str) -> StoreResult<Option<Page>> {
        match self.page_writes.get(id) {
            Some(write) => Ok(write.clone()),
            None => self.read(|state| state.pages.get(id).cloned()),
        }
    }

    fn legacy_matching(&self, pred: impl Fn(&LegacyUrl) -> bool) -> StoreResult<Vec<LegacyUrl>> {
        self.read(|state| {
            state
                .legacy_urls
                .iter()
                .filter(|entry| !self.legacy_purges.contains(&entry.page_id))
                .chain(self.legacy_inserts.iter())
                .filter(|entry| pred(*entry))
                .cloned()
                .collect()
        })
    }

    fn check_unique(&self, page: &Page) -> StoreResult<()> {
        let Some(urlname) = page.urlname.as_deref() else {
            return Ok(());
        };
        let scope = page.scope();
        let taken =
            self.any_visible(|other| other.id != page.id && same_address(other, urlname, &scope))?;
        if taken {
            return Err(StoreError::unique_violation(urlname, scope));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get_page(&mut self, id: &str) -> StoreResult<Option<Page>> {
        self.visible_page(id)
    }

    async fn get_children(&mut self, id: &str) -> StoreResult<Vec<Page>> {
        let mut children = self.visible_matching(|page| page.parent_id.as_deref() == Some(id))?;
        sort_pages(&mut children);
        Ok(children)
    }

    async fn find_by_urlname(
        &mut self,
        urlname: &str,
        scope: &UrlScope,
    ) -> StoreResult<Option<Page>> {
        Ok(self
            .visible_matching(|page| same_address(page, urlname, scope))?
            .into_iter()
            .next())
    }

    async fn insert_page(&mut self, page: Page) -> StoreResult<()> {
        if self.visible_page(&page.id)?.is_some() {
            return Err(StoreError::DuplicateId { id: page.id });
        }
        self.check_unique(&page)?;
        self.page_writes.insert(page.id.clone(), Some(page));
        Ok(())
    }

    async fn update_page(&mut self, page: Page) -> StoreResult<()> {
        if self.visible_page(&page.id)?.is_none() {
            return Err(StoreError::not_found(page.id));
        }
        self.check_unique(&page)?;
        self.page_writes.insert(page.id.clone(), Some(page));
        Ok(())
    }

    async fn delete_page(&mut self, id: &str) -> StoreResult<bool> {
        let existed = self.visible_page(id)?.is_some();
        if existed {
            self.page_writes.insert(id.to_string(), None);
        }
        Ok(existed)
    }

    async fn legacy_urls_for(&mut self, page_id: &str) -> StoreResult<Vec<LegacyUrl>> {
        self.legacy_matching(|entry| entry.page_id == page_id)
    }

    async fn insert_legacy_url(&mut self, entry: LegacyUrl) -> StoreResult<bool> {
        let exists = !self
            .legacy_matching(|existing| existing.same_entry(&entry.urlname, &entry.page_id))?
            .is_empty();
        if exists {
            return Ok(false);
        }
        self.legacy_inserts.push(entry);
        Ok(true)
    }

    async fn delete_legacy_urls_for(&mut self, page_id: &str) -> StoreResult<usize> {
        let removed = self.legacy_matching(|entry| entry.page_id == page_id)?.len();
        self.legacy_inserts.retain(|entry| entry.page_id != page_id);
        self.legacy_purges.insert(page_id.to_string());
        Ok(removed)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let inner = Arc::clone(&self.inner);
        let mut state = inner.state.write().map_err(|_| StoreError::Poisoned)?;

        // Re-check against whatever committed since our writes were checked,
        // in one pass over the state this commit would produce
        {
            let mut addresses: HashSet<(&str, &str, bool)> = HashSet::new();
            let visible = state
                .pages
                .values()
                .filter(|page| !self.page_writes.contains_key(&page.id))
                .chain(self.page_writes.values().flatten());
            for page in visible {
                let Some(urlname) = page.urlname.as_deref() else {
                    continue;
                };
                if !addresses.insert((urlname, page.language_code.as_str(), page.layoutpage)) {
                    return Err(StoreError::unique_violation(urlname, page.scope()));
                }
            }
        }

        let this = *self;
        for (id, write) in this.page_writes {
            match write {
                Some(page) => {
                    state.pages.insert(id, page);
                }
                None => {
                    state.pages.remove(&id);
                }
            }
        }
        if !this.legacy_purges.is_empty() {
            state
                .legacy_urls
                .retain(|entry| !this.legacy_purges.contains(&entry.page_id));
        }
        for entry in this.legacy_inserts {
            let duplicate = state
                .legacy_urls
                .iter()
                .any(|existing| existing.same_entry(&entry.urlname, &entry.page_id));
            if !duplicate {
                state.legacy_urls.push(entry);
            }
        }
        Ok(())
    }
}
