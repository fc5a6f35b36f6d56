//! Page Service - Tree Mutations
//!
//! This module owns every structural change to the page tree:
//!
//! - Creation with derived urlnames (`create`)
//! - Path changes with descendant cascade (`rename`, `change_urlname`, `reparent`)
//! - Copies (`copy`, `copy_and_paste`)
//! - Deletion (`destroy`, `destroy_subtree`)
//!
//! # Path changes
//!
//! A page's urlname is its parent's persisted urlname joined with its own
//! slug. When it changes, the operation:
//!
//! 1. records the former urlname in the legacy url ledger (once per pair)
//! 2. recomputes every descendant's urlname from its own slug and its
//!    parent's new urlname, level by level
//!
//! Both steps run in the transaction that wrote the page itself, so a
//! failure anywhere leaves the whole subtree as it was. Descendant writes
//! skip name validation but not the store's uniqueness check; a collision
//! aborts the operation with `ConcurrentConflict`.
//!
//! # Concurrency
//!
//! Every mutation opens a store transaction claiming the affected subtree
//! roots. Overlapping subtrees are serialised by the store, disjoint ones
//! run side by side. Two creates racing for the same urlname are decided
//! at commit: the loser gets `ConcurrentConflict` and should retry (see
//! [`crate::operations::ConflictRetryQueue`]).

use crate::config::TreeConfig;
use crate::db::{PageEvent, PageStore, StoreTransaction, UrlnameChange};
use crate::models::{
    Actor, CopyOverrides, DeleteResult, LegacyUrl, NewPage, Page, PageFilter, PreviewContext,
    SystemTimeProvider, TimeProvider, UrlScope,
};
use crate::naming::nested_urlname;
use crate::services::cache_key::cache_key;
use crate::services::collaborators::{
    display_name_or_unknown, ActorResolver, ContentService, MemoryActorDirectory, NoContent,
};
use crate::services::context::{load_page, ServiceContext};
use crate::services::error::{PageServiceError, ValidationRule};
use crate::services::legacy_url_service::LegacyUrlService;
use crate::services::lock_service::LockService;
use crate::services::status_service::StatusService;
use crate::services::validation::validate_page;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Outcome of a rename, urlname change or reparent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathChange {
    /// The page as committed
    pub page: Page,
    pub previous_urlname: Option<String>,
    /// Whether a new legacy url row was written for the page itself
    pub legacy_url_recorded: bool,
    /// Descendants whose urlname was rewritten by the cascade
    pub rewritten_descendants: usize,
}

impl PathChange {
    pub fn path_changed(&self) -> bool {
        self.previous_urlname != self.page.urlname
    }
}

/// Coordinates structural mutations of the page tree
///
/// Cheap to clone; clones share the store, configuration and event channel.
///
/// # Examples
///
/// ```rust
/// use pagetree_core::config::TreeConfig;
/// use pagetree_core::db::MemoryStore;
/// use pagetree_core::models::NewPage;
/// use pagetree_core::services::PageService;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = PageService::new(Arc::new(MemoryStore::new()), TreeConfig::default());
///
/// let parent = service.create(NewPage::new("Parent")).await?;
/// let child = service
///     .create(NewPage::new("Page").with_parent_id(parent.id.clone()))
///     .await?;
/// assert_eq!(child.urlname.as_deref(), Some("parent/page"));
///
/// let change = service.rename(&parent.id, "Products").await?;
/// assert_eq!(change.rewritten_descendants, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PageService {
    ctx: Arc<ServiceContext>,
    content: Arc<dyn ContentService>,
    actors: Arc<dyn ActorResolver>,
}

impl PageService {
    /// Service on the system clock, without content or actor collaborators
    pub fn new(store: Arc<dyn PageStore>, config: TreeConfig) -> Self {
        let identity_field = config.actor_identity_field.clone();
        Self {
            ctx: Arc::new(ServiceContext::new(
                store,
                config,
                Arc::new(SystemTimeProvider),
            )),
            content: Arc::new(NoContent),
            actors: Arc::new(MemoryActorDirectory::new(identity_field)),
        }
    }

    /// Replace the clock; call before subscribing to events
    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        Arc::make_mut(&mut self.ctx).clock = clock;
        self
    }

    pub fn with_content_service(mut self, content: Arc<dyn ContentService>) -> Self {
        self.content = content;
        self
    }

    pub fn with_actor_resolver(mut self, actors: Arc<dyn ActorResolver>) -> Self {
        self.actors = actors;
        self
    }

    /// Handle that stamps `actor` as creator and updater of what it writes
    ///
    /// The identity is read from the configured identity attribute. Lock and
    /// status services taken from the handle act as the same actor.
    pub fn acting_as(&self, actor: &Actor) -> Result<Self, PageServiceError> {
        let field = &self.ctx.config.actor_identity_field;
        let actor_id = actor
            .identity(field)
            .ok_or_else(|| PageServiceError::MissingActorIdentity {
                field: field.clone(),
            })?;

        let mut ctx = ServiceContext::clone(&self.ctx);
        ctx.actor_id = Some(actor_id);
        Ok(Self {
            ctx: Arc::new(ctx),
            content: Arc::clone(&self.content),
            actors: Arc::clone(&self.actors),
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.ctx.config
    }

    /// Direct store access for reads the service does not wrap
    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.ctx.store
    }

    /// Editing locks on the same tree
    pub fn lock_service(&self) -> LockService {
        LockService::new(Arc::clone(&self.ctx), Arc::clone(&self.actors))
    }

    /// Publish state and restriction on the same tree
    pub fn status_service(&self) -> StatusService {
        StatusService::new(Arc::clone(&self.ctx))
    }

    /// Legacy url ledger of the same tree
    pub fn legacy_urls(&self) -> LegacyUrlService {
        LegacyUrlService::new(Arc::clone(&self.ctx))
    }

    /// Subscribe to page events
    ///
    /// Events are sent after the transaction committed. A receiver that
    /// falls more than the channel capacity behind gets `Lagged`.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<PageEvent> {
        self.ctx.event_tx.subscribe()
    }

    /// Cache key under the configured namespace
    pub fn cache_key(&self, page: &Page, preview: &PreviewContext) -> String {
        cache_key(page, preview, &self.ctx.config.cache_namespace)
    }

    pub async fn get_page(&self, id: &str) -> Result<Option<Page>, PageServiceError> {
        Ok(self.ctx.store.get_page(id).await?)
    }

    pub async fn get_children(&self, id: &str) -> Result<Vec<Page>, PageServiceError> {
        Ok(self.ctx.store.get_children(id).await?)
    }

    /// Ancestors from the tree root down to the direct parent
    pub async fn get_ancestors(&self, id: &str) -> Result<Vec<Page>, PageServiceError> {
        Ok(self.ctx.store.get_ancestors(id).await?)
    }

    pub async fn get_descendants(&self, id: &str) -> Result<Vec<Page>, PageServiceError> {
        Ok(self.ctx.store.get_descendants(id).await?)
    }

    pub async fn find_by_urlname(
        &self,
        urlname: &str,
        scope: &UrlScope,
    ) -> Result<Option<Page>, PageServiceError> {
        Ok(self.ctx.store.find_by_urlname(urlname, scope).await?)
    }

    pub async fn query_pages(&self, filter: &PageFilter) -> Result<Vec<Page>, PageServiceError> {
        Ok(self.ctx.store.query_pages(filter).await?)
    }

    /// Display name of the page's creator
    ///
    /// `None` when no creator was stamped, "unknown" when the resolver does
    /// not know the actor.
    pub async fn creator_name(&self, id: &str) -> Result<Option<String>, PageServiceError> {
        let page = self.ctx.require_page(id).await?;
        Ok(display_name_or_unknown(self.actors.as_ref(), page.creator_id.as_deref()).await)
    }

    /// Display name of the actor that last updated the page
    pub async fn updater_name(&self, id: &str) -> Result<Option<String>, PageServiceError> {
        let page = self.ctx.require_page(id).await?;
        Ok(display_name_or_unknown(self.actors.as_ref(), page.updater_id.as_deref()).await)
    }

    /// Create a page
    ///
    /// The urlname is derived from the explicit `urlname` slug if given,
    /// otherwise from `name`, below the parent's persisted urlname. Language
    /// falls back to the parent's, then to the configured default. A page
    /// below a restricted parent is restricted. A blank title is replaced by
    /// the name. Default content for the page layout is created
    /// through the content service once the page is committed.
    ///
    /// # Errors
    ///
    /// - `Validation` when a rule fails (nothing is written)
    /// - `ParentNotFound` when `parent_id` does not exist
    /// - `ConcurrentConflict` when another writer committed the urlname first
    pub async fn create(&self, new_page: NewPage) -> Result<Page, PageServiceError> {
        let parent_id = new_page.parent_id.clone();
        let default_language = self.ctx.config.default_language.clone();
        let now = self.ctx.now();

        let page = self
            .insert_new(parent_id.as_deref(), move |parent| {
                let mut new_page = new_page;
                let language_code = new_page
                    .language_code
                    .take()
                    .or_else(|| parent.map(|p| p.language_code.clone()))
                    .unwrap_or(default_language);

                let mut page = Page::from_new(new_page, language_code, now);
                if page.title.trim().is_empty() {
                    page.title = page.name.clone();
                }
                page
            })
            .await?;
        self.autogenerate_content(&page).await;

        tracing::info!("Created page {} at '{}'", page.id, page.urlname.as_deref().unwrap_or(""));
        self.ctx.emit(PageEvent::Created {
            page: Box::new(page.clone()),
        });
        Ok(page)
    }

    /// Rename a page and derive its slug from the new name
    ///
    /// Any explicit slug the page had is replaced. The title is left alone.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<PathChange, PageServiceError> {
        if new_name.trim().is_empty() {
            return Err(PageServiceError::validation("name", ValidationRule::Presence));
        }

        let mut tx = self.ctx.store.begin(&[id]).await?;
        let previous = load_page(tx.as_mut(), id).await?;
        let parent_urlname = parent_urlname(tx.as_mut(), previous.parent_id.as_deref()).await?;

        let mut page = previous.clone();
        page.name = new_name.to_string();
        let candidate = nested_urlname(
            parent_urlname.as_deref(),
            None,
            new_name,
            self.ctx.config.min_urlname_length,
        );

        self.apply_path_change(tx, previous, page, candidate).await
    }

    /// Set an explicit slug for a page
    ///
    /// A value that looks like a path keeps only its last segment. A blank
    /// value falls back to deriving the slug from the name.
    pub async fn change_urlname(
        &self,
        id: &str,
        slug: &str,
    ) -> Result<PathChange, PageServiceError> {
        let mut tx = self.ctx.store.begin(&[id]).await?;
        let previous = load_page(tx.as_mut(), id).await?;
        let parent_urlname = parent_urlname(tx.as_mut(), previous.parent_id.as_deref()).await?;

        let candidate = nested_urlname(
            parent_urlname.as_deref(),
            Some(slug),
            &previous.name,
            self.ctx.config.min_urlname_length,
        );
        let page = previous.clone();

        self.apply_path_change(tx, previous, page, candidate).await
    }

    /// Move a page below `new_parent_id`, or to the top level with `None`
    ///
    /// The page keeps its slug; its urlname and those of its descendants
    /// follow the new parent.
    ///
    /// # Errors
    ///
    /// - `CircularReference` when the new parent is the page or one of its
    ///   descendants
    /// - `ParentNotFound` when the new parent does not exist
    pub async fn reparent(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<PathChange, PageServiceError> {
        let mut roots = vec![id];
        roots.extend(new_parent_id);
        let mut tx = self.ctx.store.begin(&roots).await?;

        let previous = load_page(tx.as_mut(), id).await?;
        if let Some(parent_id) = new_parent_id {
            ensure_not_descendant(tx.as_mut(), id, parent_id).await?;
        }
        let parent_urlname = parent_urlname(tx.as_mut(), new_parent_id).await?;

        let mut page = previous.clone();
        page.parent_id = new_parent_id.map(str::to_string);
        let candidate = nested_urlname(
            parent_urlname.as_deref(),
            previous.urlname.as_deref(),
            &previous.name,
            self.ctx.config.min_urlname_length,
        );

        self.apply_path_change(tx, previous, page, candidate).await
    }

    /// Copy a single page
    ///
    /// The copy is named "<name> (<Copy>)" in the source's language unless
    /// overridden. It keeps title, layout, tags and `restricted` (and is
    /// restricted anyway below a restricted parent), starts unpublished and
    /// unlocked, and gets the source's non-trashed content elements instead
    /// of the layout's defaults.
    pub async fn copy(
        &self,
        source_id: &str,
        overrides: CopyOverrides,
    ) -> Result<Page, PageServiceError> {
        let source = self.ctx.require_page(source_id).await?;
        self.copy_page(&source, overrides).await
    }

    /// Copy a page below `new_parent_id` under `name`, with its subtree
    ///
    /// The pasted page takes `name` as its title too. Child copies keep their
    /// names and take the new parent's language.
    /// When the target lies inside the source's subtree, the target and
    /// everything below it are not copied again.
    pub async fn copy_and_paste(
        &self,
        source_id: &str,
        new_parent_id: &str,
        name: &str,
    ) -> Result<Page, PageServiceError> {
        let source = self.ctx.require_page(source_id).await?;
        let new_parent = self
            .ctx
            .store
            .get_page(new_parent_id)
            .await?
            .ok_or_else(|| PageServiceError::parent_not_found(new_parent_id))?;
        // Taken before copying so the new pages are never copied themselves
        let subtree = self.ctx.store.get_descendants(&source.id).await?;

        let root_copy = self
            .copy_page(
                &source,
                CopyOverrides::new()
                    .with_name(name)
                    .with_title(name)
                    .with_parent_id(Some(new_parent.id.clone()))
                    .with_language_code(new_parent.language_code.clone()),
            )
            .await?;

        let mut copies: HashMap<String, (String, String)> = HashMap::new();
        copies.insert(
            source.id.clone(),
            (root_copy.id.clone(), root_copy.language_code.clone()),
        );

        for child in subtree {
            if child.id == new_parent.id {
                continue;
            }
            let Some((copy_parent_id, language_code)) = child
                .parent_id
                .as_ref()
                .and_then(|parent_id| copies.get(parent_id))
                .cloned()
            else {
                continue;
            };

            let child_copy = self
                .copy_page(
                    &child,
                    CopyOverrides::new()
                        .with_name(child.name.clone())
                        .with_parent_id(Some(copy_parent_id))
                        .with_language_code(language_code),
                )
                .await?;
            copies.insert(child.id.clone(), (child_copy.id, child_copy.language_code));
        }

        tracing::info!(
            "Pasted copy of {} below {} ({} pages)",
            source.id,
            new_parent.id,
            copies.len()
        );
        Ok(root_copy)
    }

    /// Delete a leaf page
    ///
    /// Legacy urls of the page are kept. Its content is detached through
    /// the content service, which leaves trashed elements in place.
    ///
    /// # Errors
    ///
    /// `HasChildren` when the page still has children; use
    /// [`Self::destroy_subtree`] to delete them too.
    pub async fn destroy(&self, id: &str) -> Result<DeleteResult, PageServiceError> {
        let mut tx = self.ctx.store.begin(&[id]).await?;
        load_page(tx.as_mut(), id).await?;
        if !tx.get_children(id).await?.is_empty() {
            return Err(PageServiceError::HasChildren { id: id.to_string() });
        }
        tx.delete_page(id).await?;
        tx.commit().await?;

        let result = DeleteResult {
            deleted_ids: vec![id.to_string()],
        };
        self.after_delete(&result).await;
        Ok(result)
    }

    /// Delete a page and all its descendants, leaves first
    pub async fn destroy_subtree(&self, id: &str) -> Result<DeleteResult, PageServiceError> {
        let mut tx = self.ctx.store.begin(&[id]).await?;
        load_page(tx.as_mut(), id).await?;

        let mut order = vec![id.to_string()];
        let mut next = 0;
        while next < order.len() {
            let current = order[next].clone();
            let children = tx.get_children(&current).await?;
            order.extend(children.into_iter().map(|child| child.id));
            next += 1;
        }
        order.reverse();

        for page_id in &order {
            tx.delete_page(page_id).await?;
        }
        tx.commit().await?;

        let result = DeleteResult { deleted_ids: order };
        self.after_delete(&result).await;
        Ok(result)
    }

    /// Build an unsaved page from its parent, derive its urlname and insert it
    ///
    /// The parent is read under its subtree claim, so `build` and the
    /// restriction rule see the parent as of this transaction. A page below
    /// a restricted parent is always restricted.
    async fn insert_new<F>(
        &self,
        parent_id: Option<&str>,
        build: F,
    ) -> Result<Page, PageServiceError>
    where
        F: FnOnce(Option<&Page>) -> Page + Send,
    {
        let roots: Vec<&str> = parent_id.into_iter().collect();
        let mut tx = self.ctx.store.begin(&roots).await?;
        let parent = match parent_id {
            Some(parent_id) => Some(
                tx.get_page(parent_id)
                    .await?
                    .ok_or_else(|| PageServiceError::parent_not_found(parent_id))?,
            ),
            None => None,
        };

        let mut page = build(parent.as_ref());
        if parent.as_ref().is_some_and(|p| p.restricted) {
            page.restricted = true;
        }
        if let Some(actor_id) = &self.ctx.actor_id {
            page.creator_id = Some(actor_id.clone());
            page.updater_id = Some(actor_id.clone());
        }

        // A blank name gets no urlname; validation reports it
        if !page.name.trim().is_empty() {
            page.urlname = Some(nested_urlname(
                parent.as_ref().and_then(|p| p.urlname.as_deref()),
                page.urlname.as_deref(),
                &page.name,
                self.ctx.config.min_urlname_length,
            ));
        }

        validate_page(tx.as_mut(), &page, &self.ctx.config).await?;
        tx.insert_page(page.clone()).await?;
        tx.commit().await?;
        Ok(page)
    }

    async fn copy_page(
        &self,
        source: &Page,
        overrides: CopyOverrides,
    ) -> Result<Page, PageServiceError> {
        let now = self.ctx.now();
        let name = overrides.name.unwrap_or_else(|| {
            format!(
                "{} ({})",
                source.name,
                self.ctx.config.copy_label(&source.language_code)
            )
        });

        let parent_id = overrides
            .parent_id
            .unwrap_or_else(|| source.parent_id.clone());

        let copy = Page {
            id: Uuid::new_v4().to_string(),
            name,
            urlname: None,
            title: overrides.title.unwrap_or_else(|| source.title.clone()),
            parent_id: parent_id.clone(),
            language_code: overrides
                .language_code
                .unwrap_or_else(|| source.language_code.clone()),
            layoutpage: source.layoutpage,
            page_layout: source.page_layout.clone(),
            restricted: source.restricted,
            locked: false,
            locked_by: None,
            public: false,
            published_at: None,
            tags: source.tags.clone(),
            creator_id: None,
            updater_id: None,
            created_at: now,
            updated_at: now,
        };

        let copy = self.insert_new(parent_id.as_deref(), move |_| copy).await?;
        match self.content.copy_elements(&source.id, &copy.id).await {
            Ok(count) => tracing::debug!("Copied {} elements from {} to {}", count, source.id, copy.id),
            Err(e) => tracing::warn!("Failed to copy elements from {} to {}: {}", source.id, copy.id, e),
        }

        self.ctx.emit(PageEvent::Created {
            page: Box::new(copy.clone()),
        });
        Ok(copy)
    }

    /// Write `page` at `candidate` and cascade if the urlname changed
    async fn apply_path_change(
        &self,
        mut tx: Box<dyn StoreTransaction>,
        previous: Page,
        mut page: Page,
        candidate: String,
    ) -> Result<PathChange, PageServiceError> {
        page.urlname = Some(candidate);
        validate_page(tx.as_mut(), &page, &self.ctx.config).await?;

        let now = self.ctx.now();
        page.updated_at = now;
        self.ctx.stamp_updater(&mut page);
        tx.update_page(page.clone()).await?;

        let mut changes = Vec::new();
        let mut legacy_url_recorded = false;
        if previous.urlname != page.urlname {
            if let Some(old) = previous.urlname.clone() {
                legacy_url_recorded = tx
                    .insert_legacy_url(LegacyUrl::new(old, &page.id, now))
                    .await?;
            }
            changes.push(UrlnameChange {
                page_id: page.id.clone(),
                old_urlname: previous.urlname.clone(),
                new_urlname: page.urlname.clone().unwrap_or_default(),
            });
            changes.extend(self.cascade(tx.as_mut(), &page, now).await?);
        }

        tx.commit().await?;

        let rewritten_descendants = changes.len().saturating_sub(1);
        if !changes.is_empty() {
            tracing::info!(
                "Moved page {} from '{}' to '{}', rewrote {} descendants",
                page.id,
                previous.urlname.as_deref().unwrap_or(""),
                page.urlname.as_deref().unwrap_or(""),
                rewritten_descendants
            );
        }

        self.ctx.emit(PageEvent::Updated {
            page: Box::new(page.clone()),
        });
        for change in changes {
            self.ctx.emit(PageEvent::UrlnameChanged(change));
        }

        Ok(PathChange {
            page,
            previous_urlname: previous.urlname,
            legacy_url_recorded,
            rewritten_descendants,
        })
    }

    /// Recompute descendant urlnames below `root`, breadth first.
    ///
    /// Each child's urlname depends only on its parent's, so a child whose
    /// urlname is already right has a correct subtree and is not descended.
    async fn cascade(
        &self,
        tx: &mut dyn StoreTransaction,
        root: &Page,
        now: DateTime<Utc>,
    ) -> Result<Vec<UrlnameChange>, PageServiceError> {
        let mut changes = Vec::new();
        let mut queue = VecDeque::from([(root.id.clone(), root.urlname.clone())]);

        while let Some((parent_id, parent_urlname)) = queue.pop_front() {
            for mut child in tx.get_children(&parent_id).await? {
                let urlname = nested_urlname(
                    parent_urlname.as_deref(),
                    child.urlname.as_deref(),
                    &child.name,
                    self.ctx.config.min_urlname_length,
                );
                if child.urlname.as_deref() == Some(urlname.as_str()) {
                    continue;
                }

                let old_urlname = child.urlname.replace(urlname.clone());
                if self.ctx.config.record_descendant_legacy_urls {
                    if let Some(old) = &old_urlname {
                        tx.insert_legacy_url(LegacyUrl::new(old.as_str(), &child.id, now))
                            .await?;
                    }
                }
                tx.update_page(child.clone()).await?;

                queue.push_back((child.id.clone(), child.urlname.clone()));
                changes.push(UrlnameChange {
                    page_id: child.id,
                    old_urlname,
                    new_urlname: urlname,
                });
            }
        }

        tracing::debug!("Cascade below {} rewrote {} pages", root.id, changes.len());
        Ok(changes)
    }

    async fn autogenerate_content(&self, page: &Page) {
        let result: anyhow::Result<usize> = async {
            let defaults = self.content.default_elements(&page.page_layout).await?;
            self.content.create_elements(&page.id, &defaults).await
        }
        .await;

        match result {
            Ok(count) => tracing::debug!("Autogenerated {} elements on {}", count, page.id),
            Err(e) => tracing::warn!("Failed to autogenerate content for {}: {}", page.id, e),
        }
    }

    async fn after_delete(&self, result: &DeleteResult) {
        for page_id in &result.deleted_ids {
            if let Err(e) = self.content.detach_page(page_id).await {
                tracing::warn!("Failed to detach content of {}: {}", page_id, e);
            }
            self.ctx.emit(PageEvent::Deleted {
                id: page_id.clone(),
            });
        }
        tracing::info!("Deleted {} pages", result.deleted_count());
    }
}

/// The persisted urlname of `parent_id`, `None` at the top level
async fn parent_urlname(
    tx: &mut dyn StoreTransaction,
    parent_id: Option<&str>,
) -> Result<Option<String>, PageServiceError> {
    match parent_id {
        None => Ok(None),
        Some(parent_id) => tx
            .get_page(parent_id)
            .await?
            .map(|parent| parent.urlname)
            .ok_or_else(|| PageServiceError::parent_not_found(parent_id)),
    }
}

/// Fails when `parent_id` is `id` itself or below it
async fn ensure_not_descendant(
    tx: &mut dyn StoreTransaction,
    id: &str,
    parent_id: &str,
) -> Result<(), PageServiceError> {
    let mut cursor = Some(parent_id.to_string());
    while let Some(current) = cursor {
        if current == id {
            return Err(PageServiceError::circular_reference(id, parent_id));
        }
        cursor = match tx.get_page(&current).await? {
            Some(page) => page.parent_id,
            None if current == parent_id => {
                return Err(PageServiceError::parent_not_found(parent_id))
            }
            None => None,
        };
    }
    Ok(())
}

#[cfg(test)]
#[path = "page_service_test.rs"]
mod page_service_test;
