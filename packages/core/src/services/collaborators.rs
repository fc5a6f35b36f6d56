//! External Collaborators
//!
//! The page tree delegates two concerns it does not own:
//!
//! - [`ContentService`]: the content elements living on a page. Called to
//!   autogenerate defaults on create, to copy elements on page copy and to
//!   detach elements when a page is destroyed.
//! - [`ActorResolver`]: display names of the actors that created, updated
//!   or locked a page.
//!
//! Both come with in-memory implementations used by tests and embedders
//! that keep content elsewhere.

use crate::models::Actor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Display name used when an actor cannot be resolved
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Element to create on a fresh page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub name: String,
}

impl ElementDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Elements a page with this layout starts with
    async fn default_elements(&self, page_layout: &str) -> anyhow::Result<Vec<ElementDescriptor>>;

    /// Returns the number of created elements
    async fn create_elements(
        &self,
        page_id: &str,
        elements: &[ElementDescriptor],
    ) -> anyhow::Result<usize>;

    /// Copy all non-trashed elements of `source_page_id` onto `target_page_id`
    async fn copy_elements(&self, source_page_id: &str, target_page_id: &str)
        -> anyhow::Result<usize>;

    /// Remove the page's non-trashed elements. Trashed elements stay.
    async fn detach_page(&self, page_id: &str) -> anyhow::Result<usize>;
}

/// Content service for deployments without page content
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

#[async_trait]
impl ContentService for NoContent {
    async fn default_elements(&self, _page_layout: &str) -> anyhow::Result<Vec<ElementDescriptor>> {
        Ok(Vec::new())
    }

    async fn create_elements(
        &self,
        _page_id: &str,
        _elements: &[ElementDescriptor],
    ) -> anyhow::Result<usize> {
        Ok(0)
    }

    async fn copy_elements(
        &self,
        _source_page_id: &str,
        _target_page_id: &str,
    ) -> anyhow::Result<usize> {
        Ok(0)
    }

    async fn detach_page(&self, _page_id: &str) -> anyhow::Result<usize> {
        Ok(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub page_id: String,
    pub name: String,
    #[serde(default)]
    pub trashed: bool,
}

#[derive(Debug, Default)]
struct ContentState {
    layouts: HashMap<String, Vec<String>>,
    elements: Vec<Element>,
}

/// In-memory content elements keyed by page
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    state: RwLock<ContentState>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the default element names for a page layout
    pub fn with_layout<I, S>(self, page_layout: &str, element_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut state) = self.state.write() {
            state.layouts.insert(
                page_layout.to_string(),
                element_names.into_iter().map(Into::into).collect(),
            );
        }
        self
    }

    pub fn add_element(&self, page_id: &str, name: &str) -> anyhow::Result<Element> {
        let element = Element {
            id: Uuid::new_v4().to_string(),
            page_id: page_id.to_string(),
            name: name.to_string(),
            trashed: false,
        };
        self.write()?.elements.push(element.clone());
        Ok(element)
    }

    /// Returns whether the element existed
    pub fn trash(&self, element_id: &str) -> anyhow::Result<bool> {
        let mut state = self.write()?;
        Ok(state
            .elements
            .iter_mut()
            .find(|element| element.id == element_id)
            .map(|element| element.trashed = true)
            .is_some())
    }

    /// All elements on a page, trashed ones included
    pub fn elements_for(&self, page_id: &str) -> anyhow::Result<Vec<Element>> {
        let state = self
            .state
            .read()
            .map_err(|_| anyhow::anyhow!("content store lock poisoned"))?;
        Ok(state
            .elements
            .iter()
            .filter(|element| element.page_id == page_id)
            .cloned()
            .collect())
    }

    fn write(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, ContentState>> {
        self.state
            .write()
            .map_err(|_| anyhow::anyhow!("content store lock poisoned"))
    }
}

#[async_trait]
impl ContentService for MemoryContentStore {
    async fn default_elements(&self, page_layout: &str) -> anyhow::Result<Vec<ElementDescriptor>> {
        let state = self
            .state
            .read()
            .map_err(|_| anyhow::anyhow!("content store lock poisoned"))?;
        Ok(state
            .layouts
            .get(page_layout)
            .map(|names| names.iter().map(ElementDescriptor::new).collect())
            .unwrap_or_default())
    }

    async fn create_elements(
        &self,
        page_id: &str,
        elements: &[ElementDescriptor],
    ) -> anyhow::Result<usize> {
        let mut state = self.write()?;
        state.elements.extend(elements.iter().map(|descriptor| Element {
            id: Uuid::new_v4().to_string(),
            page_id: page_id.to_string(),
            name: descriptor.name.clone(),
            trashed: false,
        }));
        Ok(elements.len())
    }

    async fn copy_elements(
        &self,
        source_page_id: &str,
        target_page_id: &str,
    ) -> anyhow::Result<usize> {
        let mut state = self.write()?;
        let copies: Vec<Element> = state
            .elements
            .iter()
            .filter(|element| element.page_id == source_page_id && !element.trashed)
            .map(|element| Element {
                id: Uuid::new_v4().to_string(),
                page_id: target_page_id.to_string(),
                name: element.name.clone(),
                trashed: false,
            })
            .collect();
        let count = copies.len();
        state.elements.extend(copies);
        Ok(count)
    }

    async fn detach_page(&self, page_id: &str) -> anyhow::Result<usize> {
        let mut state = self.write()?;
        let before = state.elements.len();
        state
            .elements
            .retain(|element| element.page_id != page_id || element.trashed);
        Ok(before - state.elements.len())
    }
}

/// Resolves actor identities to display names
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// `None` when no actor with this identity exists
    async fn display_name(&self, actor_id: &str) -> Option<String>;
}

/// Display name of `actor_id`, or [`UNKNOWN_ACTOR`]; `None` without an id
pub(crate) async fn display_name_or_unknown(
    actors: &dyn ActorResolver,
    actor_id: Option<&str>,
) -> Option<String> {
    let actor_id = actor_id?;
    let name = actors
        .display_name(actor_id)
        .await
        .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());
    Some(name)
}

/// Actor lookup over a fixed list
#[derive(Debug, Clone)]
pub struct MemoryActorDirectory {
    actors: Vec<Actor>,
    identity_field: String,
    name_field: String,
}

impl MemoryActorDirectory {
    pub fn new(identity_field: impl Into<String>) -> Self {
        Self {
            actors: Vec::new(),
            identity_field: identity_field.into(),
            name_field: "name".to_string(),
        }
    }

    pub fn with_name_field(mut self, name_field: impl Into<String>) -> Self {
        self.name_field = name_field.into();
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actors.push(actor);
        self
    }
}

#[async_trait]
impl ActorResolver for MemoryActorDirectory {
    async fn display_name(&self, actor_id: &str) -> Option<String> {
        self.actors
            .iter()
            .find(|actor| actor.identity(&self.identity_field).as_deref() == Some(actor_id))
            .and_then(|actor| actor.identity(&self.name_field))
    }
}
