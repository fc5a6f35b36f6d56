//! Page Data Structures
//!
//! This module defines the `Page` record, the addressable element of the page
//! tree, plus the input and filter types used by the services.
//!
//! # Architecture
//!
//! - **Plain record**: `Page` carries no behavior beyond derived accessors;
//!   validation and cascades live in the services layer
//! - **Derived address**: `urlname` is the parent's urlname joined with the
//!   page's own slug, computed by [`crate::naming`]
//! - **Scoped uniqueness**: a urlname is unique inside its [`UrlScope`]
//!   (language + layout partition), enforced by the store
//!
//! # Examples
//!
//! ```rust
//! use pagetree_core::models::{NewPage, UrlScope};
//!
//! let new_page = NewPage::new("Contact")
//!     .with_parent_id("parent-uuid".to_string())
//!     .with_language_code("de".to_string());
//!
//! assert_eq!(new_page.name, "Contact");
//! assert_eq!(UrlScope::content("de"), UrlScope::new("de", false));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniqueness scope of a urlname.
///
/// Content pages and layout pages of the same language live in separate
/// partitions: the same urlname may exist once in each.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlScope {
    pub language_code: String,
    pub layoutpage: bool,
}

impl UrlScope {
    pub fn new(language_code: impl Into<String>, layoutpage: bool) -> Self {
        Self {
            language_code: language_code.into(),
            layoutpage,
        }
    }

    /// Scope of regular content pages in the given language
    pub fn content(language_code: impl Into<String>) -> Self {
        Self::new(language_code, false)
    }

    /// Scope of layout (global) pages in the given language
    pub fn layout(language_code: impl Into<String>) -> Self {
        Self::new(language_code, true)
    }
}

impl std::fmt::Display for UrlScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let partition = if self.layoutpage { "layout" } else { "content" };
        write!(f, "{}/{}", self.language_code, partition)
    }
}

/// A page in the tree.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID), immutable
/// - `name`: Human-editable label, never blank for persisted pages
/// - `urlname`: Full derived address (`parent/child`), `None` until the page
///   has a name
/// - `title`: Defaults to `name` at creation only
/// - `parent_id`: Weak reference to the parent page
/// - `restricted`: Access flag inherited by newly created children
/// - `locked` / `locked_by`: Collaborative editing lock
/// - `public` / `published_at`: Publish lifecycle
/// - `creator_id` / `updater_id`: Actors stamped by acting services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlname: Option<String>,

    #[serde(default)]
    pub title: String,

    pub parent_id: Option<String>,

    pub language_code: String,

    /// Layout pages form their own uniqueness partition
    #[serde(default)]
    pub layoutpage: bool,

    /// Layout classification handed to the default content provider
    #[serde(default)]
    pub page_layout: String,

    #[serde(default)]
    pub restricted: bool,

    #[serde(default)]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,

    #[serde(default)]
    pub public: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updater_id: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Last content modification. Lock changes never touch it.
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Build an unsaved page from creation parameters.
    ///
    /// The urlname is left empty; [`crate::services::PageService::create`]
    /// derives it from the parent's persisted urlname.
    pub fn from_new(new_page: NewPage, language_code: String, now: DateTime<Utc>) -> Self {
        Self {
            id: new_page.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_page.name,
            urlname: new_page.urlname,
            title: new_page.title.unwrap_or_default(),
            parent_id: new_page.parent_id,
            language_code,
            layoutpage: new_page.layoutpage,
            page_layout: new_page.page_layout,
            restricted: new_page.restricted.unwrap_or(false),
            locked: false,
            locked_by: None,
            public: false,
            published_at: None,
            tags: new_page.tags,
            creator_id: None,
            updater_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns always the last segment of the urlname
    pub fn slug(&self) -> Option<&str> {
        self.urlname.as_deref().map(crate::naming::slug_of)
    }

    pub fn scope(&self) -> UrlScope {
        UrlScope::new(self.language_code.clone(), self.layoutpage)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_locked_by(&self, actor_id: &str) -> bool {
        self.locked && self.locked_by.as_deref() == Some(actor_id)
    }

    pub fn status(&self) -> PageStatus {
        PageStatus {
            public: self.public,
            restricted: self.restricted,
            locked: self.locked,
        }
    }
}

/// Combined status flags of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStatus {
    pub public: bool,
    pub restricted: bool,
    pub locked: bool,
}

/// Parameters for creating a page
///
/// `urlname` is an optional explicit slug override; when absent the slug is
/// derived from `name`. `language_code` falls back to the parent's language,
/// then to the configured default. Below a restricted parent the page is
/// always restricted, whatever `restricted` says.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub urlname: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub layoutpage: bool,
    #[serde(default)]
    pub page_layout: String,
    #[serde(default)]
    pub restricted: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_layout: "standard".to_string(),
            ..Default::default()
        }
    }

    pub fn with_parent_id(mut self, parent_id: String) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_urlname(mut self, urlname: String) -> Self {
        self.urlname = Some(urlname);
        self
    }

    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_language_code(mut self, language_code: String) -> Self {
        self.language_code = Some(language_code);
        self
    }

    pub fn with_page_layout(mut self, page_layout: String) -> Self {
        self.page_layout = page_layout;
        self
    }

    pub fn as_layoutpage(mut self) -> Self {
        self.layoutpage = true;
        self
    }

    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.restricted = Some(restricted);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Attribute overrides applied by [`crate::services::PageService::copy`]
#[derive(Debug, Clone, Default)]
pub struct CopyOverrides {
    /// Replaces the default "<name> (<Copy>)" name
    pub name: Option<String>,
    /// Replaces the source's title
    pub title: Option<String>,
    /// Outer `None` keeps the source's parent, `Some(None)` copies to root
    pub parent_id: Option<Option<String>>,
    pub language_code: Option<String>,
}

impl CopyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_parent_id(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_language_code(mut self, language_code: String) -> Self {
        self.language_code = Some(language_code);
        self
    }
}

/// Query filter for pages
///
/// All set fields are combined with AND logic; `None` fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layoutpage: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

impl PageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent_id(mut self, parent_id: String) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_language_code(mut self, language_code: String) -> Self {
        self.language_code = Some(language_code);
        self
    }

    pub fn with_layoutpage(mut self, layoutpage: bool) -> Self {
        self.layoutpage = Some(layoutpage);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn with_locked_by(mut self, actor_id: String) -> Self {
        self.locked = Some(true);
        self.locked_by = Some(actor_id);
        self
    }

    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.restricted = Some(restricted);
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    pub fn matches(&self, page: &Page) -> bool {
        fn check<T: PartialEq>(expected: &Option<T>, actual: &T) -> bool {
            expected.as_ref().map_or(true, |value| value == actual)
        }

        check(&self.parent_id.clone().map(Some), &page.parent_id)
            && check(&self.language_code, &page.language_code)
            && check(&self.layoutpage, &page.layoutpage)
            && check(&self.locked, &page.locked)
            && check(&self.locked_by.clone().map(Some), &page.locked_by)
            && check(&self.restricted, &page.restricted)
            && check(&self.public, &page.public)
    }
}

/// Result of deleting a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    /// Ids of all deleted pages, leaves first
    pub deleted_ids: Vec<String>,
}

impl DeleteResult {
    pub fn deleted_count(&self) -> usize {
        self.deleted_ids.len()
    }
}
