//! Business Services
//!
//! This module contains the page tree services:
//!
//! - `PageService` - creation, path changes with descendant cascade, copies, deletion
//! - `LockService` - collaborative editing locks
//! - `StatusService` - publish state and restriction propagation
//! - `LegacyUrlService` - ledger of former urlnames
//!
//! The last three are obtained from a `PageService` and share its store,
//! clock, configuration and event channel.

pub mod cache_key;
pub mod collaborators;
mod context;
pub mod error;
pub mod legacy_url_service;
pub mod lock_service;
pub mod page_service;
pub mod status_service;
pub mod validation;

pub use cache_key::cache_key;
pub use collaborators::{
    ActorResolver, ContentService, Element, ElementDescriptor, MemoryActorDirectory,
    MemoryContentStore, NoContent, UNKNOWN_ACTOR,
};
pub use context::PAGE_EVENT_CHANNEL_CAPACITY;
pub use error::{PageServiceError, ValidationError, ValidationRule};
pub use legacy_url_service::LegacyUrlService;
pub use lock_service::LockService;
pub use page_service::{PageService, PathChange};
pub use status_service::{effective_address, RestrictionChange, StatusService};
pub use validation::PathOwner;
