//! PageTree Core Business Logic Layer
//!
//! This crate maintains a tree of addressable pages. Each page has a
//! human-editable name and a derived urlname built from its ancestors.
//! The crate keeps urlnames, their uniqueness, restriction inheritance,
//! editing locks and the legacy url ledger consistent while pages are
//! created, renamed, moved, restricted or deleted.
//!
//! # Architecture
//!
//! - **Derived paths**: a urlname is the parent's persisted urlname plus the
//!   page's own slug; path changes cascade to every descendant
//! - **Scoped uniqueness**: enforced by the store per (language, layout)
//!   partition, eagerly and again at commit
//! - **Subtree transactions**: mutations claim the subtrees they touch, so
//!   disjoint parts of the tree are edited concurrently without a tree lock
//! - **Pluggable storage**: services depend on the `PageStore` trait;
//!   `MemoryStore` is the bundled backend
//!
//! # Modules
//!
//! - [`models`] - Data structures (Page, LegacyUrl, Actor, etc.)
//! - [`naming`] - Slug conversion and urlname derivation
//! - [`db`] - Storage traits, in-memory store and domain events
//! - [`services`] - PageService, LockService, StatusService, LegacyUrlService
//! - [`operations`] - Retry wrappers for urlname conflicts
//! - [`config`] - Tree configuration
//! - [`logging`] - Tracing subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod naming;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::TreeConfig;
pub use db::{MemoryStore, PageEvent, PageStore, StoreError};
pub use models::*;
pub use operations::ConflictRetryQueue;
pub use services::*;
