//! Data Models
//!
//! This module contains the plain data records of the page tree:
//!
//! - `Page` - an addressable tree node with derived urlname
//! - `LegacyUrl` - a retired urlname pointing at its former page
//! - `Actor` - identity used by the editing lock
//! - `PreviewContext` - explicit per-request preview marker
//! - `time` - clock abstraction for deterministic tests

mod actor;
mod legacy_url;
mod page;
mod preview;
pub mod time;

pub use actor::Actor;
pub use legacy_url::LegacyUrl;
pub use page::{CopyOverrides, DeleteResult, NewPage, Page, PageFilter, PageStatus, UrlScope};
pub use preview::PreviewContext;
pub use time::{ManualTimeProvider, SystemTimeProvider, TimeProvider};
