//! Storage Layer
//!
//! - [`PageStore`] / [`StoreTransaction`] - the repository contract the
//!   services are written against
//! - [`MemoryStore`] - in-process implementation with subtree-scoped
//!   transactions
//! - [`PageEvent`] - domain events published after commit

mod error;
pub mod events;
mod memory_store;
mod page_store;
mod subtree_lock;

pub use error::{StoreError, StoreResult};
pub use events::{PageEvent, UrlnameChange};
pub use memory_store::MemoryStore;
pub use page_store::{PageStore, StoreTransaction};
