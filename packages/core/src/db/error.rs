//! Storage Error Types
//!
//! Errors raised by [`super::PageStore`] implementations. Service-level
//! meaning (validation failure vs. concurrent conflict) is assigned by the
//! services, not here.

use crate::models::UrlScope;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Another page already owns this urlname in the same scope
    #[error("Urlname '{urlname}' is already taken in scope {scope}")]
    UniqueViolation { urlname: String, scope: UrlScope },

    /// Page id does not exist
    #[error("Page not found: {id}")]
    NotFound { id: String },

    /// Page id already exists
    #[error("Duplicate page id: {id}")]
    DuplicateId { id: String },

    /// A thread panicked while holding the store lock
    #[error("Store state lock poisoned")]
    Poisoned,

    /// Backend specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unique_violation(urlname: impl Into<String>, scope: UrlScope) -> Self {
        Self::UniqueViolation {
            urlname: urlname.into(),
            scope,
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
