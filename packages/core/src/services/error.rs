//! Service Layer Error Types
//!
//! - [`ValidationError`] - a rule rejected the page; nothing was written
//! - [`PageServiceError`] - everything a service operation can fail with

use crate::db::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation rules, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRule {
    /// Field must not be blank
    Presence,
    /// Urlname must be unique within its (language, layout) scope
    Uniqueness,
    /// Urlname must not be a reserved system name
    Reserved,
    /// Urlname must reach the minimum length
    MinLength,
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValidationRule::Presence => "presence",
            ValidationRule::Uniqueness => "uniqueness",
            ValidationRule::Reserved => "reserved-name",
            ValidationRule::MinLength => "min-length",
        };
        f.write_str(name)
    }
}

/// First failing validation rule for a field
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{field} failed {rule} validation")]
pub struct ValidationError {
    pub field: String,
    pub rule: ValidationRule,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }
}

#[derive(Error, Debug)]
pub enum PageServiceError {
    /// Validation failed; no mutation was applied
    #[error("Page validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A concurrent writer committed the same urlname first.
    /// Retry the operation so validation runs again.
    #[error("Concurrent conflict on urlname '{urlname}'")]
    ConcurrentConflict { urlname: String },

    /// Page not found by id
    #[error("Page not found: {id}")]
    NotFound { id: String },

    /// Referenced parent does not exist
    #[error("Parent page not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    /// Reparent target is the page itself or one of its descendants
    #[error("Cannot move page {page_id} below {parent_id}: circular reference")]
    CircularReference { page_id: String, parent_id: String },

    /// Destroy requires children to be handled first
    #[error("Page {id} still has children")]
    HasChildren { id: String },

    /// Page is locked by a different actor
    #[error("Page {id} is locked by {locked_by}")]
    LockedByOther { id: String, locked_by: String },

    /// Actor lacks the configured identity attribute
    #[error("Actor has no identity attribute '{field}'")]
    MissingActorIdentity { field: String },

    /// Storage failure
    #[error("Storage operation failed: {0}")]
    Store(StoreError),
}

impl From<StoreError> for PageServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { urlname, .. } => Self::ConcurrentConflict { urlname },
            StoreError::NotFound { id } => Self::NotFound { id },
            other => Self::Store(other),
        }
    }
}

impl PageServiceError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn parent_not_found(parent_id: impl Into<String>) -> Self {
        Self::ParentNotFound {
            parent_id: parent_id.into(),
        }
    }

    pub fn circular_reference(page_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::CircularReference {
            page_id: page_id.into(),
            parent_id: parent_id.into(),
        }
    }

    pub fn validation(field: impl Into<String>, rule: ValidationRule) -> Self {
        Self::Validation(ValidationError::new(field, rule))
    }

    /// Worth retrying as-is (validation re-runs on retry)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentConflict { .. })
    }

    /// Failures a caller can surface to a user instead of treating as a bug
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::ConcurrentConflict { .. }
                | Self::CircularReference { .. }
                | Self::HasChildren { .. }
                | Self::LockedByOther { .. }
        )
    }

    /// The validation error, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}
