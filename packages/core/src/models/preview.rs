//! Per-request preview context.
//!
//! Replaces a process-wide "current preview" pointer: callers that render a
//! page in preview mode carry a `PreviewContext` and pass it explicitly to
//! [`crate::services::cache_key`] and [`crate::services::LockService::unlock`].

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewContext {
    page_id: Option<String>,
}

impl PreviewContext {
    /// Context outside of preview mode
    pub fn none() -> Self {
        Self::default()
    }

    /// Context previewing the given page
    pub fn previewing(page_id: impl Into<String>) -> Self {
        Self {
            page_id: Some(page_id.into()),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    pub fn is_previewing(&self, page_id: &str) -> bool {
        self.page_id.as_deref() == Some(page_id)
    }

    /// Clears the marker if it points at `page_id`; returns whether it did
    pub fn clear_if(&mut self, page_id: &str) -> bool {
        if self.is_previewing(page_id) {
            self.page_id = None;
            true
        } else {
            false
        }
    }
}
