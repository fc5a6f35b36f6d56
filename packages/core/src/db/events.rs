//! Domain Events for the page tree
//!
//! Emitted by the services on a tokio broadcast channel after a transaction
//! has committed, so subscribers (cache sweepers, admin UIs) never observe a
//! change that was rolled back.

use crate::models::Page;
use serde::{Deserialize, Serialize};

/// A urlname change of one page, as recorded by a cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlnameChange {
    pub page_id: String,
    pub old_urlname: Option<String>,
    pub new_urlname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageEvent {
    #[serde(rename = "page:created")]
    Created { page: Box<Page> },

    #[serde(rename = "page:updated")]
    Updated { page: Box<Page> },

    /// One event per page whose urlname changed, descendants included
    #[serde(rename = "page:urlnameChanged")]
    UrlnameChanged(UrlnameChange),

    #[serde(rename = "page:deleted")]
    Deleted { id: String },

    #[serde(rename = "page:locked")]
    Locked { id: String, locked_by: String },

    #[serde(rename = "page:unlocked")]
    Unlocked { id: String },
}

impl PageEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            PageEvent::Created { .. } => "page:created",
            PageEvent::Updated { .. } => "page:updated",
            PageEvent::UrlnameChanged(_) => "page:urlnameChanged",
            PageEvent::Deleted { .. } => "page:deleted",
            PageEvent::Locked { .. } => "page:locked",
            PageEvent::Unlocked { .. } => "page:unlocked",
        }
    }

    /// Id of the page the event is about
    pub fn page_id(&self) -> &str {
        match self {
            PageEvent::Created { page } | PageEvent::Updated { page } => &page.id,
            PageEvent::UrlnameChanged(change) => &change.page_id,
            PageEvent::Deleted { id }
            | PageEvent::Locked { id, .. }
            | PageEvent::Unlocked { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The `type` tag is merged into the payload (internally tagged), and
    /// matches `event_type()`.
    #[test]
    fn test_event_serialization_contract() {
        let event = PageEvent::UrlnameChanged(UrlnameChange {
            page_id: "page-1".to_string(),
            old_urlname: Some("parent-1/page".to_string()),
            new_urlname: "parent-2/page".to_string(),
        });

        let parsed = serde_json::to_value(&event).unwrap();
        assert_eq!(parsed["type"], event.event_type());
        assert_eq!(parsed["pageId"], "page-1");
        assert_eq!(parsed["oldUrlname"], "parent-1/page");
        assert_eq!(parsed["newUrlname"], "parent-2/page");

        let locked = PageEvent::Locked {
            id: "page-1".to_string(),
            locked_by: "7".to_string(),
        };
        let parsed = serde_json::to_value(&locked).unwrap();
        assert_eq!(parsed["type"], "page:locked");
        assert_eq!(parsed["locked_by"], "7");
        assert_eq!(locked.page_id(), "page-1");
    }
}
