//! Legacy urls: the ledger of retired urlnames.
//!
//! A `LegacyUrl` is written whenever a page's urlname changes, pointing the
//! former urlname at the page that used to own it. Rows are append-only and
//! at most one row exists per `(urlname, page_id)` pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyUrl {
    pub id: String,
    /// The retired urlname
    pub urlname: String,
    /// Page that owned `urlname` before the change
    pub page_id: String,
    pub created_at: DateTime<Utc>,
}

impl LegacyUrl {
    pub fn new(urlname: impl Into<String>, page_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            urlname: urlname.into(),
            page_id: page_id.into(),
            created_at: now,
        }
    }

    /// True when this row records the same `(urlname, page_id)` pair
    pub fn same_entry(&self, urlname: &str, page_id: &str) -> bool {
        self.urlname == urlname && self.page_id == page_id
    }
}
