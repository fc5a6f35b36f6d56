//! Page Cache Keys
//!
//! `<namespace>/<page id>-<timestamp>`. Outside a preview the timestamp is
//! `published_at`, so edits to a published page keep serving the cached
//! render until it is published again. While this page is being previewed
//! the timestamp is `updated_at`, so every edit shows up. Pages never
//! published fall back to `updated_at`.

use crate::models::{Page, PreviewContext};
use chrono::SecondsFormat;

pub fn cache_key(page: &Page, preview: &PreviewContext, namespace: &str) -> String {
    let stamp = if preview.is_previewing(&page.id) {
        page.updated_at
    } else {
        page.published_at.unwrap_or(page.updated_at)
    };
    format!(
        "{}/{}-{}",
        namespace,
        page.id,
        stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    )
}
