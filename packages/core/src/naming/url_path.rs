//! Urlname paths
//!
//! A page's urlname is its parent's urlname plus its own slug:
//!
//! ```rust
//! use pagetree_core::naming::nested_urlname;
//!
//! assert_eq!(nested_urlname(Some("parent"), None, "Page", 3), "parent/page");
//! // An explicit slug that already looks like a path is re-sliced
//! assert_eq!(nested_urlname(Some("new"), Some("old/page"), "Page", 3), "new/page");
//! ```

use super::name_converter::convert_url_name;

pub const URLNAME_SEPARATOR: char = '/';

/// Last segment of a urlname
pub fn slug_of(urlname: &str) -> &str {
    urlname
        .rsplit_once(URLNAME_SEPARATOR)
        .map_or(urlname, |(_, last)| last)
}

/// Builds a full urlname.
///
/// The segment basis is the last segment of `current_urlname` when one is
/// set, otherwise `name`. `parent_urlname` must be the parent's persisted
/// urlname; a missing or empty one makes the page a top-level address.
pub fn nested_urlname(
    parent_urlname: Option<&str>,
    current_urlname: Option<&str>,
    name: &str,
    min_length: usize,
) -> String {
    let basis = match current_urlname {
        Some(urlname) if !urlname.trim().is_empty() => slug_of(urlname),
        _ => name,
    };
    let segment = convert_url_name(basis, min_length);

    match parent_urlname {
        Some(parent) if !parent.is_empty() => {
            format!("{}{}{}", parent, URLNAME_SEPARATOR, segment)
        }
        _ => segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_of() {
        assert_eq!(slug_of("a/b/c"), "c");
        assert_eq!(slug_of("single"), "single");
        assert_eq!(slug_of(""), "");
    }

    #[test]
    fn test_root_urlname_from_name() {
        assert_eq!(nested_urlname(None, None, "A", 3), "--a");
        assert_eq!(nested_urlname(None, None, "Aü", 3), "aue");
    }

    #[test]
    fn test_child_urlname_joins_parent() {
        assert_eq!(
            nested_urlname(Some("parent-1"), None, "Page", 3),
            "parent-1/page"
        );
        assert_eq!(
            nested_urlname(Some("a/b"), None, "Au", 3),
            "a/b/-au"
        );
    }

    #[test]
    fn test_empty_parent_urlname_is_omitted() {
        assert_eq!(nested_urlname(Some(""), None, "Page", 3), "page");
    }

    #[test]
    fn test_existing_urlname_wins_over_name() {
        assert_eq!(
            nested_urlname(None, Some("My Custom"), "Ignored", 3),
            "my-custom"
        );
        assert_eq!(
            nested_urlname(Some("parent-2"), Some("parent-1/page"), "Other", 3),
            "parent-2/page"
        );
    }

    #[test]
    fn test_blank_existing_urlname_falls_back_to_name() {
        assert_eq!(nested_urlname(None, Some("  "), "Page", 3), "page");
    }
}
