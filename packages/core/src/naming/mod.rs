//! Urlname derivation
//!
//! - [`name_converter`] turns arbitrary text into a url-safe token
//! - [`url_path`] builds a page's full urlname from its parent's urlname
//!
//! Both are pure functions; the services decide where the inputs come from.

pub mod name_converter;
pub mod url_path;

pub use name_converter::{convert_to_urlname, convert_url_name, MIN_URLNAME_LENGTH};
pub use url_path::{nested_urlname, slug_of, URLNAME_SEPARATOR};
