//! HTML document module
//!
//! Wraps the `scraper` tree with the small query surface the crawler needs:
//! - exact tag + class lookups, in document order
//! - element text content
//! - multi-valued attribute access

mod document;

pub use document::{Document, Element, MULTI_VALUED_ATTRIBUTES};
