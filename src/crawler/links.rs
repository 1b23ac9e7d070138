//! Link extraction from listing pages
//!
//! Both the root page (topic links) and each topic page (article links) are
//! read the same way: every `<a>` whose class string is exactly the
//! configured one, in document order.

use crate::html::Document;

/// Extracts `href` targets of anchors with exactly `class_name`
///
/// # Arguments
///
/// * `document` - The parsed listing page
/// * `class_name` - Exact class attribute string of the wanted anchors
/// * `base_filter` - If set, only links containing this substring are kept
///
/// # Returns
///
/// Links in document order. Anchors without `href` are dropped and
/// duplicates are kept.
///
/// # Example
///
/// ```
/// use topic_harvest::crawler::extract_links;
/// use topic_harvest::Document;
///
/// let doc = Document::parse(r#"<a class="t" href="https://x.test/a/">A</a><a class="t">no href</a>"#);
/// assert_eq!(extract_links(&doc, "t", None), vec!["https://x.test/a/"]);
/// ```
pub fn extract_links(document: &Document, class_name: &str, base_filter: Option<&str>) -> Vec<String> {
    let links: Vec<String> = document
        .query("a", class_name)
        .into_iter()
        .filter_map(|anchor| anchor.attr("href"))
        .map(str::to_string)
        .collect();

    match base_filter {
        Some(base) => filter_by_base(links, base),
        None => links,
    }
}

/// Keeps the links containing `base` as a substring, preserving order
pub fn filter_by_base(links: Vec<String>, base: &str) -> Vec<String> {
    let before = links.len();
    let kept: Vec<String> = links.into_iter().filter(|link| link.contains(base)).collect();

    if kept.len() < before {
        tracing::debug!(
            "Base filter '{}' dropped {} of {} links",
            base,
            before - kept.len(),
            before
        );
    }
    kept
}
