use scraper::{ElementRef, Html};

/// Attributes whose value is a whitespace-separated token list
///
/// Every other attribute yields its raw value as a single entry.
pub const MULTI_VALUED_ATTRIBUTES: &[&str] = &[
    "class",
    "rel",
    "rev",
    "accept-charset",
    "headers",
    "accesskey",
    "dropzone",
];

/// A parsed HTML page
///
/// Owned by exactly one crawl step; it is parsed from a fetched body and
/// dropped once the article record has been built.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses an HTML body
    ///
    /// Parsing never fails: malformed markup is repaired by the HTML5 parser,
    /// so missing elements simply produce empty query results later.
    ///
    /// # Example
    ///
    /// ```
    /// use topic_harvest::html::Document;
    ///
    /// let doc = Document::parse(r#"<p class="lead">Hello</p>"#);
    /// assert_eq!(doc.query("p", "lead").len(), 1);
    /// ```
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Finds every element with the given tag whose `class` attribute equals
    /// `class_name` exactly
    ///
    /// The comparison is on the whole attribute string, not on individual
    /// class tokens: `"a b"` does not match an element with `class="b a"` or
    /// `class="a"`. Results are in document order.
    pub fn query(&self, tag: &str, class_name: &str) -> Vec<Element<'_>> {
        let root = self.html.root_element();
        root.descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches_tag_and_class(el, tag, class_name))
            .map(Element::new)
            .collect()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("errors", &self.html.errors.len())
            .finish()
    }
}

/// A single element inside a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }

    /// The element's tag name
    pub fn tag(&self) -> &'a str {
        self.inner.value().name()
    }

    /// Concatenated text of all descendant text nodes, untrimmed
    pub fn text(&self) -> String {
        self.inner.text().collect()
    }

    /// The raw value of an attribute, if present
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// All values carried by an attribute
    ///
    /// Token-list attributes (see [`MULTI_VALUED_ATTRIBUTES`]) are split on
    /// whitespace. Other attributes yield their raw value as one entry, which
    /// may be the empty string. A missing attribute yields an empty list.
    pub fn attribute(&self, name: &str) -> Vec<String> {
        let Some(value) = self.attr(name) else {
            return Vec::new();
        };

        if MULTI_VALUED_ATTRIBUTES
            .iter()
            .any(|multi| multi.eq_ignore_ascii_case(name))
        {
            value.split_whitespace().map(str::to_string).collect()
        } else {
            vec![value.to_string()]
        }
    }

    /// Finds descendants of this element matching tag and exact class
    ///
    /// The element itself is never part of the result.
    pub fn query(&self, tag: &str, class_name: &str) -> Vec<Element<'a>> {
        self.inner
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| matches_tag_and_class(el, tag, class_name))
            .map(Element::new)
            .collect()
    }
}

fn matches_tag_and_class(el: &ElementRef<'_>, tag: &str, class_name: &str) -> bool {
    let value = el.value();
    value.name().eq_ignore_ascii_case(tag) && value.attr("class") == Some(class_name)
}
