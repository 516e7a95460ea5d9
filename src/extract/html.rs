//! HTML text and link extraction
//!
//! Visible text skips `script`, `style`, `noscript` and `svg` subtrees. Links are
//! every `<a href>` resolved against the page URL and canonicalized; hrefs that
//! cannot be canonicalized are dropped here, domain filtering happens later.

use crate::extract::collapse_whitespace;
use crate::model::truncate_anchor;
use crate::url::{canonicalize, CanonicalUrl};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "svg"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlDocument {
    /// First non-empty `<title>`, or empty
    pub title: String,

    /// Visible text with whitespace collapsed
    pub text: String,

    /// Outbound links in document order
    pub links: Vec<ExtractedLink>,
}

impl HtmlDocument {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub target: CanonicalUrl,
    pub anchor_text: String,
}

/// Parses an HTML page into title, visible text and outbound links
///
/// # Example
///
/// ```
/// use sitegraph::extract::extract_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Home</title><script>var x;</script></head>
///     <body><p>Hello   world</p><a href="/about/">About us</a></body></html>"#;
/// let page = Url::parse("https://example.edu/").unwrap();
/// let doc = extract_html(html, &page);
///
/// assert_eq!(doc.title, "Home");
/// assert_eq!(doc.text, "Home Hello world About us");
/// assert_eq!(doc.links[0].target.as_str(), "https://example.edu/about");
/// ```
pub fn extract_html(html: &str, page_url: &Url) -> HtmlDocument {
    let document = Html::parse_document(html);

    HtmlDocument {
        title: extract_title(&document),
        text: visible_text(&document),
        links: extract_links(&document, page_url),
    }
}

/// Parses only the outbound links of a page (used while crawling)
pub fn outbound_links(html: &str, page_url: &Url) -> Vec<ExtractedLink> {
    extract_links(&Html::parse_document(html), page_url)
}

fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|title| !title.is_empty())
        .unwrap_or_default()
}

fn visible_text(document: &Html) -> String {
    let fragments: Vec<&str> = document
        .root_element()
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            })
        })
        .filter_map(|node| node.value().as_text().map(|text| text.trim()))
        .filter(|text| !text.is_empty())
        .collect();

    collapse_whitespace(&fragments.join(" "))
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<ExtractedLink> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let target = match canonicalize(href, Some(page_url)) {
                Ok(target) => target,
                Err(e) => {
                    tracing::trace!("Discarding link on {}: {}", page_url, e);
                    return None;
                }
            };
            Some(ExtractedLink {
                target,
                anchor_text: anchor_text(&anchor),
            })
        })
        .collect()
}

fn anchor_text(anchor: &ElementRef) -> String {
    let text: String = anchor
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();
    truncate_anchor(&text)
}
