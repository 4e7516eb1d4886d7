//! `HtmlDocument` over the scraper crate
//!
//! Main-content extraction walks the DOM below the best content root and
//! turns it into [`TextBlock`]s:
//!
//! **Content root** (first match wins): `main`, `article`, `[role=main]`,
//! `#content`, `.content`, `.main-content`, `.post-content`,
//! `.entry-content`, `.documentation`, `.docs`, then `body`.
//!
//! **Skipped subtrees:**
//! - `script`, `style`, `noscript`, `template`, `iframe`, `svg`, `form`
//! - `nav`, `header`, `footer`, `aside`, `menu`
//! - elements whose class or id is a navigation/boilerplate marker
//!   (`sidebar`, `breadcrumb`, `advertisement`, `share`, ...)
//! - elements with `role` of `navigation`, `banner`, `contentinfo`,
//!   `complementary` or `search`, and anything `hidden`/`aria-hidden`

use crate::extract::document::{HtmlDocument, TextBlock};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=main]",
    "#content",
    ".content",
    ".main-content",
    ".post-content",
    ".entry-content",
    ".documentation",
    ".docs",
];

const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "form", "nav", "header", "footer",
    "aside", "menu", "button", "select", "head",
];

const BOILERPLATE_MARKERS: &[&str] = &[
    "sidebar",
    "navigation",
    "navbar",
    "menu",
    "breadcrumb",
    "breadcrumbs",
    "footer",
    "header",
    "advertisement",
    "ad",
    "ads",
    "social",
    "share",
    "comments",
    "comment",
    "related",
    "cookie-banner",
    "skip-link",
];

const SKIP_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary", "search"];

/// Elements that start and end a block of text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "body", "blockquote", "table", "thead", "tbody",
    "tr", "td", "th", "ul", "ol", "dl", "dt", "dd", "figure", "figcaption", "details", "summary",
    "hr", "address", "caption",
];

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collapses runs of whitespace into single spaces and trims
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A parsed HTML page
pub struct ScraperDocument {
    html: Html,
}

impl ScraperDocument {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    fn first_text(&self, css: &str) -> Option<String> {
        let sel = selector(css)?;
        self.html
            .select(&sel)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
    }

    fn meta_content(&self, attribute: &str, value: &str) -> Option<String> {
        let sel = selector(&format!("meta[{}]", attribute))?;
        self.html
            .select(&sel)
            .filter(|el| {
                el.value()
                    .attr(attribute)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
            })
            .filter_map(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .find(|content| !content.is_empty())
    }

    fn content_root(&self) -> Option<ElementRef<'_>> {
        for css in MAIN_SELECTORS {
            let Some(sel) = selector(css) else { continue };
            if let Some(element) = self.html.select(&sel).find(|el| !is_skipped(el)) {
                return Some(element);
            }
        }
        let body = selector("body")?;
        self.html.select(&body).next()
    }

    fn base_url(&self, page_url: &Url) -> Url {
        selector("base[href]")
            .and_then(|sel| self.html.select(&sel).next())
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| page_url.join(href.trim()).ok())
            .unwrap_or_else(|| page_url.clone())
    }
}

impl HtmlDocument for ScraperDocument {
    fn title(&self) -> Option<String> {
        self.first_text("title")
    }

    fn first_heading(&self) -> Option<String> {
        self.first_text("h1, h2, h3, h4, h5, h6")
    }

    fn meta_description(&self) -> Option<String> {
        self.meta_content("name", "description")
            .or_else(|| self.meta_content("property", "og:description"))
    }

    fn main_content(&self) -> Vec<TextBlock> {
        let mut collector = BlockCollector::default();
        if let Some(root) = self.content_root() {
            collector.walk(root);
            collector.flush(TextBlock::Paragraph);
        }
        collector.blocks
    }

    fn links(&self, base: &Url) -> Vec<Url> {
        let base = self.base_url(base);
        let Some(sel) = selector("a[href]") else {
            return Vec::new();
        };

        self.html
            .select(&sel)
            .filter(|el| el.value().attr("download").is_none())
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| resolve_link(href, &base))
            .collect()
    }
}

fn is_skipped(element: &ElementRef<'_>) -> bool {
    let el = element.value();

    if SKIP_TAGS.contains(&el.name()) {
        return true;
    }
    if el.attr("hidden").is_some()
        || el
            .attr("aria-hidden")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        return true;
    }
    if el
        .attr("role")
        .is_some_and(|role| SKIP_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()))
    {
        return true;
    }
    if el
        .classes()
        .any(|class| BOILERPLATE_MARKERS.contains(&class.to_ascii_lowercase().as_str()))
    {
        return true;
    }
    el.id()
        .is_some_and(|id| BOILERPLATE_MARKERS.contains(&id.to_ascii_lowercase().as_str()))
}

/// Accumulates inline text and cuts it into blocks at block boundaries
#[derive(Default)]
struct BlockCollector {
    blocks: Vec<TextBlock>,
    buffer: String,
}

impl BlockCollector {
    fn flush(&mut self, make: impl FnOnce(String) -> TextBlock) {
        let text = collapse_whitespace(&self.buffer);
        self.buffer.clear();
        if !text.is_empty() {
            self.blocks.push(make(text));
        }
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.buffer.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        if is_skipped(&element) {
            return;
        }

        let name = element.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<u8>().unwrap_or(1);
                self.flush(TextBlock::Paragraph);
                self.walk(element);
                self.flush(|text| TextBlock::Heading { level, text });
            }
            "pre" => {
                self.flush(TextBlock::Paragraph);
                let raw: String = element.text().collect();
                let code = raw.trim_matches('\n').trim_end();
                if !code.trim().is_empty() {
                    self.blocks.push(TextBlock::Preformatted(code.to_string()));
                }
            }
            "li" => {
                self.flush(TextBlock::Paragraph);
                self.walk(element);
                self.flush(TextBlock::ListItem);
            }
            "br" => self.buffer.push(' '),
            _ if BLOCK_TAGS.contains(&name) => {
                self.flush(TextBlock::Paragraph);
                self.walk(element);
                self.flush(TextBlock::Paragraph);
            }
            // inline elements keep their text in the current block
            _ => self.walk(element),
        }
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links (same page anchors)
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:", "ftp:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute)
}
