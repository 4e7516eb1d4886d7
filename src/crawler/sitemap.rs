//! Sitemap XML parsing
//!
//! Handles both `<urlset>` documents (page URLs) and `<sitemapindex>`
//! documents (links to further sitemaps). Namespace prefixes are ignored.

use quick_xml::events::Event;
use quick_xml::Reader;

/// What a sitemap document contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A `<urlset>`: page locations in document order
    UrlSet(Vec<String>),
    /// A `<sitemapindex>`: child sitemap locations in document order
    Index(Vec<String>),
}

/// Parses sitemap XML
///
/// Returns `None` when the document is not well-formed XML or its root is
/// neither `urlset` nor `sitemapindex` (for example an HTML error page
/// served with status 200).
///
/// # Example
///
/// ```
/// use sumi_scribe::crawler::{parse_sitemap, SitemapDocument};
///
/// let xml = r#"<urlset><url><loc>https://a.dev/x</loc></url></urlset>"#;
/// assert_eq!(
///     parse_sitemap(xml),
///     Some(SitemapDocument::UrlSet(vec!["https://a.dev/x".to_string()]))
/// );
/// ```
pub fn parse_sitemap(xml: &str) -> Option<SitemapDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<bool> = None; // Some(true) = sitemapindex
    let mut locations = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"urlset" if root.is_none() => root = Some(false),
                    b"sitemapindex" if root.is_none() => root = Some(true),
                    b"loc" => {
                        in_loc = true;
                        current.clear();
                    }
                    _ if root.is_none() => return None,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) if root.is_none() => {
                // `<urlset/>` is an empty but valid sitemap
                return match e.local_name().as_ref() {
                    b"urlset" => Some(SitemapDocument::UrlSet(Vec::new())),
                    b"sitemapindex" => Some(SitemapDocument::Index(Vec::new())),
                    _ => None,
                };
            }
            Ok(Event::Text(t)) if in_loc => {
                let text = t.unescape().ok()?;
                current.push_str(&text);
            }
            Ok(Event::CData(c)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locations.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("Sitemap XML error at {}: {}", reader.buffer_position(), e);
                return None;
            }
            _ => {}
        }
    }

    match root? {
        true => Some(SitemapDocument::Index(locations)),
        false => Some(SitemapDocument::UrlSet(locations)),
    }
}
