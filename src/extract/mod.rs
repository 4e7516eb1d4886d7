//! Content extraction
//!
//! - `HtmlDocument`: what the extraction policy needs from a parsed page
//! - `ScraperDocument`: the scraper-backed implementation
//! - `Extractor`: title/description/body policy producing `PageRecord`s

mod document;
mod extractor;
mod scraper_doc;

pub use document::{HtmlDocument, TextBlock};
pub use extractor::{
    humanize, render_blocks, title_from_url, truncate_at_word, Extracted, ExtractionError,
    Extractor,
};
pub use scraper_doc::ScraperDocument;

pub(crate) use extractor::percent_decode;
