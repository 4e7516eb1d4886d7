//! Extraction policy: turns fetched bytes into a [`PageRecord`]
//!
//! # Title
//!
//! 1. `<title>` with a trailing site suffix removed (after ` | `, ` — `, ` :: `)
//! 2. first heading
//! 3. last URL path segment, humanized (`getting-started.html` → `Getting Started`)
//! 4. the host
//!
//! # Description
//!
//! Meta description, else the first paragraph of the main content, cut at a
//! word boundary to the configured length.

use crate::config::Config;
use crate::crawler::FetchedPage;
use crate::extract::document::{HtmlDocument, TextBlock};
use crate::extract::scraper_doc::{collapse_whitespace, ScraperDocument};
use crate::state::{CrawlCandidate, PageRecord};
use thiserror::Error;
use url::Url;

const TITLE_SEPARATORS: &[&str] = &[" | ", " — ", " :: "];

/// Why a fetched page produced no record content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no extractable content")]
    NoContent,

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
}

impl ExtractionError {
    /// Failure reason recorded in the generated artifacts
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Text fields pulled from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub description: String,
    pub content: String,
}

/// How a body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Html,
    Text,
}

/// Extraction settings
#[derive(Debug, Clone)]
pub struct Extractor {
    max_description_chars: usize,
    include_raw_html: bool,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Extractor {
    pub fn new(config: &Config) -> Self {
        Self {
            max_description_chars: config.extraction.max_description_chars,
            include_raw_html: config.output.include_raw_html,
        }
    }

    /// Builds the record for a fetched candidate
    ///
    /// Never fails: extraction problems become failed records.
    pub fn extract(&self, candidate: &CrawlCandidate, page: &FetchedPage) -> PageRecord {
        let url = candidate.url.as_str();

        let kind = match body_kind(&page.content_type, &page.body) {
            Ok(kind) => kind,
            Err(e) => return PageRecord::failed(url, candidate.source, e.reason()),
        };

        let extracted = match kind {
            BodyKind::Html => {
                let document = ScraperDocument::parse(&page.body);
                self.extract_html(&document, &candidate.url)
            }
            BodyKind::Text => self.extract_text(&page.body, &candidate.url),
        };

        match extracted {
            Ok(fields) => {
                tracing::debug!("Extracted {} ({} chars)", url, fields.content.len());
                let record = PageRecord::extracted(
                    url,
                    candidate.source,
                    fields.title,
                    fields.description,
                    fields.content,
                );
                if self.include_raw_html && kind == BodyKind::Html {
                    record.with_raw_html(page.body.clone())
                } else {
                    record
                }
            }
            Err(e) => {
                tracing::debug!("Nothing to extract from {}: {}", url, e);
                PageRecord::failed(url, candidate.source, e.reason())
            }
        }
    }

    /// Applies the policy to any [`HtmlDocument`]
    pub fn extract_html<D: HtmlDocument>(
        &self,
        document: &D,
        url: &Url,
    ) -> Result<Extracted, ExtractionError> {
        let blocks = document.main_content();
        let content = render_blocks(&blocks);
        if content.trim().is_empty() {
            return Err(ExtractionError::NoContent);
        }

        let title = document
            .title()
            .map(|t| strip_site_suffix(&t))
            .filter(|t| !t.is_empty())
            .or_else(|| document.first_heading())
            .unwrap_or_else(|| title_from_url(url));

        let description = document
            .meta_description()
            .or_else(|| first_paragraph(&blocks))
            .map(|d| truncate_at_word(&d, self.max_description_chars))
            .unwrap_or_default();

        Ok(Extracted {
            title,
            description,
            content,
        })
    }

    /// Markdown, reStructuredText and plain text pass through lightly cleaned
    ///
    /// A leading `---` front-matter block is removed; its `title:` and
    /// `description:` keys are used when present.
    pub fn extract_text(&self, body: &str, url: &Url) -> Result<Extracted, ExtractionError> {
        let normalized = body.replace("\r\n", "\n").replace('\r', "\n");
        let (front, rest) = split_front_matter(&normalized);
        let content = clean_text(rest);
        if content.is_empty() {
            return Err(ExtractionError::NoContent);
        }

        let title = front
            .title
            .or_else(|| first_markdown_heading(&content))
            .unwrap_or_else(|| title_from_url(url));

        let description = front
            .description
            .or_else(|| first_text_paragraph(&content))
            .map(|d| truncate_at_word(&d, self.max_description_chars))
            .unwrap_or_default();

        Ok(Extracted {
            title,
            description,
            content,
        })
    }
}

fn body_kind(content_type: &str, body: &str) -> Result<BodyKind, ExtractionError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "" => {
            if body.trim_start().starts_with('<') {
                Ok(BodyKind::Html)
            } else {
                Ok(BodyKind::Text)
            }
        }
        m if m.contains("html") => Ok(BodyKind::Html),
        m if m.starts_with("text/") => Ok(BodyKind::Text),
        _ => Err(ExtractionError::UnsupportedContentType(mime)),
    }
}

/// Renders blocks as Markdown-flavoured text
///
/// Headings keep `#` markers; consecutive list items stay on adjacent lines;
/// everything else is separated by a blank line.
pub fn render_blocks(blocks: &[TextBlock]) -> String {
    let mut out = String::new();
    let mut previous_was_item = false;

    for block in blocks {
        let is_item = matches!(block, TextBlock::ListItem(_));
        if !out.is_empty() {
            out.push_str(if is_item && previous_was_item { "\n" } else { "\n\n" });
        }
        match block {
            TextBlock::Heading { level, text } => {
                out.push_str(&"#".repeat(usize::from((*level).clamp(1, 6))));
                out.push(' ');
                out.push_str(text);
            }
            TextBlock::Paragraph(text) => out.push_str(text),
            TextBlock::ListItem(text) => {
                out.push_str("- ");
                out.push_str(text);
            }
            TextBlock::Preformatted(text) => {
                out.push_str("```\n");
                out.push_str(text);
                out.push_str("\n```");
            }
        }
        previous_was_item = is_item;
    }

    out
}

fn first_paragraph(blocks: &[TextBlock]) -> Option<String> {
    blocks
        .iter()
        .find(|b| matches!(b, TextBlock::Paragraph(_)))
        .or_else(|| blocks.iter().find(|b| matches!(b, TextBlock::ListItem(_))))
        .map(|b| b.text().to_string())
}

fn strip_site_suffix(title: &str) -> String {
    let cut = TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep))
        .min();
    match cut {
        Some(idx) if idx > 0 => title[..idx].trim().to_string(),
        _ => title.trim().to_string(),
    }
}

/// Humanizes the last path segment, falling back to the host
pub fn title_from_url(url: &Url) -> String {
    let segment = url.path_segments().and_then(|segments| {
        segments
            .rev()
            .map(|s| {
                let decoded = percent_decode(s);
                match decoded.rsplit_once('.') {
                    Some((stem, _)) if !stem.is_empty() => stem.to_string(),
                    _ => decoded,
                }
            })
            .find(|s| {
                !s.trim().is_empty()
                    && !s.eq_ignore_ascii_case("index")
                    && !s.eq_ignore_ascii_case("readme")
            })
    });

    match segment {
        Some(s) => humanize(&s),
        None => url.host_str().unwrap_or("Untitled").to_string(),
    }
}

/// `getting-started_guide` → `Getting Started Guide`
pub fn humanize(raw: &str) -> String {
    raw.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn percent_decode(segment: &str) -> String {
    url::form_urlencoded::parse(format!("x={}", segment.replace('+', "%2B")).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| segment.to_string())
}

/// Cuts `text` to at most `max` characters at a word boundary, adding `...`
pub fn truncate_at_word(text: &str, max: usize) -> String {
    let text = collapse_whitespace(text);
    if text.chars().count() <= max {
        return text;
    }

    let budget = max.saturating_sub(3);
    let head: String = text.chars().take(budget).collect();
    let cut = match head.rfind(' ') {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };
    format!("{}...", cut.trim_end_matches(|c: char| c.is_ascii_punctuation() || c == ' '))
}

#[derive(Debug, Default)]
struct FrontMatter {
    title: Option<String>,
    description: Option<String>,
}

fn split_front_matter(text: &str) -> (FrontMatter, &str) {
    let mut front = FrontMatter::default();
    let Some(after_open) = text.strip_prefix("---\n") else {
        return (front, text);
    };
    let Some(end) = after_open.find("\n---") else {
        return (front, text);
    };

    for line in after_open[..end].lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "title" => front.title = Some(value),
                "description" => front.description = Some(value),
                _ => {}
            }
        }
    }

    let rest = &after_open[end + 4..];
    let rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
    (front, rest)
}

/// Trims trailing spaces and collapses runs of blank lines
fn clean_text(text: &str) -> String {
    let mut out = String::new();
    let mut blank_run = 0;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        blank_run = 0;
        out.push_str(line);
    }

    out
}

fn first_markdown_heading(text: &str) -> Option<String> {
    let mut in_fence = false;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || !trimmed.starts_with('#') {
            continue;
        }
        let heading = trimmed.trim_start_matches('#');
        if heading.starts_with(' ') {
            let heading = collapse_whitespace(heading.trim_end_matches('#'));
            if !heading.is_empty() {
                return Some(heading);
            }
        }
    }
    None
}

fn first_text_paragraph(text: &str) -> Option<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter(|p| !p.starts_with('#') && !p.starts_with("```") && !p.starts_with("~~~"))
        .filter(|p| !p.chars().all(|c| matches!(c, '=' | '-' | '*' | '_' | '\n')))
        .map(collapse_whitespace)
        .next()
}
