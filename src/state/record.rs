//! Page records produced by extraction
use crate::state::DiscoverySource;
use serde::Serialize;

/// Outcome of processing one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    /// Content was extracted
    Ok,
    /// Fetch or extraction failed
    Failed { reason: String },
}

impl PageStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// The failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

/// Cleaned content for one discovered URL
///
/// A failed record keeps its URL and reason but carries empty text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub source: DiscoverySource,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
    #[serde(flatten)]
    pub status: PageStatus,
}

impl PageRecord {
    /// A successfully extracted page
    pub fn extracted(
        url: impl Into<String>,
        source: DiscoverySource,
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            source,
            title: title.into(),
            description: description.into(),
            content: content.into(),
            raw_html: None,
            status: PageStatus::Ok,
        }
    }

    /// A page that could not be fetched or extracted
    pub fn failed(url: impl Into<String>, source: DiscoverySource, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source,
            title: String::new(),
            description: String::new(),
            content: String::new(),
            raw_html: None,
            status: PageStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Attaches the raw HTML the page was extracted from
    pub fn with_raw_html(mut self, html: impl Into<String>) -> Self {
        self.raw_html = Some(html.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}
