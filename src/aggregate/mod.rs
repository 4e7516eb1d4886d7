//! Deduplication and sectioning of page records
//!
//! Records arrive in discovery order. Each one ends up in exactly one of:
//! - a section (successful, first with its URL and content)
//! - the failure list (fetch or extraction failed)
//! - the duplicate list (same content as an earlier page)
//!
//! A record whose normalized URL was already seen is dropped entirely.

mod dedup;
mod section;

pub use dedup::content_fingerprint;
pub use section::{section_key, section_title, DEFAULT_SECTION_TITLE};

use crate::state::PageRecord;
use crate::url::normalize_url;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use url::Url;

/// A group of pages rendered under one heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Grouping key; empty for the default section
    pub name: String,
    pub title: String,
    pub pages: Vec<PageRecord>,
}

/// A page that could not be turned into content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub url: String,
    pub reason: String,
}

/// A page whose content matched an earlier page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Duplicate {
    pub url: String,
    pub duplicate_of: String,
}

/// Output of the aggregation stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub sections: Vec<Section>,
    pub failures: Vec<Failure>,
    pub duplicates: Vec<Duplicate>,
}

impl Aggregation {
    /// Number of pages across all sections
    pub fn page_count(&self) -> usize {
        self.sections.iter().map(|s| s.pages.len()).sum()
    }
}

/// Deduplicates `records` and groups the survivors into sections
///
/// `root` is the target's root URL; local files are sectioned relative to it.
pub fn aggregate(records: Vec<PageRecord>, root: &Url) -> Aggregation {
    let mut aggregation = Aggregation::default();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_content: HashMap<String, String> = HashMap::new();
    let mut section_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let identity = match normalize_url(&record.url) {
            Ok(url) => url.to_string(),
            Err(_) => record.url.clone(),
        };
        if !seen_urls.insert(identity) {
            tracing::debug!("Dropping repeated URL {}", record.url);
            continue;
        }

        if let Some(reason) = record.status.reason() {
            aggregation.failures.push(Failure {
                url: record.url.clone(),
                reason: reason.to_string(),
            });
            continue;
        }

        let fingerprint = content_fingerprint(&record.content);
        if let Some(first) = seen_content.get(&fingerprint) {
            tracing::debug!("{} duplicates {}", record.url, first);
            aggregation.duplicates.push(Duplicate {
                url: record.url,
                duplicate_of: first.clone(),
            });
            continue;
        }
        seen_content.insert(fingerprint, record.url.clone());

        let key = Url::parse(&record.url)
            .map(|url| section_key(&url, root))
            .unwrap_or_default();
        let index = *section_index.entry(key.clone()).or_insert_with(|| {
            aggregation.sections.push(Section {
                title: section_title(&key),
                name: key.clone(),
                pages: Vec::new(),
            });
            aggregation.sections.len() - 1
        });
        aggregation.sections[index].pages.push(record);
    }

    tracing::info!(
        "Aggregated {} pages into {} sections ({} failed, {} duplicates)",
        aggregation.page_count(),
        aggregation.sections.len(),
        aggregation.failures.len(),
        aggregation.duplicates.len()
    );
    aggregation
}
