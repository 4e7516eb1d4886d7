//! Section keys
//!
//! Web pages are grouped by the first path segment after the host; a lone
//! `index.*` segment belongs to the root. Local files are grouped by their
//! top-level directory below the target root.

use crate::extract::{humanize, percent_decode};
use url::Url;

/// Title of the section holding root-level pages
pub const DEFAULT_SECTION_TITLE: &str = "Overview";

/// Section key for `page`; the empty string is the default section
pub fn section_key(page: &Url, root: &Url) -> String {
    if page.scheme() == "file" {
        local_key(page, root)
    } else {
        web_key(page)
    }
}

/// Display title for a section key
pub fn section_title(key: &str) -> String {
    if key.is_empty() {
        DEFAULT_SECTION_TITLE.to_string()
    } else {
        humanize(key)
    }
}

fn segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).map(percent_decode).collect())
        .unwrap_or_default()
}

fn web_key(page: &Url) -> String {
    let segments = segments(page);
    match segments.as_slice() {
        [] => String::new(),
        [only] if is_index(only) => String::new(),
        [first, ..] => first.clone(),
    }
}

fn local_key(page: &Url, root: &Url) -> String {
    let page_segments = segments(page);
    let root_segments = segments(root);

    let relative = match page_segments.strip_prefix(root_segments.as_slice()) {
        Some(rest) => rest,
        None => return String::new(),
    };

    // a single remaining segment is a file directly under the root
    match relative {
        [directory, _, ..] => directory.clone(),
        _ => String::new(),
    }
}

fn is_index(segment: &str) -> bool {
    segment
        .rsplit_once('.')
        .is_some_and(|(stem, _)| stem.eq_ignore_ascii_case("index"))
}
