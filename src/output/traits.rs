//! Renderer trait and shared types

use crate::aggregate::Aggregation;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering an artifact
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for rendering operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Run-level facts printed in every artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    /// Target root as given to the run, normalized
    pub root: String,
    #[serde(skip)]
    pub generated_at: DateTime<Utc>,
}

impl SiteInfo {
    /// Timestamp in RFC 3339 with second precision
    pub fn timestamp(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Where the artifacts of a run were written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPaths {
    pub summary: PathBuf,
    pub full: PathBuf,
    pub json: PathBuf,
}

/// Turns an aggregation into the text of one artifact
///
/// Rendering is pure: the same site info and aggregation always produce the
/// same bytes.
pub trait Renderer {
    /// File name of the artifact inside the output directory
    fn file_name(&self) -> &'static str;

    /// Renders the artifact
    fn render(&self, site: &SiteInfo, aggregation: &Aggregation) -> OutputResult<String>;
}
