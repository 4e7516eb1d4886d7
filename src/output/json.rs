//! `documentation_data.json`: the machine-readable mirror

use crate::aggregate::{Aggregation, Duplicate, Failure, Section};
use crate::output::traits::{OutputResult, Renderer, SiteInfo};
use serde::Serialize;

pub const JSON_FILE: &str = "documentation_data.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentationData<'a> {
    site: &'a SiteInfo,
    generated_at: String,
    page_count: usize,
    sections: &'a [Section],
    failures: &'a [Failure],
    duplicates: &'a [Duplicate],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn file_name(&self) -> &'static str {
        JSON_FILE
    }

    fn render(&self, site: &SiteInfo, aggregation: &Aggregation) -> OutputResult<String> {
        let data = DocumentationData {
            site,
            generated_at: site.timestamp(),
            page_count: aggregation.page_count(),
            sections: &aggregation.sections,
            failures: &aggregation.failures,
            duplicates: &aggregation.duplicates,
        };
        let mut json = serde_json::to_string_pretty(&data)?;
        json.push('\n');
        Ok(json)
    }
}
