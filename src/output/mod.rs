//! Artifact rendering and writing
//!
//! This module handles:
//! - Rendering `llms.txt`, `llms-full.txt` and `documentation_data.json`
//! - Writing them into the output directory
//! - Printing the end-of-run report for the CLI

mod full;
mod json;
pub mod stats;
mod summary;
mod traits;

pub use full::{demote_headings, FullRenderer, FULL_FILE};
pub use json::{JsonRenderer, JSON_FILE};
pub use stats::print_report;
pub use summary::{SummaryRenderer, SUMMARY_FILE};
pub use traits::{OutputError, OutputPaths, OutputResult, Renderer, SiteInfo};

use crate::aggregate::Aggregation;
use crate::ScribeError;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// `# name` and `> description` blocks shared by the text artifacts
pub(crate) fn header_blocks(site: &SiteInfo) -> Vec<String> {
    let mut blocks = vec![format!("# {}", site.name)];
    if !site.description.is_empty() {
        blocks.push(format!("> {}", site.description));
    }
    blocks
}

/// Escapes brackets so a title cannot break the Markdown link around it
pub(crate) fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Renders all three artifacts in memory
///
/// Nothing touches the disk until every artifact rendered successfully.
pub fn render_all(
    site: &SiteInfo,
    aggregation: &Aggregation,
) -> Result<Vec<(&'static str, String)>, OutputError> {
    let renderers: [&dyn Renderer; 3] = [&SummaryRenderer, &FullRenderer, &JsonRenderer];
    renderers
        .iter()
        .map(|renderer| Ok((renderer.file_name(), renderer.render(site, aggregation)?)))
        .collect()
}

/// Renders and writes the artifacts into `directory`, creating it if needed
///
/// # Errors
///
/// Any rendering or filesystem failure; a write failure names the path.
pub fn write_artifacts(
    directory: &Path,
    site: &SiteInfo,
    aggregation: &Aggregation,
) -> Result<OutputPaths, ScribeError> {
    let rendered = render_all(site, aggregation)?;

    fs::create_dir_all(directory).map_err(|source| ScribeError::Write {
        path: directory.to_path_buf(),
        source,
    })?;

    for (name, content) in &rendered {
        let path = directory.join(name);
        write_file(&path, content)?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), content.len());
    }

    Ok(OutputPaths {
        summary: directory.join(SUMMARY_FILE),
        full: directory.join(FULL_FILE),
        json: directory.join(JSON_FILE),
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ScribeError> {
    let wrap = |source: std::io::Error| ScribeError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(wrap)?;
    file.write_all(content.as_bytes()).map_err(wrap)?;
    file.flush().map_err(wrap)
}
