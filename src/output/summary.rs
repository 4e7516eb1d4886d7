//! `llms.txt`: the link index

use crate::aggregate::Aggregation;
use crate::output::traits::{OutputResult, Renderer, SiteInfo};
use crate::output::{escape_link_text, header_blocks};

pub const SUMMARY_FILE: &str = "llms.txt";

/// Renders one link line per page, grouped by section
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRenderer;

impl Renderer for SummaryRenderer {
    fn file_name(&self) -> &'static str {
        SUMMARY_FILE
    }

    fn render(&self, site: &SiteInfo, aggregation: &Aggregation) -> OutputResult<String> {
        let mut blocks = header_blocks(site);

        for section in &aggregation.sections {
            blocks.push(format!("## {}", section.title));

            let lines: Vec<String> = section
                .pages
                .iter()
                .map(|page| {
                    let link = format!("- [{}]({})", escape_link_text(&page.title), page.url);
                    if page.description.is_empty() {
                        link
                    } else {
                        format!("{}: {}", link, page.description)
                    }
                })
                .collect();
            blocks.push(lines.join("\n"));
        }

        Ok(format!("{}\n", blocks.join("\n\n")))
    }
}
