//! `llms-full.txt`: every page's text in one document

use crate::aggregate::Aggregation;
use crate::output::traits::{OutputResult, Renderer, SiteInfo};
use crate::output::{escape_link_text, header_blocks};

pub const FULL_FILE: &str = "llms-full.txt";

/// Levels added to page headings so they nest under `### page`
const HEADING_SHIFT: usize = 3;
const MAX_HEADING_LEVEL: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct FullRenderer;

impl Renderer for FullRenderer {
    fn file_name(&self) -> &'static str {
        FULL_FILE
    }

    fn render(&self, site: &SiteInfo, aggregation: &Aggregation) -> OutputResult<String> {
        let mut blocks = header_blocks(site);

        for section in &aggregation.sections {
            blocks.push(format!("## {}", section.title));

            for page in &section.pages {
                blocks.push(format!(
                    "### [{}]({})",
                    escape_link_text(&page.title),
                    page.url
                ));
                if !page.description.is_empty() {
                    blocks.push(format!("> {}", page.description));
                }
                let body = demote_headings(page.content.trim());
                if !body.is_empty() {
                    blocks.push(body);
                }
                if let Some(raw) = &page.raw_html {
                    blocks.push(format!("```html\n{}\n```", raw.trim_end()));
                }
                blocks.push("---".to_string());
            }
        }

        Ok(format!("{}\n", blocks.join("\n\n")))
    }
}

/// Pushes Markdown headings down so they nest under the page heading
///
/// Lines inside fenced code blocks are left alone.
pub fn demote_headings(body: &str) -> String {
    let mut in_fence = false;

    body.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                return line.to_string();
            }

            let level = line.chars().take_while(|&c| c == '#').count();
            let is_heading = (1..=MAX_HEADING_LEVEL).contains(&level)
                && line[level..].starts_with(' ');
            if !is_heading {
                return line.to_string();
            }

            let new_level = (level + HEADING_SHIFT).min(MAX_HEADING_LEVEL);
            format!("{}{}", "#".repeat(new_level), &line[level..])
        })
        .collect::<Vec<_>>()
        .join("\n")
}
