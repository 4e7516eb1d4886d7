//! End-of-run report printed by the CLI

use crate::generator::GenerationResult;

/// Failures listed individually before the report switches to a count
const MAX_LISTED_FAILURES: usize = 20;

/// Prints a run report to stdout in a formatted manner
pub fn print_report(result: &GenerationResult) {
    println!("=== Generation Report ===\n");

    if let Some(error) = &result.error {
        println!("Error: {}", error);
        println!();
    }

    println!("Overview:");
    println!("  Pages written: {}", result.page_count);
    println!("  Sections: {}", result.sections.len());
    println!("  Failed pages: {}", result.failures.len());
    println!("  Duplicates collapsed: {}", result.duplicates.len());
    println!();

    if !result.sections.is_empty() {
        println!("Sections:");
        for section in &result.sections {
            println!("  {}: {} pages", section.title, section.pages.len());
        }
        println!();
    }

    if !result.failures.is_empty() {
        println!("Failures:");
        for failure in result.failures.iter().take(MAX_LISTED_FAILURES) {
            println!("  {} ({})", failure.url, failure.reason);
        }
        if result.failures.len() > MAX_LISTED_FAILURES {
            println!(
                "  ... and {} more",
                result.failures.len() - MAX_LISTED_FAILURES
            );
        }
        println!();
    }

    if !result.duplicates.is_empty() {
        println!("Duplicates:");
        for duplicate in &result.duplicates {
            println!("  {} = {}", duplicate.url, duplicate.duplicate_of);
        }
        println!();
    }

    if let Some(paths) = &result.output_paths {
        println!("Output:");
        println!("  {}", paths.summary.display());
        println!("  {}", paths.full.display());
        println!("  {}", paths.json.display());
        println!();
    }

    let attempted = result.page_count + result.failures.len() + result.duplicates.len();
    let success_rate = if attempted > 0 {
        (result.page_count as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };
    println!("Success Rate: {:.1}%", success_rate);
}
