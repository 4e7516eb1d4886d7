//! Shared fixtures

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use sumi_scribe::{Config, GenerationResult};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Defaults with no spacing or retries, so tests run quickly
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.crawler.rate_limit_ms = 0;
    config.crawler.max_retries = 0;
    config.crawler.timeout_ms = 30_000;
    config
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

pub fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{title}</title></head><body><main>{body}</main></body></html>"
        ))
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Serves a `<urlset>` listing `paths` at `/sitemap.xml`
pub async fn mount_sitemap(server: &MockServer, paths: &[&str]) {
    let entries: String = paths
        .iter()
        .map(|p| format!("<url><loc>{}{}</loc></url>", server.uri(), p))
        .collect();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#
                ))
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

/// Serves a distinct HTML page at each of `paths`
pub async fn mount_pages(server: &MockServer, paths: &[&str]) {
    for p in paths {
        Mock::given(method("GET"))
            .and(path(*p))
            .respond_with(html_page(
                &format!("Page {p}"),
                &format!("<h1>Page {p}</h1><p>Content for {p}.</p>"),
            ))
            .mount(server)
            .await;
    }
}

pub fn page_urls(result: &GenerationResult) -> Vec<String> {
    result
        .sections
        .iter()
        .flat_map(|s| s.pages.iter().map(|p| p.url.clone()))
        .collect()
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
