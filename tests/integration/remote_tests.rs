//! Remote sites: sitemaps, fallback crawl, robots.txt, rate limiting

use crate::common::{fast_config, html_page, mount_pages, mount_sitemap, page_urls, read};
use std::time::{Duration, Instant};
use sumi_scribe::{GenerateOptions, GenerateRequest, Generator};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_sitemap_with_one_missing_page() {
    let server = MockServer::start().await;
    let paths = ["/docs/a", "/docs/b", "/docs/c", "/guide/d", "/guide/e"];
    mount_sitemap(&server, &paths).await;
    mount_pages(&server, &["/docs/a", "/docs/b", "/guide/d", "/guide/e"]).await;
    Mock::given(method("GET"))
        .and(path("/docs/c"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.page_count, 4);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].url, format!("{}/docs/c", server.uri()));
    assert_eq!(result.failures[0].reason, "http_404");

    // every sitemap URL is accounted for exactly once
    let mut seen = page_urls(&result);
    seen.extend(result.failures.iter().map(|f| f.url.clone()));
    seen.extend(result.duplicates.iter().map(|d| d.url.clone()));
    seen.sort();
    let mut expected: Vec<String> = paths.iter().map(|p| format!("{}{}", server.uri(), p)).collect();
    expected.sort();
    assert_eq!(seen, expected);

    let titles: Vec<&str> = result.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Docs", "Guide"]);

    let summary = read(&out.path().join("llms.txt"));
    assert!(summary.contains(&format!("- [Page /docs/a]({}/docs/a): Content for /docs/a.", server.uri())));
    assert!(!summary.contains("/docs/c"));
}

#[tokio::test]
async fn test_fallback_crawl_without_sitemap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"<p>Welcome to the project.</p><a href="/docs">Documentation</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page("Docs", r#"<p>All the docs.</p><a href="/">Home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.page_count, 2);
    assert_eq!(result.sections.len(), 2);
    assert_eq!(result.sections[0].title, "Overview");
    assert_eq!(result.sections[1].title, "Docs");
    assert!(result.failures.is_empty());
}

#[tokio::test]
async fn test_unreachable_root_is_run_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(!result.success);
    assert!(result.sections.is_empty());
    assert!(result.output_paths.is_none());
    assert!(result.error.is_some());
    assert!(!out.path().join("llms.txt").exists());
}

#[tokio::test]
async fn test_robots_disallowed_pages_not_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;
    mount_sitemap(&server, &["/public", "/private/secret"]).await;
    mount_pages(&server, &["/public"]).await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html_page("Secret", "<p>hidden</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(result.success);
    assert_eq!(result.page_count, 1);
    assert_eq!(result.failures[0].reason, "robots_disallowed");
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_regex("user-agent", r"^SumiScribe/.+ \(\+https://llmstxt\.org/\)"))
        .respond_with(html_page("Home", "<p>Hello.</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.page_count, 1);
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let server = MockServer::start().await;
    let paths: Vec<String> = (0..10).map(|i| format!("/p{i}")).collect();
    let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    mount_sitemap(&server, &path_refs).await;
    mount_pages(&server, &path_refs).await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri())
        .with_output_directory(out.path())
        .with_options(GenerateOptions {
            rate_limit_ms: Some(200),
            ..Default::default()
        });

    let started = Instant::now();
    let result = Generator::new(fast_config()).generate(request).await;
    let elapsed = started.elapsed();

    assert!(result.success);
    assert_eq!(result.page_count, 10);
    assert!(
        elapsed >= Duration::from_millis(1800),
        "10 pages took only {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_run_budget_marks_slow_pages_timed_out() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["/slow1", "/slow2"]).await;
    for p in ["/slow1", "/slow2"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(
                html_page("Slow", "<p>eventually</p>").set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;
    }

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri())
        .with_output_directory(out.path())
        .with_options(GenerateOptions {
            timeout_ms: Some(1000),
            ..Default::default()
        });

    let started = Instant::now();
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(result.success);
    assert_eq!(result.page_count, 0);
    assert!(result.failures.iter().all(|f| f.reason == "timed out"));
    assert_eq!(result.failures.len(), 2);
    assert!(out.path().join("llms.txt").exists());
}

#[tokio::test]
async fn test_duplicate_content_collapsed() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["/docs/intro", "/mirror/intro"]).await;
    for p in ["/docs/intro", "/mirror/intro"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(html_page("Intro", "<p>Same words on both pages.</p>"))
            .mount(&server)
            .await;
    }

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert_eq!(result.page_count, 1);
    assert_eq!(page_urls(&result), vec![format!("{}/docs/intro", server.uri())]);
    assert_eq!(result.duplicates.len(), 1);
    assert_eq!(result.duplicates[0].url, format!("{}/mirror/intro", server.uri()));
    assert_eq!(
        result.duplicates[0].duplicate_of,
        format!("{}/docs/intro", server.uri())
    );
}

#[tokio::test]
async fn test_huge_crawl_delay_does_not_abort_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 1e30\n"))
        .mount(&server)
        .await;
    mount_sitemap(&server, &["/docs/a"]).await;
    mount_pages(&server, &["/docs/a"]).await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri())
        .with_output_directory(out.path())
        .with_options(GenerateOptions {
            timeout_ms: Some(1500),
            ..Default::default()
        });

    let started = Instant::now();
    let result = Generator::new(fast_config()).generate(request).await;

    // the capped delay still outlasts the run budget
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.page_count, 0);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].reason, "timed out");
}

#[tokio::test]
async fn test_huge_retry_after_on_robots_does_not_abort_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("retry-after", "18446744073709551615"),
        )
        .mount(&server)
        .await;
    mount_sitemap(&server, &["/docs/a"]).await;
    mount_pages(&server, &["/docs/a"]).await;

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri())
        .with_output_directory(out.path())
        .with_options(GenerateOptions {
            timeout_ms: Some(1500),
            ..Default::default()
        });

    let started = Instant::now();
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(result.page_count, 0);
}

#[tokio::test]
async fn test_exclude_patterns_skip_pages() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["/docs/a", "/blog/b", "/docs/c"]).await;
    mount_pages(&server, &["/docs/a", "/blog/b", "/docs/c"]).await;

    let mut config = fast_config();
    config.crawler.exclude_patterns = vec!["/blog/".to_string()];

    let out = tempfile::tempdir().unwrap();
    let request = GenerateRequest::new(server.uri()).with_output_directory(out.path());
    let result = Generator::new(config).generate(request).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(
        page_urls(&result),
        vec![
            format!("{}/docs/a", server.uri()),
            format!("{}/docs/c", server.uri())
        ]
    );
    assert!(!read(&out.path().join("llms.txt")).contains("/blog/b"));
}
