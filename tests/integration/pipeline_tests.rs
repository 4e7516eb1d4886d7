//! Whole-run properties: determinism, write failures, cancellation, JSON

use crate::common::{fast_config, fixed_time, read};
use std::fs;
use sumi_scribe::{generate, GenerateRequest, Generator};
use tokio_util::sync::CancellationToken;

fn sample_tree() -> tempfile::TempDir {
    let docs = tempfile::tempdir().unwrap();
    fs::create_dir_all(docs.path().join("guide")).unwrap();
    fs::write(docs.path().join("README.md"), "# Project\n\nAn example project.\n").unwrap();
    fs::write(
        docs.path().join("guide/usage.md"),
        "# Usage\n\nCall `run` with a [target].\n\n## Options\n\nSee below.\n",
    )
    .unwrap();
    docs
}

#[tokio::test]
async fn test_output_is_deterministic() {
    let docs = sample_tree();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let generator = Generator::new(fast_config()).with_timestamp(fixed_time());

    for out in [&first, &second] {
        let request =
            GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
        assert!(generator.generate(request).await.success);
    }

    for name in ["llms.txt", "llms-full.txt", "documentation_data.json"] {
        assert_eq!(
            read(&first.path().join(name)),
            read(&second.path().join(name)),
            "{name} differs between runs"
        );
    }
}

#[tokio::test]
async fn test_write_failure_keeps_sections() {
    let docs = sample_tree();
    let scratch = tempfile::tempdir().unwrap();
    let blocker = scratch.path().join("occupied");
    fs::write(&blocker, "a file where the output directory should go").unwrap();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(&blocker);
    let result = generate(fast_config(), request).await;

    assert!(!result.success);
    assert!(result.error.is_some());
    assert!(result.output_paths.is_none());
    assert_eq!(result.page_count, 2);
    assert!(!result.sections.is_empty());
}

#[tokio::test]
async fn test_cancelled_run_still_writes_artifacts() {
    let docs = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
    let result = Generator::new(fast_config())
        .with_cancellation(cancel)
        .generate(request)
        .await;

    assert!(result.success);
    assert_eq!(result.page_count, 0);
    assert_eq!(result.failures.len(), 2);
    assert!(result.failures.iter().all(|f| f.reason == "cancelled"));
    assert!(out.path().join("llms.txt").exists());
}

#[tokio::test]
async fn test_json_artifact_matches_result() {
    let docs = sample_tree();
    let out = tempfile::tempdir().unwrap();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
    let result = Generator::new(fast_config())
        .with_timestamp(fixed_time())
        .generate(request)
        .await;
    let paths = result.output_paths.clone().unwrap();

    let json: serde_json::Value = serde_json::from_str(&read(&paths.json)).unwrap();
    assert_eq!(json["pageCount"], result.page_count);
    assert_eq!(json["generatedAt"], "2024-06-01T09:30:00Z");
    assert_eq!(json["sections"][0]["title"], "Overview");
    assert_eq!(json["sections"][1]["pages"][0]["title"], "Usage");
    assert_eq!(json["sections"][1]["pages"][0]["source"], "local_file");

    let summary = read(&paths.summary);
    assert!(summary.ends_with('\n') && !summary.ends_with("\n\n"));

    let full = read(&paths.full);
    assert!(full.contains("#### Usage"));
    assert!(full.contains("##### Options"));
}

#[tokio::test]
async fn test_result_serializes_camel_case() {
    let docs = sample_tree();
    let out = tempfile::tempdir().unwrap();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
    let result = generate(fast_config(), request).await;

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["pageCount"], 2);
    assert!(value["outputPaths"]["summary"].is_string());
    assert!(value.get("error").is_none());
}
