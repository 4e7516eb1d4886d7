//! Local documentation trees

use crate::common::{fast_config, fixed_time, read};
use std::fs;
use sumi_scribe::{GenerateRequest, Generator};

#[tokio::test]
async fn test_local_directory_two_files() {
    let docs = tempfile::tempdir().unwrap();
    fs::write(docs.path().join("a.md"), "# Alpha\n\nFirst file.\n").unwrap();
    fs::write(docs.path().join("b.md"), "# Beta\n\nSecond file.\n").unwrap();
    let out = tempfile::tempdir().unwrap();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.page_count, 2);
    assert!(result.failures.is_empty());

    let titles: Vec<&str> = result.sections[0]
        .pages
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn test_local_subdirectories_become_sections() {
    let docs = tempfile::tempdir().unwrap();
    fs::create_dir_all(docs.path().join("getting-started")).unwrap();
    fs::create_dir_all(docs.path().join("reference/api")).unwrap();
    fs::write(docs.path().join("index.md"), "# Home\n\nStart here.\n").unwrap();
    fs::write(
        docs.path().join("getting-started/install.md"),
        "# Install\n\nRun the installer.\n",
    )
    .unwrap();
    fs::write(
        docs.path().join("reference/api/client.html"),
        "<html><head><title>Client</title></head><body><p>The client type.</p></body></html>",
    )
    .unwrap();
    let out = tempfile::tempdir().unwrap();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
    let result = Generator::new(fast_config())
        .with_timestamp(fixed_time())
        .generate(request)
        .await;

    assert!(result.success, "{:?}", result.error);
    let titles: Vec<&str> = result.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Getting Started", "Overview", "Reference"]);

    let full = read(&out.path().join("llms-full.txt"));
    assert!(full.contains("### [Install]("));
    assert!(full.contains("#### Install\n\nRun the installer."));
    assert!(full.contains("The client type."));
}

#[tokio::test]
async fn test_file_url_target() {
    let docs = tempfile::tempdir().unwrap();
    fs::write(docs.path().join("notes.txt"), "Plain notes about the tool.\n").unwrap();
    let out = tempfile::tempdir().unwrap();

    let target = url::Url::from_directory_path(docs.path()).unwrap();
    let request = GenerateRequest::new(target.as_str()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.page_count, 1);
    assert_eq!(result.sections[0].pages[0].title, "Notes");
}

#[tokio::test]
async fn test_empty_local_file_is_page_failure() {
    let docs = tempfile::tempdir().unwrap();
    fs::write(docs.path().join("empty.md"), "   \n\n").unwrap();
    fs::write(docs.path().join("full.md"), "# Full\n\nSomething.\n").unwrap();
    let out = tempfile::tempdir().unwrap();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(result.success);
    assert_eq!(result.page_count, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].reason, "no extractable content");
}

#[tokio::test]
async fn test_directory_without_documents_fails_run() {
    let docs = tempfile::tempdir().unwrap();
    fs::write(docs.path().join("image.png"), [0u8; 8]).unwrap();
    let out = tempfile::tempdir().unwrap();

    let request =
        GenerateRequest::new(docs.path().to_string_lossy()).with_output_directory(out.path());
    let result = Generator::new(fast_config()).generate(request).await;

    assert!(!result.success);
    assert_eq!(result.page_count, 0);
    assert!(result.output_paths.is_none());
}
