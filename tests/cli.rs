//! CLI test cases.
//!
//! Everything here runs without a network: we exercise the argument surface,
//! the validation that happens before any remote call, and the schema
//! output. Tests that talk to the real OCR API are `#[ignore]`d and need
//! `MISTRAL_API_KEY` set.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

/// Create a new `Command` with our binary.
fn cmd() -> Command {
    Command::cargo_bin("ocr-batch").unwrap()
}

/// A `process` command that cannot accidentally pick up real credentials or
/// a stray `.env` file.
fn process_cmd(dir: &tempfile::TempDir) -> Command {
    let mut cmd = cmd();
    cmd.current_dir(dir.path())
        .env("MISTRAL_API_KEY", "test-key")
        .arg("process");
    cmd
}

#[test]
fn test_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn schema_prints_valid_json() {
    let output = cmd().arg("schema").assert().success().get_output().clone();
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let properties = &schema["properties"];
    for field in ["index", "source", "status", "direction", "preview", "text"] {
        assert!(
            !properties[field].is_null(),
            "schema is missing field {:?}",
            field
        );
    }
}

#[test]
fn process_requires_an_api_key() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("doc.pdf"), b"%PDF-1.4").unwrap();
    cmd()
        .current_dir(dir.path())
        .env_remove("MISTRAL_API_KEY")
        .arg("process")
        .arg("doc.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MISTRAL_API_KEY"));
}

#[test]
fn process_requires_at_least_one_file() {
    let dir = tempfile::tempdir().unwrap();
    process_cmd(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one file"));
}

#[test]
fn process_requires_a_nonblank_url_list() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("urls.txt"), "\n  \n").unwrap();
    process_cmd(&dir)
        .arg("--url-list")
        .arg("urls.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one URL"));
}

#[test]
fn process_rejects_unsupported_file_types() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    process_cmd(&dir)
        .arg("notes.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file type"));
}

#[test]
fn process_rejects_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    process_cmd(&dir)
        .arg("missing.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn url_list_conflicts_with_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("urls.txt"), "https://x/doc.pdf").unwrap();
    std::fs::write(dir.path().join("doc.pdf"), b"%PDF-1.4").unwrap();
    process_cmd(&dir)
        .arg("--url-list")
        .arg("urls.txt")
        .arg("doc.pdf")
        .assert()
        .failure();
}

#[test]
#[ignore = "Talks to the real Mistral OCR API"]
fn process_url_batch_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("urls.txt"),
        "https://arxiv.org/pdf/2201.04234\n",
    )
    .unwrap();
    let output = cmd()
        .current_dir(dir.path())
        .arg("process")
        .arg("--url-list")
        .arg("urls.txt")
        .arg("--export-dir")
        .arg("out")
        .assert()
        .success()
        .get_output()
        .clone();
    let record: serde_json::Value =
        serde_json::from_slice(output.stdout.split(|&b| b == b'\n').next().unwrap())
            .unwrap();
    assert_eq!(record["index"], 1);
    assert!(dir.path().join("out/Output_1.json").exists());
    assert!(dir.path().join("out/Output_1.txt").exists());
    assert!(dir.path().join("out/Output_1.md").exists());
}
