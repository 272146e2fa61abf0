//! Writing per-document download artifacts.
//!
//! Each document gets three files with identical content: `Output_N.json`
//! (the text wrapped in a one-field object), `Output_N.txt`, and
//! `Output_N.md`. `N` is the document's 1-based position in the batch.

use serde::Serialize;
use tokio::fs;

use crate::prelude::*;

/// The JSON wrapping for an exported result.
#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    ocr_result: &'a str,
}

/// Render the JSON artifact: two-space indent, UTF-8, non-ASCII characters
/// left as-is.
pub fn json_export(text: &str) -> Result<String> {
    serde_json::to_string_pretty(&JsonExport { ocr_result: text })
        .context("failed to serialize export")
}

/// Write all three artifacts for one document.
pub async fn write_exports(dir: &Path, index: usize, text: &str) -> Result<()> {
    write_artifact(dir, format!("Output_{}.json", index), json_export(text)?).await?;
    write_artifact(dir, format!("Output_{}.txt", index), text.to_owned()).await?;
    write_artifact(dir, format!("Output_{}.md", index), text.to_owned()).await
}

async fn write_artifact(dir: &Path, name: String, contents: String) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, contents)
        .await
        .with_context(|| format!("failed to write {:?}", path.display()))
}
