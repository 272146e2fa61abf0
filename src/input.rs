//! Gathering the documents to process.
//!
//! A batch is either a list of URLs (one per line of a text block) or a list
//! of local files read into memory. Everything here runs before the first
//! remote call, so bad input fails the run instead of burning API quota.

use clap::ValueEnum;
use tokio::fs;

use crate::prelude::*;

/// What kind of document are we sending to the OCR service?
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum DocumentKind {
    /// PDF documents.
    Pdf,
    /// Images (JPEG or PNG).
    Image,
}

impl DocumentKind {
    /// File extensions we accept for local uploads.
    fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Pdf => &["pdf"],
            DocumentKind::Image => &["jpg", "jpeg", "png"],
        }
    }
}

/// One document to process, as supplied by the user.
#[derive(Clone, Debug)]
pub enum InputSource {
    /// A remote URL, untrimmed. Blank entries are legal here; whether they
    /// were filtered out is the batch builder's business.
    Url(String),

    /// A local file read into memory.
    Upload {
        /// Display name (the file name), for logs and output records.
        name: String,
        /// Raw file contents.
        data: Vec<u8>,
        /// Declared MIME type. Always `application/pdf` for PDFs; detected
        /// for images.
        mime_type: String,
    },
}

impl InputSource {
    /// A short label identifying this source in logs and output records.
    pub fn label(&self) -> &str {
        match self {
            InputSource::Url(url) => url,
            InputSource::Upload { name, .. } => name,
        }
    }
}

/// Split a block of text into one URL per line.
///
/// Blank lines are kept verbatim unless `skip_blanks` is set: each line is
/// one work item, valid or not, and the service gets to reject the empty
/// ones. A single trailing newline is stripped first so a text file ending
/// in `\n` does not grow a phantom final item.
pub fn url_batch(text: &str, skip_blanks: bool) -> Result<Vec<InputSource>> {
    if text.trim().is_empty() {
        bail!("please provide at least one URL");
    }
    let text = text.strip_suffix('\n').unwrap_or(text);
    let batch = text
        .split('\n')
        .filter(|line| !skip_blanks || !line.trim().is_empty())
        .map(|line| InputSource::Url(line.to_owned()))
        .collect();
    Ok(batch)
}

/// Read a batch of local files into memory.
pub async fn upload_batch(
    kind: DocumentKind,
    paths: &[PathBuf],
) -> Result<Vec<InputSource>> {
    if paths.is_empty() {
        bail!("please provide at least one file to upload");
    }
    let mut batch = Vec::with_capacity(paths.len());
    for path in paths {
        batch.push(read_upload(kind, path).await?);
    }
    Ok(batch)
}

/// Read a single local file, checking its extension against the allowed list
/// for `kind` and attaching a declared MIME type.
async fn read_upload(kind: DocumentKind, path: &Path) -> Result<InputSource> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !kind.allowed_extensions().contains(&extension.as_str()) {
        bail!(
            "unsupported file type {:?} (expected one of {:?})",
            path.display(),
            kind.allowed_extensions(),
        );
    }

    let data = fs::read(path)
        .await
        .with_context(|| format!("failed to read {:?}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = match kind {
        DocumentKind::Pdf => "application/pdf".to_owned(),
        DocumentKind::Image => image_mime_type(path, &data),
    };
    Ok(InputSource::Upload {
        name,
        data,
        mime_type,
    })
}

/// Get the MIME type of an image file, preferring the extension and falling
/// back to content sniffing for misnamed files.
fn image_mime_type(path: &Path, data: &[u8]) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .map(str::to_owned)
        .or_else(|| infer::get(data).map(|kind| kind.mime_type().to_owned()))
        .unwrap_or_else(|| "application/octet-stream".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_batch_keeps_blank_lines_verbatim() {
        let batch = url_batch("https://x/a.pdf\n\nhttps://x/b.pdf", false).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[1].label(), "");
    }

    #[test]
    fn url_batch_can_skip_blank_lines() {
        let batch = url_batch("https://x/a.pdf\n\nhttps://x/b.pdf", true).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].label(), "https://x/b.pdf");
    }

    #[test]
    fn url_batch_strips_one_trailing_newline() {
        let batch = url_batch("https://x/a.pdf\nhttps://x/b.pdf\n", false).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn url_batch_rejects_blank_text() {
        assert!(url_batch("", false).is_err());
        assert!(url_batch("  \n \n", false).is_err());
    }

    #[tokio::test]
    async fn upload_batch_rejects_empty_list() {
        assert!(upload_batch(DocumentKind::Pdf, &[]).await.is_err());
    }

    #[tokio::test]
    async fn upload_batch_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        let result = upload_batch(DocumentKind::Pdf, &[path]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn upload_batch_reads_pdf_with_fixed_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let batch = upload_batch(DocumentKind::Pdf, &[path]).await.unwrap();
        match &batch[0] {
            InputSource::Upload {
                name,
                data,
                mime_type,
            } => {
                assert_eq!(name, "doc.pdf");
                assert_eq!(data, b"%PDF-1.4");
                assert_eq!(mime_type, "application/pdf");
            }
            other => panic!("expected upload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn upload_batch_detects_image_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [0x89, 0x50, 0x4e, 0x47]).unwrap();
        let batch = upload_batch(DocumentKind::Image, &[path]).await.unwrap();
        match &batch[0] {
            InputSource::Upload { mime_type, .. } => assert_eq!(mime_type, "image/png"),
            other => panic!("expected upload, got {:?}", other),
        }
    }
}
