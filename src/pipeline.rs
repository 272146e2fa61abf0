//! The document pipeline.
//!
//! Takes an ordered batch of [`InputSource`]s and produces exactly one
//! [`DocumentRecord`] per input, in input order. A failed document becomes a
//! failure record; it never aborts the batch. The pipeline owns no state of
//! its own — everything it needs comes in as arguments, and everything it
//! produces goes out in the return value.

use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    data_url::data_url,
    direction::{TextDirection, detect_direction},
    input::{DocumentKind, InputSource},
    ocr::{DocumentDescriptor, OcrService},
    prelude::*,
    throttle::Throttle,
};

/// Placeholder text for a response with no extracted text at all.
pub const NO_RESULT_TEXT: &str = "No result found.";

/// Options controlling a pipeline run.
#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    /// What kind of document the batch contains.
    pub kind: DocumentKind,

    /// Ask the service to embed page images in the response.
    pub include_image_base64: bool,
}

impl PipelineOptions {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            include_image_base64: true,
        }
    }
}

/// The per-document result: either extracted text, or a displayable error
/// message. A `Failure` is a terminal value, not something to re-raise.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OcrOutcome {
    Success(String),
    Failure(String),
}

impl OcrOutcome {
    /// The displayable text of this outcome, whatever its status.
    pub fn text(&self) -> &str {
        match self {
            OcrOutcome::Success(text) => text,
            OcrOutcome::Failure(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OcrOutcome::Success(_))
    }
}

/// What a viewer should render for a document, as opposed to what the
/// service was asked to OCR. Usually the same string; for uploaded images we
/// also keep the raw bytes so a renderer need not decode the data URI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Preview {
    /// URL or `data:` URI to display.
    pub src: String,

    /// Raw bytes of an uploaded image.
    pub image_bytes: Option<Vec<u8>>,
}

/// One fully-processed document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocumentRecord {
    /// Short label for the input (its URL or file name).
    pub source: String,

    /// The OCR outcome.
    pub outcome: OcrOutcome,

    /// What to render for this document.
    pub preview: Preview,

    /// Display direction of the outcome text.
    pub direction: TextDirection,
}

impl DocumentRecord {
    /// Convert to the serializable output record. `index` is 1-based, to
    /// match the `Output_N` export file names.
    pub fn to_output(&self, index: usize) -> DocumentOutput {
        DocumentOutput {
            index,
            source: self.source.clone(),
            status: if self.outcome.is_success() {
                OutcomeStatus::Ok
            } else {
                OutcomeStatus::Failed
            },
            direction: self.direction,
            preview: self.preview.src.clone(),
            text: self.outcome.text().to_owned(),
        }
    }
}

/// Status of an output record.
#[derive(Clone, Copy, Debug, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The document was OCRed.
    Ok,
    /// The remote call failed; `text` holds the error message.
    Failed,
}

/// An output record describing one processed document.
#[derive(Clone, Debug, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DocumentOutput {
    /// 1-based position of the document in the batch.
    pub index: usize,

    /// The URL or file name the document came from.
    pub source: String,

    /// Did the remote call succeed?
    pub status: OutcomeStatus,

    /// Display direction of `text`.
    pub direction: TextDirection,

    /// URL or `data:` URI suitable for rendering the document.
    pub preview: String,

    /// The extracted text, or the error message for failed documents.
    pub text: String,
}

/// Build the request descriptor and preview for one input. Pure; does no
/// I/O.
pub fn build_descriptor(
    kind: DocumentKind,
    source: &InputSource,
) -> (DocumentDescriptor, Preview) {
    match (kind, source) {
        (DocumentKind::Pdf, InputSource::Url(url)) => {
            let url = url.trim().to_owned();
            (
                DocumentDescriptor::DocumentUrl {
                    document_url: url.clone(),
                },
                Preview {
                    src: url,
                    image_bytes: None,
                },
            )
        }
        (DocumentKind::Pdf, InputSource::Upload { data, .. }) => {
            let url = data_url("application/pdf", data);
            (
                DocumentDescriptor::DocumentUrl {
                    document_url: url.clone(),
                },
                Preview {
                    src: url,
                    image_bytes: None,
                },
            )
        }
        (DocumentKind::Image, InputSource::Url(url)) => {
            let url = url.trim().to_owned();
            (
                DocumentDescriptor::ImageUrl {
                    image_url: url.clone(),
                },
                Preview {
                    src: url,
                    image_bytes: None,
                },
            )
        }
        (DocumentKind::Image, InputSource::Upload {
            data, mime_type, ..
        }) => {
            let url = data_url(mime_type, data);
            (
                DocumentDescriptor::ImageUrl {
                    image_url: url.clone(),
                },
                Preview {
                    src: url,
                    image_bytes: Some(data.clone()),
                },
            )
        }
    }
}

/// OCR a batch of documents, strictly in order, one remote call at a time.
///
/// Always returns one record per input. `on_progress` is called with
/// `(done, total)` after each document completes.
pub async fn process_batch(
    service: &dyn OcrService,
    throttle: &Throttle,
    opts: &PipelineOptions,
    batch: &[InputSource],
    mut on_progress: impl FnMut(usize, usize),
) -> Vec<DocumentRecord> {
    let total = batch.len();
    let mut records = Vec::with_capacity(total);
    for (idx, source) in batch.iter().enumerate() {
        info!("processing document {} of {}", idx + 1, total);
        let (descriptor, preview) = build_descriptor(opts.kind, source);
        debug!("document {}: {}", idx + 1, descriptor.log_summary());

        throttle.acquire().await;
        let outcome = match service
            .process(&descriptor, opts.include_image_base64)
            .await
        {
            Ok(response) => {
                let text = response
                    .into_pages()
                    .iter()
                    .map(|page| page.markdown.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                // No pages, or a single blank page, both mean "nothing
                // extracted".
                if text.is_empty() {
                    OcrOutcome::Success(NO_RESULT_TEXT.to_owned())
                } else {
                    OcrOutcome::Success(text)
                }
            }
            Err(err) => {
                warn!("document {} failed: {:#}", idx + 1, err);
                OcrOutcome::Failure(format!("Error extracting result: {:#}", err))
            }
        };

        let direction = detect_direction(outcome.text());
        records.push(DocumentRecord {
            source: source.label().to_owned(),
            outcome,
            preview,
            direction,
        });
        on_progress(idx + 1, total);
    }
    records
}
