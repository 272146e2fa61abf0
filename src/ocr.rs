//! Client for the Mistral OCR API.
//!
//! The pipeline talks to the service through the [`OcrService`] trait, so
//! tests can substitute a canned implementation without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{data_url::parse_data_url, prelude::*};

/// The OCR model we use unless told otherwise.
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

/// Default API server URL. Override with `MISTRAL_API_BASE`.
const DEFAULT_API_BASE: &str = "https://api.mistral.ai/v1";

/// A document to OCR, in the API's wire format. The URL may be a real remote
/// URL or a `data:` URI embedding the document itself.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentDescriptor {
    /// A PDF document.
    DocumentUrl { document_url: String },
    /// An image.
    ImageUrl { image_url: String },
}

impl DocumentDescriptor {
    /// The URL value, whichever variant we are.
    pub fn url(&self) -> &str {
        match self {
            DocumentDescriptor::DocumentUrl { document_url } => document_url,
            DocumentDescriptor::ImageUrl { image_url } => image_url,
        }
    }

    /// A short description for logs. Embedded documents are summarized
    /// instead of printing kilobytes of Base64.
    pub fn log_summary(&self) -> String {
        match parse_data_url(self.url()) {
            Some((mime_type, payload)) => {
                format!("embedded {} ({} bytes of base64)", mime_type, payload.len())
            }
            None => self.url().to_owned(),
        }
    }
}

/// Request body for the OCR endpoint.
#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: &'a DocumentDescriptor,
    include_image_base64: bool,
}

/// One page of OCR output.
#[derive(Debug, Deserialize)]
pub struct OcrPage {
    /// Zero-based page number.
    #[serde(default)]
    pub index: u32,
    /// The extracted text, as markdown.
    pub markdown: String,
}

/// An OCR response, as one typed union covering the shapes the service has
/// been seen to return: an object with a `pages` array, a bare array of
/// pages, or something else entirely.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OcrResponse {
    /// The documented shape.
    Document { pages: Vec<OcrPage> },
    /// A bare page array.
    Pages(Vec<OcrPage>),
    /// Anything we don't recognize. Treated as "no pages" rather than a
    /// fault.
    Other(serde_json::Value),
}

impl OcrResponse {
    /// Normalize all response shapes into a single page list.
    pub fn into_pages(self) -> Vec<OcrPage> {
        match self {
            OcrResponse::Document { pages } => pages,
            OcrResponse::Pages(pages) => pages,
            OcrResponse::Other(value) => {
                warn!("unrecognized OCR response shape: {}", value);
                Vec::new()
            }
        }
    }
}

/// The remote call the pipeline makes once per document.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// OCR a single document, returning the raw response.
    async fn process(
        &self,
        document: &DocumentDescriptor,
        include_image_base64: bool,
    ) -> Result<OcrResponse>;
}

/// The real client.
pub struct MistralClient {
    api_key: String,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl MistralClient {
    /// Create a client from `MISTRAL_API_KEY` and (optionally)
    /// `MISTRAL_API_BASE`. Fails fast if the key is missing, before any
    /// document is touched.
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var("MISTRAL_API_KEY")
            .map_err(|_| anyhow!("MISTRAL_API_KEY is not set"))?;
        let api_base = std::env::var("MISTRAL_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_owned());
        Ok(Self {
            api_key,
            api_base,
            model: model.to_owned(),
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl OcrService for MistralClient {
    async fn process(
        &self,
        document: &DocumentDescriptor,
        include_image_base64: bool,
    ) -> Result<OcrResponse> {
        let body = OcrRequest {
            model: &self.model,
            document,
            include_image_base64,
        };

        let resp = self
            .client
            .post(format!("{}/ocr", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call OCR API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("OCR API error ({}): {}", status, text);
        }

        let raw = resp.text().await.context("failed to read OCR response")?;
        // Log a bounded prefix, respecting character boundaries.
        let cut = raw
            .char_indices()
            .nth(500)
            .map(|(i, _)| i)
            .unwrap_or(raw.len());
        debug!("OCR response ({} bytes): {}", raw.len(), &raw[..cut]);
        serde_json::from_str(&raw).context("failed to parse OCR response")
    }
}
