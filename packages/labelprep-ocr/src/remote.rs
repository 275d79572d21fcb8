use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::engine::{OcrEngine, OcrError, OcrInput};
use crate::region::Detection;

/// Body of the recognition endpoint's response.
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    regions: Vec<Detection>,
}

/// Client for a PaddleOCR-style recognition service.
///
/// The service accepts an encoded image as the request body on
/// `POST {base_url}/ocr` and answers with the detected regions. Inference
/// can be slow on large scans, so the request timeout is generous while the
/// connect timeout stays short.
pub struct RemoteOcrEngine {
    http_client: Client,
    base_url: String,
}

impl RemoteOcrEngine {
    /// Create a client for the service at `base_url`.
    ///
    /// # Panics
    /// If the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(120))
                .build()
                .expect("failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn recognize_bytes(&self, bytes: Vec<u8>) -> Result<Vec<Detection>, OcrError> {
        let url = format!("{}/ocr", self.base_url);
        let response = self.http_client.post(&url).body(bytes).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Service { status, body });
        }

        let parsed: RecognizeResponse = response.json().await?;
        Ok(parsed.regions)
    }
}

#[async_trait]
impl OcrEngine for RemoteOcrEngine {
    async fn recognize(&self, input: &OcrInput) -> Result<Vec<Detection>, OcrError> {
        match input {
            OcrInput::FilePath(path) => {
                let bytes = tokio::fs::read(path).await?;
                self.recognize_bytes(bytes).await
            }
            OcrInput::Bytes(bytes) => self.recognize_bytes(bytes.clone()).await,
        }
    }
}
