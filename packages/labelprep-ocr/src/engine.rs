use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::region::Detection;

/// An image handed to an engine: a path on disk, or already-encoded bytes.
#[derive(Debug, Clone)]
pub enum OcrInput {
    FilePath(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("recognition service returned {status}: {body}")]
    Service {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// The narrow seam to the OCR collaborator: one call per image, returning
/// regions in detection order. Engines are stateless across calls, so a
/// single instance is shared for a whole run.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, input: &OcrInput) -> Result<Vec<Detection>, OcrError>;
}
