//! HTTP adapter for an external OCR service.
//!
//! The service receives the raw image as the request body and answers with
//! a JSON array of `[quad, text, confidence]` triples.

use super::{Detection, OcrEngine, OcrError};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

/// OCR engine reached over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteOcrEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOcrEngine {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("polyglot-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl OcrEngine for RemoteOcrEngine {
    async fn detect(&self, image: Bytes) -> Result<Vec<Detection>, OcrError> {
        let size = image.len();
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let detections: Vec<Detection> = response
            .json()
            .await
            .map_err(|e| OcrError::Malformed(e.to_string()))?;

        debug!(bytes = size, detections = detections.len(), "OCR engine answered");
        Ok(detections)
    }
}
