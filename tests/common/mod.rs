//! Integration test common infrastructure.
//!
//! Provides an in-process relay server, a WebSocket test client, and
//! deterministic stand-ins for the translation service and OCR engine.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;

use async_trait::async_trait;
use bytes::Bytes;
use polyglot_relay::ocr::{Detection, OcrEngine, OcrError};
use polyglot_relay::state::{InMemoryDirectory, Language, User};
use polyglot_relay::translation::{ServiceError, TranslationService};
use std::sync::Arc;
use std::time::Duration;

/// Prefixes every translation with the target code, e.g. `[ja] hello`.
#[allow(dead_code)]
pub struct TaggingTranslator;

#[async_trait]
impl TranslationService for TaggingTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Language,
        target: Language,
    ) -> Result<String, ServiceError> {
        Ok(format!("[{}] {}", target.code(), text))
    }
}

/// Never answers before the gateway gives up.
#[allow(dead_code)]
pub struct StalledTranslator;

#[async_trait]
impl TranslationService for StalledTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: Language,
        _target: Language,
    ) -> Result<String, ServiceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(ServiceError::Malformed("unreachable".into()))
    }
}

/// Returns a fixed set of detections for any image.
#[allow(dead_code)]
pub struct FixedOcr(pub Vec<Detection>);

#[async_trait]
impl OcrEngine for FixedOcr {
    async fn detect(&self, _image: Bytes) -> Result<Vec<Detection>, OcrError> {
        Ok(self.0.clone())
    }
}

/// alice (English), bob (Japanese), carol (English).
#[allow(dead_code)]
pub fn demo_directory() -> Arc<InMemoryDirectory> {
    let users = [
        User::new("alice", Language::English),
        User::new("bob", Language::Japanese),
        User::new("carol", Language::English),
    ];
    Arc::new(InMemoryDirectory::with_users(users).expect("demo users are valid"))
}
