//! Machine translation.
//!
//! [`TranslationService`] is the seam to an external translator. The router
//! never talks to a service directly; it goes through
//! [`TranslationGateway`], which bounds every call with a timeout and turns
//! any failure into pass-through of the original text.

mod gateway;
mod google;

pub use gateway::TranslationGateway;
pub use google::{API_KEY_ENV, DEFAULT_ENDPOINT, GoogleTranslateProvider, resolve_api_key};

use crate::state::Language;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a translation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl ServiceError {
    /// Static error code for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// An external machine translator.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, ServiceError>;
}

/// Translator used when no backend is configured: returns text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl TranslationService for PassthroughTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Language,
        _target: Language,
    ) -> Result<String, ServiceError> {
        Ok(text.to_string())
    }
}
