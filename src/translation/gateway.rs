//! Translation gateway: timeout plus pass-through fallback.

use super::{ServiceError, TranslationService};
use crate::state::Language;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Wraps a [`TranslationService`]; never fails.
#[derive(Clone)]
pub struct TranslationGateway {
    service: Arc<dyn TranslationService>,
    timeout: Duration,
}

impl TranslationGateway {
    pub fn new(service: Arc<dyn TranslationService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Translate `text`, or return it unchanged if translation is not needed
    /// or not possible.
    pub async fn translate(&self, text: &str, source: Language, target: Language) -> String {
        match self.try_translate(text, source, target).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    source = source.code(),
                    target = target.code(),
                    error = %e,
                    "Translation failed, delivering original text"
                );
                text.to_string()
            }
        }
    }

    /// Like [`translate`](Self::translate) but reports the failure.
    ///
    /// Same-language and blank input never reach the service.
    pub async fn try_translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, ServiceError> {
        if source == target || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let start = Instant::now();
        let result = match tokio::time::timeout(
            self.timeout,
            self.service.translate(text, source, target),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(self.timeout)),
        };
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ServiceError::Timeout(_)) => "timeout",
            Err(_) => "failed",
        };
        crate::metrics::record_translation(outcome, elapsed.as_secs_f64());
        debug!(
            source = source.code(),
            target = target.code(),
            outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "Translation finished"
        );

        result
    }
}
