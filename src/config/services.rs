//! External service configuration: translation backend and OCR engine.

use super::defaults::{
    default_height_multiplier, default_ocr_timeout_ms, default_translation_endpoint,
    default_translation_timeout_ms,
};
use serde::Deserialize;

/// Which translation backend to use.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// No backend: every message passes through untranslated.
    #[default]
    None,
    /// Google Translate v2 compatible HTTP API.
    Google,
}

/// Translation backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub provider: TranslationProvider,
    /// API endpoint (Google provider only).
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,
    /// API key. Falls back to the GOOGLE_TRANSLATE_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Upper bound for one translation, in milliseconds.
    /// Expiry delivers the original text.
    #[serde(default = "default_translation_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            endpoint: default_translation_endpoint(),
            api_key: None,
            timeout_ms: default_translation_timeout_ms(),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Recognizer endpoint. Uploads are refused when unset.
    pub endpoint: Option<String>,
    #[serde(default = "default_ocr_timeout_ms")]
    pub timeout_ms: u64,
    /// Line clustering tolerance, as a fraction of the line height.
    #[serde(default = "default_height_multiplier")]
    pub height_multiplier: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_ocr_timeout_ms(),
            height_multiplier: default_height_multiplier(),
        }
    }
}
