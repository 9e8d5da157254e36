//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use crate::state::Language;

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "polyglot".to_string()
}

/// Senders missing from the directory are read as this language.
pub fn default_fallback_language() -> Language {
    Language::English
}

// =============================================================================
// Limit Defaults
// =============================================================================

pub fn default_outbound_queue() -> usize {
    crate::state::DEFAULT_OUTBOUND_QUEUE
}

pub fn default_idle_timeout() -> u64 {
    300
}

pub fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

// =============================================================================
// Translation Defaults
// =============================================================================

pub fn default_translation_endpoint() -> String {
    crate::translation::DEFAULT_ENDPOINT.to_string()
}

pub fn default_translation_timeout_ms() -> u64 {
    5_000
}

// =============================================================================
// OCR Defaults
// =============================================================================

pub fn default_ocr_timeout_ms() -> u64 {
    30_000
}

pub fn default_height_multiplier() -> f64 {
    crate::ocr::DEFAULT_HEIGHT_MULTIPLIER
}
