//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, TranslationProvider};
use crate::state::is_valid_username;
use crate::translation::{API_KEY_ENV, resolve_api_key};
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("limits.outbound_queue must be at least 1")]
    ZeroOutboundQueue,
    #[error("translation.timeout_ms must be greater than 0")]
    ZeroTranslationTimeout,
    #[error("translation.api_key is required for the google provider (or set {API_KEY_ENV})")]
    MissingApiKey,
    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("ocr.timeout_ms must be greater than 0")]
    ZeroOcrTimeout,
    #[error("ocr.height_multiplier must be a positive finite number, got {0}")]
    InvalidHeightMultiplier(f64),
    #[error("users: invalid username '{0}'")]
    InvalidUsername(String),
    #[error("users: duplicate username '{0}'")]
    DuplicateUsername(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.limits.outbound_queue == 0 {
        errors.push(ValidationError::ZeroOutboundQueue);
    }

    // Translation
    let translation = &config.translation;
    if translation.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTranslationTimeout);
    }
    if translation.provider == TranslationProvider::Google {
        if resolve_api_key(translation.api_key.as_deref()).is_none() {
            errors.push(ValidationError::MissingApiKey);
        }
        if reqwest::Url::parse(&translation.endpoint).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field: "translation.endpoint",
                value: translation.endpoint.clone(),
            });
        }
    }

    // OCR
    let ocr = &config.ocr;
    if let Some(endpoint) = &ocr.endpoint
        && reqwest::Url::parse(endpoint).is_err()
    {
        errors.push(ValidationError::InvalidUrl {
            field: "ocr.endpoint",
            value: endpoint.clone(),
        });
    }
    if ocr.timeout_ms == 0 {
        errors.push(ValidationError::ZeroOcrTimeout);
    }
    if !ocr.height_multiplier.is_finite() || ocr.height_multiplier <= 0.0 {
        errors.push(ValidationError::InvalidHeightMultiplier(ocr.height_multiplier));
    }

    // Seeded users
    let mut seen = HashSet::new();
    for user in &config.users {
        if !is_valid_username(&user.username) {
            errors.push(ValidationError::InvalidUsername(user.username.clone()));
        } else if !seen.insert(user.username.as_str()) {
            errors.push(ValidationError::DuplicateUsername(user.username.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
