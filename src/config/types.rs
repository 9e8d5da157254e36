//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_fallback_language, default_server_name};
use super::listen::{LimitsConfig, ListenConfig};
use super::services::{OcrConfig, TranslationConfig};
use crate::state::Language;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Per-connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Translation backend.
    #[serde(default)]
    pub translation: TranslationConfig,
    /// OCR engine.
    #[serde(default)]
    pub ocr: OcrConfig,
    /// Users known at startup.
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server identity and behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Language assumed for senders missing from the directory.
    #[serde(default = "default_fallback_language")]
    pub fallback_language: Language,
    /// Serve Prometheus metrics on `/metrics`.
    #[serde(default)]
    pub metrics: bool,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// A user registered at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    pub username: String,
    pub language: Language,
}
