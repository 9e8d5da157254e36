//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, UserSeed)
//! - [`listen`]: Listener and per-connection limits (ListenConfig, LimitsConfig)
//! - [`services`]: Translation backend and OCR engine (TranslationConfig, OcrConfig)
//! - [`validation`]: Startup checks

mod defaults;
mod listen;
mod services;
mod types;
mod validation;

pub use listen::{LimitsConfig, ListenConfig};
pub use services::{OcrConfig, TranslationConfig, TranslationProvider};
pub use types::{Config, ConfigError, LogFormat, ServerConfig, UserSeed};
pub use validation::{ValidationError, validate};
