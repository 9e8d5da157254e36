//! Shared relay state.
//!
//! [`Hub`] bundles the user directory, room registry, message router,
//! translation gateway and OCR engine. One `Arc<Hub>` is handed to every
//! connection and HTTP handler; nothing here is process-global.

mod directory;
mod language;
mod rooms;

pub use directory::{
    DirectoryError, InMemoryDirectory, MAX_USERNAME_LEN, User, UserDirectory, is_valid_username,
};
pub use language::{Language, UnknownLanguage};
pub use rooms::{DeliveryOutcome, Outbound, RoomRegistry};

use crate::config::{Config, TranslationProvider};
use crate::handlers::MessageRouter;
use crate::ocr::{DEFAULT_HEIGHT_MULTIPLIER, OcrEngine, RemoteOcrEngine};
use crate::translation::{
    API_KEY_ENV, GoogleTranslateProvider, PassthroughTranslator, TranslationGateway,
    TranslationService, resolve_api_key,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default per-connection outbound queue length.
pub const DEFAULT_OUTBOUND_QUEUE: usize = 256;

/// Default translation timeout.
pub const DEFAULT_TRANSLATION_TIMEOUT: Duration = Duration::from_secs(5);

/// The relay's service objects.
pub struct Hub {
    pub directory: Arc<InMemoryDirectory>,
    pub rooms: Arc<RoomRegistry>,
    pub router: MessageRouter,
    pub gateway: TranslationGateway,
    pub ocr: Option<Arc<dyn OcrEngine>>,
    pub height_multiplier: f64,
    pub outbound_queue: usize,
}

impl Hub {
    pub fn builder() -> HubBuilder {
        HubBuilder::default()
    }

    /// Wire up a hub from the loaded configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let directory = InMemoryDirectory::with_users(
            config
                .users
                .iter()
                .map(|u| User::new(u.username.clone(), u.language)),
        )?;
        info!(count = directory.len(), "Seeded user directory");

        let translation = &config.translation;
        let timeout = Duration::from_millis(translation.timeout_ms);
        let translator: Arc<dyn TranslationService> = match translation.provider {
            TranslationProvider::Google => {
                let api_key = resolve_api_key(translation.api_key.as_deref())
                    .ok_or_else(|| {
                        anyhow::anyhow!("translation.api_key is not set and {API_KEY_ENV} is empty")
                    })?;
                info!(endpoint = %translation.endpoint, "Using Google Translate provider");
                Arc::new(GoogleTranslateProvider::new(
                    translation.endpoint.clone(),
                    api_key,
                    timeout,
                )?)
            }
            TranslationProvider::None => {
                info!("Translation disabled, messages pass through untranslated");
                Arc::new(PassthroughTranslator)
            }
        };

        let mut builder = Hub::builder()
            .directory(Arc::new(directory))
            .translator(translator, timeout)
            .fallback_language(config.server.fallback_language)
            .outbound_queue(config.limits.outbound_queue)
            .height_multiplier(config.ocr.height_multiplier);

        if let Some(endpoint) = &config.ocr.endpoint {
            info!(%endpoint, "Using remote OCR engine");
            let engine = RemoteOcrEngine::new(
                endpoint.clone(),
                Duration::from_millis(config.ocr.timeout_ms),
            )?;
            builder = builder.ocr(Arc::new(engine));
        } else {
            info!("No OCR endpoint configured, handwriting uploads disabled");
        }

        Ok(builder.build())
    }
}

/// Builder for [`Hub`]; every part has a usable default.
pub struct HubBuilder {
    directory: Arc<InMemoryDirectory>,
    translator: Arc<dyn TranslationService>,
    translation_timeout: Duration,
    fallback_language: Language,
    ocr: Option<Arc<dyn OcrEngine>>,
    height_multiplier: f64,
    outbound_queue: usize,
}

impl Default for HubBuilder {
    fn default() -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::new()),
            translator: Arc::new(PassthroughTranslator),
            translation_timeout: DEFAULT_TRANSLATION_TIMEOUT,
            fallback_language: Language::English,
            ocr: None,
            height_multiplier: DEFAULT_HEIGHT_MULTIPLIER,
            outbound_queue: DEFAULT_OUTBOUND_QUEUE,
        }
    }
}

impl HubBuilder {
    pub fn directory(mut self, directory: Arc<InMemoryDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn translator(mut self, translator: Arc<dyn TranslationService>, timeout: Duration) -> Self {
        self.translator = translator;
        self.translation_timeout = timeout;
        self
    }

    pub fn fallback_language(mut self, language: Language) -> Self {
        self.fallback_language = language;
        self
    }

    pub fn ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    pub fn height_multiplier(mut self, multiplier: f64) -> Self {
        self.height_multiplier = multiplier;
        self
    }

    pub fn outbound_queue(mut self, len: usize) -> Self {
        self.outbound_queue = len.max(1);
        self
    }

    pub fn build(self) -> Hub {
        let rooms = Arc::new(RoomRegistry::new());
        let gateway = TranslationGateway::new(self.translator, self.translation_timeout);
        let directory: Arc<dyn UserDirectory> = self.directory.clone();
        let router = MessageRouter::new(
            directory,
            Arc::clone(&rooms),
            gateway.clone(),
            self.fallback_language,
        );

        Hub {
            directory: self.directory,
            rooms,
            router,
            gateway,
            ocr: self.ocr,
            height_multiplier: self.height_multiplier,
            outbound_queue: self.outbound_queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml_src: &str) -> Config {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn from_config_seeds_directory_and_disables_ocr() {
        let config = config(
            r#"
            [server]
            name = "test"
            fallback_language = "Japanese"

            [listen]
            address = "127.0.0.1:0"

            [translation]
            provider = "none"

            [[users]]
            username = "alice"
            language = "English"

            [[users]]
            username = "bob"
            language = "ja"
            "#,
        );

        let hub = Hub::from_config(&config).unwrap();
        assert_eq!(hub.directory.len(), 2);
        assert_eq!(
            hub.directory.find_by_username("bob").map(|u| u.language),
            Some(Language::Japanese)
        );
        assert!(hub.ocr.is_none());
        assert_eq!(hub.height_multiplier, DEFAULT_HEIGHT_MULTIPLIER);
    }

    #[test]
    fn from_config_rejects_duplicate_users() {
        let config = config(
            r#"
            [server]
            name = "test"

            [listen]
            address = "127.0.0.1:0"

            [translation]
            provider = "none"

            [[users]]
            username = "alice"
            language = "English"

            [[users]]
            username = "alice"
            language = "Japanese"
            "#,
        );

        assert!(Hub::from_config(&config).is_err());
    }

    #[test]
    fn builder_clamps_queue() {
        let hub = Hub::builder().outbound_queue(0).build();
        assert_eq!(hub.outbound_queue, 1);
    }
}
