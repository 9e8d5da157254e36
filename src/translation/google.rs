//! Google Translate v2 provider.
//!
//! Speaks the v2 JSON API:
//!
//! ```text
//! POST {endpoint}
//! X-Goog-Api-Key: {api_key}
//! {"q": "...", "source": "en", "target": "ja", "format": "text"}
//!
//! 200 {"data": {"translations": [{"translatedText": "..."}]}}
//! ```

use super::{ServiceError, TranslationService};
use crate::state::Language;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Default public endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Environment variable consulted when the config carries no key.
pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// The configured key if non-empty, else a non-empty [`API_KEY_ENV`].
pub fn resolve_api_key(configured: Option<&str>) -> Option<String> {
    pick_api_key(configured, std::env::var(API_KEY_ENV).ok())
}

fn pick_api_key(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or(from_env.filter(|k| !k.is_empty()))
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// HTTP client for a Google Translate v2 compatible endpoint.
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleTranslateProvider {
    /// Build a provider; `request_timeout` bounds the HTTP exchange itself.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("polyglot-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .finish()
    }
}

#[async_trait]
impl TranslationService for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, ServiceError> {
        let body = json!({
            "q": text,
            "source": source.code(),
            "target": target.code(),
            "format": "text",
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.without_url().to_string()))?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ServiceError::Malformed("empty translations array".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn provider(server: &MockServer) -> GoogleTranslateProvider {
        GoogleTranslateProvider::new(server.url("/v2"), "secret", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_codes_and_reads_translation() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2")
                    .header("x-goog-api-key", "secret")
                    .json_body(json!({"q": "hello", "source": "en", "target": "ja", "format": "text"}));
                then.status(200).json_body(json!({
                    "data": {"translations": [{"translatedText": "こんにちは"}]}
                }));
            })
            .await;

        let out = provider(&server)
            .translate("hello", Language::English, Language::Japanese)
            .await
            .unwrap();

        assert_eq!(out, "こんにちは");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2");
                then.status(403).body("quota exceeded");
            })
            .await;

        let err = provider(&server)
            .translate("hello", Language::English, Language::Japanese)
            .await
            .unwrap_err();

        match err {
            ServiceError::Status { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2");
                then.status(200).json_body(json!({"data": {"translations": []}}));
            })
            .await;

        let err = provider(&server)
            .translate("hello", Language::Japanese, Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    #[tokio::test]
    async fn transport_error_does_not_reveal_key() {
        // Nothing listens on port 1.
        let p = GoogleTranslateProvider::new("http://127.0.0.1:1/v2", "supersecretkey", Duration::from_secs(2))
            .unwrap();

        let err = p
            .translate("hello", Language::English, Language::Japanese)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Http(_)));
        assert!(!err.to_string().contains("supersecretkey"));
        assert!(!format!("{err:?}").contains("supersecretkey"));
    }

    #[test]
    fn empty_configured_key_defers_to_environment() {
        assert_eq!(pick_api_key(Some("cfg"), Some("env".into())).as_deref(), Some("cfg"));
        assert_eq!(pick_api_key(Some(""), Some("env".into())).as_deref(), Some("env"));
        assert_eq!(pick_api_key(None, Some("env".into())).as_deref(), Some("env"));
        assert_eq!(pick_api_key(Some(""), Some(String::new())), None);
        assert_eq!(pick_api_key(None, None), None);
    }

    #[test]
    fn debug_hides_key() {
        let p = GoogleTranslateProvider::new(DEFAULT_ENDPOINT, "secret", Duration::from_secs(1)).unwrap();
        assert!(!format!("{p:?}").contains("secret"));
    }
}
