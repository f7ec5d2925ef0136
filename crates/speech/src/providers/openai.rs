//! OpenAI Text-to-Speech Provider
//!
//! Fallback synthesis backend: effectively unlimited quota with
//! language-keyed voice selection. Voice quality is the degraded half
//! of the hybrid pair, availability is the point.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::SpeechSynthesis;
use crate::types::{AudioData, AudioFormat, TtsProvider};

/// OpenAI TTS has a hard input limit per request
const MAX_INPUT_CHARS: usize = 4096;

/// OpenAI speech provider (fallback)
#[derive(Debug, Clone)]
pub struct OpenAiTtsProvider {
    client: Client,
    config: SpeechConfig,
}

impl OpenAiTtsProvider {
    /// Create a new OpenAI TTS provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` when no API key is set or
    /// the HTTP client cannot be built.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        if config.openai_api_key.is_none() {
            return Err(SpeechError::Configuration(
                "OpenAI API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> &str {
        self.config.openai_api_key.as_deref().unwrap_or_default()
    }

    fn tts_url(&self) -> String {
        format!("{}/audio/speech", self.config.openai_base_url)
    }

    /// Resolve the voice for a narration language code
    #[must_use]
    pub fn voice_for_language(&self, language: &str) -> &str {
        self.config.voice_for_language(language)
    }
}

/// OpenAI TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    code: Option<String>,
}

#[async_trait]
impl SpeechSynthesis for OpenAiTtsProvider {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<String>,
    ) -> Result<AudioData, SpeechError> {
        debug!("Synthesizing speech with OpenAI TTS");

        if text.is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        if text.len() > MAX_INPUT_CHARS {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {} characters exceeds {MAX_INPUT_CHARS} limit",
                text.len()
            )));
        }

        let voice = voice.as_deref().unwrap_or(&self.config.default_voice);

        let request = TtsRequest {
            model: &self.config.tts_model,
            input: text,
            voice,
            speed: 1.0,
        };

        let response = self
            .client
            .post(self.tts_url())
            .bearer_auth(self.api_key())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_body) {
                return match api_error.error.code.as_deref() {
                    Some("rate_limit_exceeded") => Err(SpeechError::RateLimited),
                    Some("invalid_voice") => Err(SpeechError::SynthesisFailed(format!(
                        "Voice not found: {voice}"
                    ))),
                    _ => Err(SpeechError::SynthesisFailed(api_error.error.message)),
                };
            }

            return Err(SpeechError::SynthesisFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        debug!(audio_size = audio_bytes.len(), "Speech synthesis complete");

        Ok(AudioData::new(audio_bytes.to_vec(), AudioFormat::Mp3))
    }

    fn provider(&self) -> TtsProvider {
        TtsProvider::OpenAi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_provider(mock_server: &MockServer) -> OpenAiTtsProvider {
        let config = SpeechConfig {
            openai_api_key: Some("oai-test-key".to_string()),
            openai_base_url: mock_server.uri(),
            ..Default::default()
        };
        OpenAiTtsProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn synthesize_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(header("authorization", "Bearer oai-test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1024]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);

        let result = provider.synthesize("Hello, world!", None).await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().size_bytes(), 1024);
    }

    #[tokio::test]
    async fn synthesize_sends_selected_voice() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(body_partial_json(serde_json::json!({"voice": "onyx"})))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 256]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);

        let result = provider.synthesize("Test", Some("onyx".to_string())).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn synthesize_empty_text_fails() {
        let mock_server = MockServer::start().await;
        let provider = create_test_provider(&mock_server);

        let result = provider.synthesize("", None).await;

        assert!(matches!(result, Err(SpeechError::SynthesisFailed(_))));
    }

    #[tokio::test]
    async fn synthesize_text_too_long_fails() {
        let mock_server = MockServer::start().await;
        let provider = create_test_provider(&mock_server);

        let long_text = "a".repeat(5000);
        let result = provider.synthesize(&long_text, None).await;

        assert!(matches!(result, Err(SpeechError::SynthesisFailed(_))));
    }

    #[tokio::test]
    async fn synthesize_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "message": "Rate limit exceeded",
                    "type": "rate_limit_error",
                    "code": "rate_limit_exceeded"
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);

        let result = provider.synthesize("Test", None).await;

        assert!(matches!(result, Err(SpeechError::RateLimited)));
    }

    #[test]
    fn voice_for_language_uses_config_map() {
        let config = SpeechConfig {
            openai_api_key: Some("key".to_string()),
            ..Default::default()
        };
        let provider = OpenAiTtsProvider::new(config).unwrap();

        assert_eq!(provider.voice_for_language("en"), "onyx");
        assert_eq!(provider.voice_for_language("hi"), "nova");
        assert_eq!(provider.voice_for_language("xx"), "nova");
    }

    #[test]
    fn new_fails_without_api_key() {
        let result = OpenAiTtsProvider::new(SpeechConfig::default());
        assert!(matches!(result, Err(SpeechError::Configuration(_))));
    }

    #[test]
    fn provider_tag_is_openai() {
        let config = SpeechConfig {
            openai_api_key: Some("key".to_string()),
            ..Default::default()
        };
        let provider = OpenAiTtsProvider::new(config).unwrap();
        assert_eq!(provider.provider(), TtsProvider::OpenAi);
    }
}
