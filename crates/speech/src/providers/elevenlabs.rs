//! ElevenLabs Text-to-Speech Provider
//!
//! Primary synthesis backend: premium multilingual voices with a finite
//! shared character budget. The adapter converts the provider's
//! structured `quota_exceeded` status into `SpeechError::QuotaExceeded`
//! so the coordinator can trip the ledger on a typed signal; the
//! adapter itself never touches quota state.

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

/// ElevenLabs speech provider (primary)
#[derive(Debug, Clone)]
pub struct ElevenLabsProvider {
    client: Client,
    config: SpeechConfig,
}

impl ElevenLabsProvider {
    /// Create a new ElevenLabs provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` when no API key is set or
    /// the HTTP client cannot be built.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        if config.elevenlabs_api_key.is_none() {
            return Err(SpeechError::Configuration(
                "ElevenLabs API key is required".to_string(),
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
        self.config.elevenlabs_api_key.as_deref().unwrap_or_default()
    }

    fn tts_url(&self, voice_id: &str) -> String {
        format!(
            "{}/text-to-speech/{voice_id}",
            self.config.elevenlabs_base_url
        )
    }
}

/// ElevenLabs synthesis request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    output_format: &'a str,
}

/// ElevenLabs API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    detail: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    status: Option<String>,
    message: Option<String>,
}

#[async_trait]
impl SpeechSynthesis for ElevenLabsProvider {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<String>,
    ) -> Result<AudioData, SpeechError> {
        debug!("Synthesizing speech with ElevenLabs");

        if text.is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        let voice_id = voice.as_deref().unwrap_or(&self.config.elevenlabs_voice_id);

        let request = TtsRequest {
            text,
            model_id: &self.config.elevenlabs_model,
            output_format: "mp3_44100_128",
        };

        let response = self
            .client
            .post(self.tts_url(voice_id))
            .header("xi-api-key", self.api_key())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_body) {
                return match api_error.detail.status.as_deref() {
                    // The one structured signal that trips the permanent
                    // failover; everything else stays transient.
                    Some("quota_exceeded") => Err(SpeechError::QuotaExceeded),
                    Some("too_many_concurrent_requests") => Err(SpeechError::RateLimited),
                    _ => Err(SpeechError::SynthesisFailed(
                        api_error.detail.message.unwrap_or(error_body),
                    )),
                };
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SpeechError::RateLimited);
            }

            return Err(SpeechError::SynthesisFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        if audio_bytes.is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "ElevenLabs returned empty audio".to_string(),
            ));
        }

        debug!(audio_size = audio_bytes.len(), "Speech synthesis complete");

        Ok(AudioData::new(audio_bytes.to_vec(), AudioFormat::Mp3))
    }

    fn provider(&self) -> TtsProvider {
        TtsProvider::ElevenLabs
    }
}
