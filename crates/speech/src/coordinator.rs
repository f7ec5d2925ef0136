//! Hybrid Synthesis Coordinator
//!
//! Chooses a provider per request using the quota ledger, invokes the
//! adapters with failover, measures the real audio duration, and
//! updates the ledger.
//!
//! # Architecture
//!
//! ```text
//! Narration text
//!     │
//!     ▼
//! ┌─────────────────────────────────┐
//! │     Hybrid Synthesizer          │
//! │                                 │
//! │  quota ledger ──┐               │
//! │                 ▼               │
//! │  ┌──────────┐   ┌──────────┐    │
//! │  │ primary  │──▶│ fallback │    │
//! │  │(budgeted)│   │(unlimited)│   │
//! │  └──────────┘   └──────────┘    │
//! └─────────────────────────────────┘
//!     │
//!     ▼
//! Audio artifact + measured duration
//! ```
//!
//! A `QuotaExceeded` signal from the primary trips the ledger's
//! one-way exhaustion switch: for the rest of the process lifetime
//! every call goes straight to the fallback instead of wasting an
//! attempt against a provider known to be spent.

use std::path::PathBuf;
use std::sync::Arc;

use domain::Language;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::SpeechSynthesis;
use crate::probe::{DurationProbe, estimate_secs};
use crate::quota::{QuotaLedger, QuotaStatus};
use crate::types::{AudioData, NarrationAudio, TtsProvider};

/// Availability and quota snapshot for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct SpeechStatus {
    /// Whether the primary provider is configured and its budget admits use
    pub primary_available: bool,
    /// Whether the fallback provider is configured
    pub fallback_available: bool,
    /// Quota figures for the primary provider
    pub quota: QuotaStatus,
    /// The provider the next request would use
    pub active_provider: Option<TtsProvider>,
}

/// Quota-gated provider selection with one-way failover
pub struct HybridSynthesizer {
    primary: Option<Arc<dyn SpeechSynthesis>>,
    fallback: Option<Arc<dyn SpeechSynthesis>>,
    ledger: Arc<QuotaLedger>,
    probe: DurationProbe,
    config: SpeechConfig,
}

impl std::fmt::Debug for HybridSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSynthesizer")
            .field("primary", &self.primary.is_some())
            .field("fallback", &self.fallback.is_some())
            .field("quota", &self.ledger.status())
            .finish_non_exhaustive()
    }
}

impl HybridSynthesizer {
    /// Create a coordinator over explicit adapters
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` when neither provider is
    /// supplied.
    pub fn new(
        primary: Option<Arc<dyn SpeechSynthesis>>,
        fallback: Option<Arc<dyn SpeechSynthesis>>,
        ledger: Arc<QuotaLedger>,
        probe: DurationProbe,
        config: SpeechConfig,
    ) -> Result<Self, SpeechError> {
        if primary.is_none() && fallback.is_none() {
            return Err(SpeechError::Configuration(
                "At least one speech provider must be configured".to_string(),
            ));
        }

        info!(
            primary = primary.is_some(),
            fallback = fallback.is_some(),
            "Hybrid synthesizer initialized"
        );

        Ok(Self {
            primary,
            fallback,
            ledger,
            probe,
            config,
        })
    }

    /// Build the coordinator from configuration, constructing whichever
    /// adapters have keys
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` when the config is invalid
    /// or neither provider has an API key.
    pub fn from_config(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let primary: Option<Arc<dyn SpeechSynthesis>> = if config.elevenlabs_api_key.is_some() {
            Some(Arc::new(crate::providers::elevenlabs::ElevenLabsProvider::new(config.clone())?))
        } else {
            None
        };

        let fallback: Option<Arc<dyn SpeechSynthesis>> = if config.openai_api_key.is_some() {
            Some(Arc::new(crate::providers::openai::OpenAiTtsProvider::new(config.clone())?))
        } else {
            None
        };

        let ledger = Arc::new(QuotaLedger::load(
            config.state_file.clone(),
            config.elevenlabs_char_limit,
        ));

        Self::new(primary, fallback, ledger, DurationProbe::new(), config)
    }

    /// Synthesize narration, preferring the primary provider while the
    /// ledger admits it
    ///
    /// # Errors
    ///
    /// Fails only when both providers fail
    /// (`SpeechError::BothProvidersFailed`).
    #[instrument(skip(self, text), fields(text_len = text.len(), language = %language))]
    pub async fn synthesize(
        &self,
        text: &str,
        language: &Language,
    ) -> Result<NarrationAudio, SpeechError> {
        let characters = text.chars().count();
        debug!(characters, "Generating narration audio");

        let mut primary_reason = "not configured".to_string();

        if let Some(ref primary) = self.primary {
            if self.ledger.can_consume(characters as u64) {
                match primary.synthesize(text, None).await {
                    Ok(audio) => {
                        let result = self
                            .finish(audio, primary.provider(), text, characters)
                            .await?;
                        self.ledger.record_consumption(characters as u64);
                        info!(provider = %result.provider, "Primary synthesis succeeded");
                        return Ok(result);
                    },
                    Err(e) => {
                        if e.is_quota_exceeded() {
                            // One-way ratchet: the shared budget is provably
                            // spent, stop trying the primary for good.
                            self.ledger.mark_exhausted();
                            warn!("Primary quota exhausted, switching to fallback permanently");
                        } else {
                            warn!(error = %e, "Primary synthesis failed, trying fallback");
                        }
                        primary_reason = e.to_string();
                    },
                }
            } else {
                primary_reason = format!("quota does not admit {characters} characters");
                debug!("{primary_reason}");
            }
        }

        if let Some(ref fallback) = self.fallback {
            let voice = self.config.voice_for_language(language.code()).to_string();
            match fallback.synthesize(text, Some(voice)).await {
                Ok(audio) => {
                    let result = self
                        .finish(audio, fallback.provider(), text, characters)
                        .await?;
                    info!(provider = %result.provider, "Fallback synthesis succeeded");
                    return Ok(result);
                },
                Err(e) => {
                    warn!(error = %e, "Fallback synthesis failed");
                    return Err(SpeechError::BothProvidersFailed {
                        primary: primary_reason,
                        fallback: e.to_string(),
                    });
                },
            }
        }

        Err(SpeechError::BothProvidersFailed {
            primary: primary_reason,
            fallback: "not configured".to_string(),
        })
    }

    /// Current provider availability and quota figures
    #[must_use]
    pub fn status(&self) -> SpeechStatus {
        let quota = self.ledger.status();
        let primary_available = self.primary.is_some() && !quota.exhausted;
        let fallback_available = self.fallback.is_some();

        let active_provider = if primary_available {
            self.primary.as_ref().map(|p| p.provider())
        } else if fallback_available {
            self.fallback.as_ref().map(|p| p.provider())
        } else {
            None
        };

        SpeechStatus {
            primary_available,
            fallback_available,
            quota,
            active_provider,
        }
    }

    /// Write the audio artifact and measure its real duration
    async fn finish(
        &self,
        audio: AudioData,
        provider: TtsProvider,
        text: &str,
        characters: usize,
    ) -> Result<NarrationAudio, SpeechError> {
        let path = self.write_artifact(&audio, provider).await?;
        let duration_secs = self.probe.duration_secs(&path).await;

        debug!(
            measured_secs = duration_secs,
            estimated_secs = estimate_secs(text),
            "Audio duration measured"
        );

        Ok(NarrationAudio {
            path,
            duration_secs,
            provider,
            characters,
        })
    }

    /// Write audio bytes to a timestamped path under the audio directory
    async fn write_artifact(
        &self,
        audio: &AudioData,
        provider: TtsProvider,
    ) -> Result<PathBuf, SpeechError> {
        let prefix = match provider {
            TtsProvider::ElevenLabs => "el",
            TtsProvider::OpenAi => "oai",
        };
        let timestamp = chrono::Utc::now().timestamp_millis();
        let filename = format!("{prefix}_{timestamp}.{}", audio.format().extension());
        let path = self.config.audio_dir.join(filename);

        tokio::fs::create_dir_all(&self.config.audio_dir)
            .await
            .map_err(|e| SpeechError::Artifact(format!("Failed to create audio dir: {e}")))?;
        tokio::fs::write(&path, audio.data())
            .await
            .map_err(|e| SpeechError::Artifact(format!("Failed to write audio file: {e}")))?;

        Ok(path)
    }
}
