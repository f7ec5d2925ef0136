//! Port definition for speech synthesis
//!
//! Defines the trait (port) that provider adapters implement. Both the
//! premium primary backend and the always-available fallback are
//! polymorphic over this one capability; neither touches quota state.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, TtsProvider};

/// Port for text-to-speech provider adapters
///
/// # Example
///
/// ```ignore
/// use speech::{SpeechSynthesis, SpeechError};
///
/// async fn narrate(tts: &dyn SpeechSynthesis, text: &str) -> Result<Vec<u8>, SpeechError> {
///     let audio = tts.synthesize(text, None).await?;
///     Ok(audio.into_data())
/// }
/// ```
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    /// Synthesize speech from text
    ///
    /// # Arguments
    ///
    /// * `text` - Narration text to synthesize
    /// * `voice` - Voice selector; `None` uses the adapter's default.
    ///   Taken by value so test doubles can match on it.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::QuotaExceeded` when the provider reports
    /// its shared budget spent, or another `SpeechError` variant for
    /// transient and fatal failures.
    async fn synthesize(&self, text: &str, voice: Option<String>)
    -> Result<AudioData, SpeechError>;

    /// Which backend this adapter talks to
    fn provider(&self) -> TtsProvider;
}
