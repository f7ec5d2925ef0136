//! Types for speech synthesis
//!
//! Audio containers, provider tags, and the per-call / per-scene
//! synthesis results consumed by the composition stage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use domain::SceneId;

/// Supported audio output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format (both providers' default output)
    Mp3,
    /// WAV format (uncompressed)
    Wav,
}

impl AudioFormat {
    /// Get the MIME type for this audio format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
        }
    }

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

/// Container for synthesized audio bytes
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Vec<u8>,
    format: AudioFormat,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Get the size of the audio data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Which backend produced a piece of audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// ElevenLabs - premium multilingual voices, finite character budget
    ElevenLabs,
    /// OpenAI TTS - always-available fallback
    OpenAi,
}

impl std::fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElevenLabs => write!(f, "elevenlabs"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// Result of one hybrid synthesis call
///
/// Created by the coordinator, consumed immediately by the batch
/// synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationAudio {
    /// Path of the written audio artifact
    pub path: PathBuf,
    /// Duration in seconds, measured by decoding the produced file;
    /// `0.0` when decoding failed
    pub duration_secs: f64,
    /// Which provider produced the audio
    pub provider: TtsProvider,
    /// Character count of the synthesized text
    pub characters: usize,
}

/// A narration clip bound to its scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAudio {
    /// The scene this clip narrates
    pub scene_id: SceneId,
    /// Path of the audio artifact
    pub path: PathBuf,
    /// Measured duration in seconds
    pub duration_secs: f64,
    /// Which provider produced the audio
    pub provider: TtsProvider,
    /// Character count of the narration
    pub characters: usize,
}

impl SceneAudio {
    /// Bind a synthesis result to the scene it narrates
    #[must_use]
    pub fn bind(scene_id: SceneId, audio: NarrationAudio) -> Self {
        Self {
            scene_id,
            path: audio.path,
            duration_secs: audio.duration_secs,
            provider: audio.provider,
            characters: audio.characters,
        }
    }
}
