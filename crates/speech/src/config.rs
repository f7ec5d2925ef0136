//! Configuration for speech synthesis

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the hybrid speech-synthesis stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// ElevenLabs API key (primary provider; absent disables it)
    #[serde(default)]
    pub elevenlabs_api_key: Option<String>,

    /// ElevenLabs API base URL (for custom endpoints and tests)
    #[serde(default = "default_elevenlabs_base_url")]
    pub elevenlabs_base_url: String,

    /// ElevenLabs voice id used for all narration
    #[serde(default = "default_elevenlabs_voice_id")]
    pub elevenlabs_voice_id: String,

    /// ElevenLabs synthesis model
    #[serde(default = "default_elevenlabs_model")]
    pub elevenlabs_model: String,

    /// Shared character budget for the primary provider per period
    #[serde(default = "default_char_limit")]
    pub elevenlabs_char_limit: u64,

    /// OpenAI API key (fallback provider; absent disables it)
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// OpenAI TTS model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Fallback-provider voice per narration language
    #[serde(default = "default_voice_by_language")]
    pub voice_by_language: HashMap<String, String>,

    /// Voice used when a language has no mapping
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Request timeout in milliseconds (the only admission control
    /// against a hung provider)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory for synthesized audio artifacts
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// Path of the persisted quota-state record
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Audio artifacts older than this are purged before each batch
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_elevenlabs_voice_id() -> String {
    "pNInz6obpgDQGcFmaJgB".to_string()
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

const fn default_char_limit() -> u64 {
    10_000
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_tts_model() -> String {
    "tts-1-hd".to_string()
}

fn default_voice_by_language() -> HashMap<String, String> {
    HashMap::from([
        ("en".to_string(), "onyx".to_string()),
        ("hi".to_string(), "nova".to_string()),
    ])
}

fn default_voice() -> String {
    "nova".to_string()
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("outputs/audio")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("outputs/tts_quota.json")
}

const fn default_retention_secs() -> u64 {
    3600 // one hour
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: None,
            elevenlabs_base_url: default_elevenlabs_base_url(),
            elevenlabs_voice_id: default_elevenlabs_voice_id(),
            elevenlabs_model: default_elevenlabs_model(),
            elevenlabs_char_limit: default_char_limit(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            tts_model: default_tts_model(),
            voice_by_language: default_voice_by_language(),
            default_voice: default_voice(),
            timeout_ms: default_timeout_ms(),
            audio_dir: default_audio_dir(),
            state_file: default_state_file(),
            retention_secs: default_retention_secs(),
        }
    }
}

impl SpeechConfig {
    /// Resolve the fallback-provider voice for a narration language
    #[must_use]
    pub fn voice_for_language(&self, language: &str) -> &str {
        self.voice_by_language
            .get(language)
            .map_or(&self.default_voice, String::as_str)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.elevenlabs_api_key.is_none() && self.openai_api_key.is_none() {
            return Err("At least one speech provider must be configured".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.elevenlabs_char_limit == 0 && self.elevenlabs_api_key.is_some() {
            return Err("ElevenLabs character limit must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            elevenlabs_api_key: Some("el-test-key".to_string()),
            openai_api_key: Some("oai-test-key".to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SpeechConfig::default();

        assert!(config.elevenlabs_api_key.is_none());
        assert_eq!(config.elevenlabs_base_url, "https://api.elevenlabs.io/v1");
        assert_eq!(config.elevenlabs_voice_id, "pNInz6obpgDQGcFmaJgB");
        assert_eq!(config.elevenlabs_model, "eleven_multilingual_v2");
        assert_eq!(config.elevenlabs_char_limit, 10_000);
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.tts_model, "tts-1-hd");
        assert_eq!(config.default_voice, "nova");
        assert_eq!(config.timeout_ms, 30000);
        assert_eq!(config.retention_secs, 3600);
    }

    #[test]
    fn voice_for_language_uses_mapping() {
        let config = SpeechConfig::default();
        assert_eq!(config.voice_for_language("en"), "onyx");
        assert_eq!(config.voice_for_language("hi"), "nova");
    }

    #[test]
    fn voice_for_language_falls_back_to_default() {
        let config = SpeechConfig::default();
        assert_eq!(config.voice_for_language("sw"), "nova");
    }

    #[test]
    fn validate_fails_without_any_provider() {
        let config = SpeechConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_succeeds_with_one_provider() {
        let config = SpeechConfig {
            openai_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_fails_with_zero_timeout() {
        let mut config = SpeechConfig::test();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_char_limit_when_primary_configured() {
        let mut config = SpeechConfig::test();
        config.elevenlabs_char_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            elevenlabs_api_key = "el-key"
            elevenlabs_char_limit = 5000
            openai_api_key = "oai-key"
            tts_model = "tts-1"
            default_voice = "alloy"
            timeout_ms = 60000
            audio_dir = "/tmp/audio"

            [voice_by_language]
            de = "echo"
        "#;

        let config: SpeechConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.elevenlabs_api_key, Some("el-key".to_string()));
        assert_eq!(config.elevenlabs_char_limit, 5000);
        assert_eq!(config.tts_model, "tts-1");
        assert_eq!(config.voice_for_language("de"), "echo");
        assert_eq!(config.voice_for_language("fr"), "alloy");
        assert_eq!(config.audio_dir, PathBuf::from("/tmp/audio"));
    }
}
