//! CLI configuration
//!
//! Layered configuration: defaults, an optional TOML file, then
//! environment variables with the `EXPLAINCAST_` prefix
//! (e.g. `EXPLAINCAST_SPEECH__OPENAI_API_KEY`).

use composition::CompositionConfig;
use serde::Deserialize;
use speech::SpeechConfig;

/// Top-level configuration for the explaincast binary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Speech synthesis settings (providers, quota, artifact dirs)
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Video composition settings (output profile, FFmpeg paths)
    #[serde(default)]
    pub composition: CompositionConfig,
}

impl AppConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns `config::ConfigError` when a source fails to parse or
    /// the merged result does not deserialize.
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let file_source = config::File::with_name(file.unwrap_or("explaincast")).required(
            // A named file must exist; the default one is optional.
            file.is_some(),
        );

        let builder = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("EXPLAINCAST")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_apply_without_any_source() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.speech.elevenlabs_char_limit, 10_000);
        assert_eq!(config.composition.width, 1280);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[speech]\nopenai_api_key = \"oai-key\"\nelevenlabs_char_limit = 2500\n\n\
             [composition]\nfps = 30"
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();

        assert_eq!(config.speech.openai_api_key, Some("oai-key".to_string()));
        assert_eq!(config.speech.elevenlabs_char_limit, 2500);
        assert_eq!(config.composition.fps, 30);
        assert_eq!(config.composition.height, 720);
    }

    #[test]
    fn missing_named_file_is_an_error() {
        let result = AppConfig::load(Some("/nonexistent/explaincast.toml"));
        assert!(result.is_err());
    }
}
