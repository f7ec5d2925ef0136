//! Narration language
//!
//! ISO 639-1 language code selecting narration voice and planner output
//! language. Unknown codes are carried as-is; providers decide how to
//! map them to a voice.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ISO 639-1 narration language code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Create a language from a code, lowercased
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_lowercase())
    }

    /// English, the default narration language
    #[must_use]
    pub fn english() -> Self {
        Self("en".to_string())
    }

    /// Get the language code
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_english() {
        assert_eq!(Language::default().code(), "en");
    }

    #[test]
    fn codes_are_lowercased() {
        assert_eq!(Language::new("HI").code(), "hi");
    }

    #[test]
    fn display_shows_code() {
        assert_eq!(Language::new("de").to_string(), "de");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&Language::new("es")).unwrap();
        assert_eq!(json, "\"es\"");
    }
}
