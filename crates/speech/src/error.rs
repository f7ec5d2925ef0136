//! Speech synthesis errors
//!
//! The quota-exceeded condition is a dedicated variant so the hybrid
//! coordinator branches on a typed tag rather than inspecting error
//! text. Everything else a provider can raise is transient from the
//! coordinator's point of view: it falls through to the other provider
//! without touching the quota ledger.

use thiserror::Error;

/// Errors that can occur during speech synthesis
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to the provider
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the provider failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The primary provider's shared character budget is spent
    ///
    /// Triggers the permanent, process-lifetime switch to the fallback
    /// provider.
    #[error("Provider quota exhausted")]
    QuotaExceeded,

    /// Rate limit exceeded (transient, unlike `QuotaExceeded`)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Synthesis rejected or failed upstream
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during synthesis
    #[error("Speech synthesis timeout after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not configured or not installed
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Failed to write the produced audio artifact
    #[error("Audio artifact error: {0}")]
    Artifact(String),

    /// Both the primary and the fallback provider failed for one call
    #[error("Both speech providers failed (primary: {primary}, fallback: {fallback})")]
    BothProvidersFailed {
        /// Why the primary was not used or failed
        primary: String,
        /// Why the fallback failed
        fallback: String,
    },
}

impl SpeechError {
    /// Whether this error signals a spent provider budget
    #[must_use]
    pub const fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded)
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(30000)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
