//! Speech - hybrid text-to-speech synthesis for narrated videos
//!
//! Provides the speech half of the video pipeline:
//! - `SpeechSynthesis` - port implemented by provider adapters
//! - `QuotaLedger` - durable character-budget bookkeeping for the
//!   primary provider
//! - `HybridSynthesizer` - quota-gated provider selection with
//!   one-way failover to the fallback provider
//! - `SceneBatchSynthesizer` - best-effort per-scene synthesis across
//!   a whole plan
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the trait (port)
//! - `providers` module contains concrete adapters (ElevenLabs, OpenAI)
//!
//! The hybrid coordinator prefers the premium, quota-limited primary
//! provider and permanently switches to the fallback once the shared
//! character budget is provably spent.

pub mod batch;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod ports;
pub mod probe;
pub mod providers;
pub mod quota;
pub mod types;

pub use batch::{BatchReport, SceneBatchSynthesizer, SceneOutcome, SkipReason};
pub use config::SpeechConfig;
pub use coordinator::{HybridSynthesizer, SpeechStatus};
pub use error::SpeechError;
pub use ports::SpeechSynthesis;
pub use providers::elevenlabs::ElevenLabsProvider;
pub use providers::openai::OpenAiTtsProvider;
pub use quota::{QuotaLedger, QuotaStatus};
pub use types::{AudioData, AudioFormat, NarrationAudio, SceneAudio, TtsProvider};
