//! Application-level errors

use composition::CompositionError;
use domain::DomainError;
use speech::SpeechError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Per-scene synthesis failures never surface here; they are absorbed
/// by the batch and reflected only in the generated video's counters.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The scene plan failed validation
    #[error("Invalid scene plan: {0}")]
    InvalidPlan(#[from] DomainError),

    /// No scene produced usable audio; a narrated video needs at
    /// least one clip
    #[error("No scene could be narrated")]
    BatchEmpty,

    /// Speech subsystem failure outside the per-scene batch
    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// Rendering or encoding failure; fatal, no partial artifact
    #[error(transparent)]
    Composition(#[from] CompositionError),
}
