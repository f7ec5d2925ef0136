//! Domain errors

use thiserror::Error;

use crate::value_objects::SceneId;

/// Errors raised when validating planner output
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    /// The plan contains no scenes at all
    #[error("Scene plan is empty")]
    EmptyPlan,

    /// Two scenes share the same id, breaking the audio join key
    #[error("Duplicate scene id: {0}")]
    DuplicateSceneId(SceneId),

    /// A scene carries a non-positive planned duration
    #[error("Scene {id} has invalid planned duration {seconds}s")]
    InvalidDuration {
        /// Offending scene
        id: SceneId,
        /// The rejected value
        seconds: f64,
    },
}
