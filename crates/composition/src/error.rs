//! Composition error types

use thiserror::Error;

/// Errors from scene rendering, concatenation and encoding
///
/// Every variant is fatal for the request; no partial artifact is
/// returned.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// FFmpeg or ffprobe could not be launched at all
    #[error("Failed to launch {tool}: {reason}")]
    Launch {
        /// The external tool that failed to start
        tool: String,
        /// The underlying error
        reason: String,
    },

    /// A scene's visual clip could not be rendered
    #[error("Scene render failed: {0}")]
    Render(String),

    /// Segment or audio concatenation failed
    #[error("Concatenation failed: {0}")]
    Concat(String),

    /// Final encode or mux failed
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Filesystem error while staging segments or writing the artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
