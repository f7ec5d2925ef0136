//! Application layer - video generation orchestration
//!
//! Drives the full pipeline for one request: plan validation, the
//! best-effort synthesis batch, the empty-batch gate and final
//! composition. Degraded output (some scenes silent) is success;
//! a wholly unnarrated plan or an encode failure is not.

pub mod error;
pub mod services;

pub use error::ApplicationError;
pub use services::video_service::{GeneratedVideo, VideoGenerationService};
