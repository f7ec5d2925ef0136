//! Composition - duration reconciliation and video assembly
//!
//! Turns a scene plan plus per-scene narration audio into a single
//! encoded MP4:
//! - `timeline` - pure duration binding: measured audio duration
//!   overwrites the planner's estimate, scene by scene
//! - `renderer` - one styled visual clip per scene, drawn with FFmpeg
//!   filters
//! - `composer` - concatenation, audio/video length reconciliation and
//!   final encode
//!
//! Audio is authoritative for timing throughout: a slightly held last
//! frame beats a clipped narration.

pub mod composer;
pub mod config;
pub mod error;
pub mod renderer;
pub mod timeline;

pub use composer::SceneComposer;
pub use config::CompositionConfig;
pub use error::CompositionError;
pub use renderer::SceneRenderer;
pub use timeline::{RenderScene, bind_durations, reconciled_duration, total_duration};
