//! Domain entities

mod scene;
mod video;

pub use scene::{Scene, SceneKind, ScenePlan, SceneVisual, MIN_NARRATION_CHARS};
pub use video::ComposedVideo;
