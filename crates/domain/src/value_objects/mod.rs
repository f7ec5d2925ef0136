//! Value objects for the scene plan domain

mod language;
mod scene_id;

pub use language::Language;
pub use scene_id::SceneId;
