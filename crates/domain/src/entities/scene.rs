//! Scene plan entities
//!
//! A `ScenePlan` is the fixed-shape script produced by the upstream
//! planner: an ordered list of scenes, each with its own narration text,
//! a planned duration estimate, and a kind-specific visual payload.
//! The plan is immutable once received; measured audio durations are
//! bound into a separate, derived structure during composition.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::SceneId;

/// Narration shorter than this (after trimming) is treated as absent
/// and the scene is rendered silently.
pub const MIN_NARRATION_CHARS: usize = 5;

/// The visual archetype of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Opening title card
    Title,
    /// Rendered diagram with a caption
    Diagram,
    /// Heading with bullet points
    Text,
    /// Closing takeaway card
    Summary,
}

impl std::fmt::Display for SceneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Diagram => write!(f, "diagram"),
            Self::Text => write!(f, "text"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// Kind-specific visual payload of a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneVisual {
    /// Title card text
    Title {
        /// On-screen title
        text: String,
    },
    /// Diagram caption; the diagram image itself is an external asset
    Diagram {
        /// Caption shown below the diagram
        caption: String,
    },
    /// Heading with up to a few bullet points
    Text {
        /// Section heading
        heading: String,
        /// Bullet points (renderers cap how many are shown)
        points: Vec<String>,
    },
    /// Summary card text
    Summary {
        /// One-line takeaway
        text: String,
    },
}

impl SceneVisual {
    /// The scene kind this payload belongs to
    #[must_use]
    pub const fn kind(&self) -> SceneKind {
        match self {
            Self::Title { .. } => SceneKind::Title,
            Self::Diagram { .. } => SceneKind::Diagram,
            Self::Text { .. } => SceneKind::Text,
            Self::Summary { .. } => SceneKind::Summary,
        }
    }
}

/// One timed segment of the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique id within the plan; join key to synthesized audio
    pub id: SceneId,
    /// Narration text for this scene (may be empty)
    #[serde(default)]
    pub narration: String,
    /// Planner's duration estimate in seconds; replaced by the measured
    /// audio duration once real audio exists
    pub planned_duration: f64,
    /// Kind-specific visual payload
    #[serde(flatten)]
    pub visual: SceneVisual,
}

impl Scene {
    /// The scene kind, derived from the visual payload
    #[must_use]
    pub const fn kind(&self) -> SceneKind {
        self.visual.kind()
    }

    /// Whether this scene carries enough narration to synthesize
    #[must_use]
    pub fn has_narration(&self) -> bool {
        self.narration.trim().chars().count() >= MIN_NARRATION_CHARS
    }
}

/// Ordered scene script produced by the upstream planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePlan {
    /// Video title
    pub title: String,
    /// Scenes in presentation order
    pub scenes: Vec<Scene>,
}

impl ScenePlan {
    /// Validate planner output before it enters the pipeline
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the plan is empty, a scene id repeats,
    /// or a planned duration is not positive.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.scenes.is_empty() {
            return Err(DomainError::EmptyPlan);
        }

        let mut seen = std::collections::HashSet::new();
        for scene in &self.scenes {
            if !seen.insert(scene.id) {
                return Err(DomainError::DuplicateSceneId(scene.id));
            }
            if scene.planned_duration <= 0.0 {
                return Err(DomainError::InvalidDuration {
                    id: scene.id,
                    seconds: scene.planned_duration,
                });
            }
        }

        Ok(())
    }

    /// Total planned duration across all scenes
    #[must_use]
    pub fn planned_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.planned_duration).sum()
    }

    /// Number of scenes in the plan
    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }
}
