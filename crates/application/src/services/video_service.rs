//! Video generation service
//!
//! Orchestrates one request end to end: validate the plan, synthesize
//! narration best-effort per scene, refuse wholly unnarrated plans,
//! compose the final artifact.

use std::path::Path;
use std::sync::Arc;

use composition::SceneComposer;
use domain::{ComposedVideo, Language, ScenePlan};
use serde::Serialize;
use speech::{HybridSynthesizer, SceneAudio, SceneBatchSynthesizer, SpeechStatus};
use tracing::{info, instrument};

use crate::error::ApplicationError;

/// Summary of one generated video, including degradation counters
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedVideo {
    /// The composed artifact
    pub video: ComposedVideo,
    /// Scenes that received narration
    pub synthesized: usize,
    /// Scenes deliberately left silent (no meaningful narration)
    pub skipped: usize,
    /// Scenes whose synthesis failed and rendered silently
    pub failed: usize,
}

impl GeneratedVideo {
    /// Whether every scene with narration actually got audio
    #[must_use]
    pub const fn is_fully_narrated(&self) -> bool {
        self.failed == 0
    }
}

/// End-to-end video generation over a validated scene plan
pub struct VideoGenerationService {
    coordinator: Arc<HybridSynthesizer>,
    batch: SceneBatchSynthesizer,
    composer: SceneComposer,
}

impl VideoGenerationService {
    /// Wire the service from its collaborators
    #[must_use]
    pub const fn new(
        coordinator: Arc<HybridSynthesizer>,
        batch: SceneBatchSynthesizer,
        composer: SceneComposer,
    ) -> Self {
        Self {
            coordinator,
            batch,
            composer,
        }
    }

    /// Generate a narrated video for a plan
    ///
    /// Scenes that could not be narrated render silently for their
    /// planned duration; the request fails only when the plan is
    /// invalid, when no scene at all produced audio, or when
    /// composition fails.
    ///
    /// # Errors
    ///
    /// `InvalidPlan`, `BatchEmpty` or `Composition`.
    #[instrument(skip(self, plan, diagram), fields(title = %plan.title, scenes = plan.scene_count()))]
    pub async fn generate(
        &self,
        plan: &ScenePlan,
        language: &Language,
        diagram: Option<&Path>,
    ) -> Result<GeneratedVideo, ApplicationError> {
        plan.validate()?;

        let report = self.batch.synthesize_all(&plan.scenes, language).await;
        if !report.has_audio() {
            return Err(ApplicationError::BatchEmpty);
        }

        let audio: Vec<SceneAudio> = report.audio().into_iter().cloned().collect();
        let video = self.composer.compose(&plan.scenes, &audio, diagram).await?;

        info!(
            path = %video.path.display(),
            total_secs = video.total_duration,
            synthesized = report.synthesized_count(),
            failed = report.failed_count(),
            "Video generated"
        );

        Ok(GeneratedVideo {
            video,
            synthesized: report.synthesized_count(),
            skipped: report.skipped_count(),
            failed: report.failed_count(),
        })
    }

    /// Speech provider availability and quota figures
    #[must_use]
    pub fn status(&self) -> SpeechStatus {
        self.coordinator.status()
    }
}
