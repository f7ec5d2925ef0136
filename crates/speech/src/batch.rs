//! Per-scene batch synthesis
//!
//! Walks a scene plan in order and produces exactly one outcome per
//! scene: synthesized audio, a skip for scenes without meaningful
//! narration, or a recorded failure. A failing scene never aborts the
//! batch; the composition stage decides what a partially narrated plan
//! is worth.
//!
//! Stale audio artifacts from earlier runs are purged before each batch
//! so the output directory does not grow without bound.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use domain::{Language, Scene, SceneId};
use tracing::{debug, info, instrument, warn};

use crate::config::SpeechConfig;
use crate::coordinator::HybridSynthesizer;
use crate::types::SceneAudio;

/// Why a scene was skipped rather than synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Narration was absent or shorter than the minimum meaningful length
    NarrationTooShort,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NarrationTooShort => write!(f, "narration too short"),
        }
    }
}

/// The per-scene result of a batch run
#[derive(Debug, Clone)]
pub enum SceneOutcome {
    /// Narration was synthesized and written to disk
    Synthesized(SceneAudio),
    /// The scene was deliberately left silent
    Skipped {
        /// The silent scene
        scene_id: SceneId,
        /// Why it was skipped
        reason: SkipReason,
    },
    /// Synthesis failed for this scene; the batch continued
    Failed {
        /// The scene that failed
        scene_id: SceneId,
        /// The synthesis error, stringified
        error: String,
    },
}

impl SceneOutcome {
    /// The scene this outcome belongs to
    #[must_use]
    pub const fn scene_id(&self) -> SceneId {
        match self {
            Self::Synthesized(audio) => audio.scene_id,
            Self::Skipped { scene_id, .. } | Self::Failed { scene_id, .. } => *scene_id,
        }
    }

    /// Whether this outcome carries audio
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        matches!(self, Self::Synthesized(_))
    }
}

/// Ordered outcomes of one batch run, one per input scene
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    outcomes: Vec<SceneOutcome>,
}

impl BatchReport {
    /// All outcomes, in plan order
    #[must_use]
    pub fn outcomes(&self) -> &[SceneOutcome] {
        &self.outcomes
    }

    /// The audio clips that were produced, in plan order
    #[must_use]
    pub fn audio(&self) -> Vec<&SceneAudio> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SceneOutcome::Synthesized(audio) => Some(audio),
                _ => None,
            })
            .collect()
    }

    /// Number of scenes that produced audio
    #[must_use]
    pub fn synthesized_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_synthesized()).count()
    }

    /// Number of scenes deliberately left silent
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SceneOutcome::Skipped { .. }))
            .count()
    }

    /// Number of scenes whose synthesis failed
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SceneOutcome::Failed { .. }))
            .count()
    }

    /// Whether any scene produced audio
    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.synthesized_count() > 0
    }
}

/// Best-effort synthesis of every scene in a plan
pub struct SceneBatchSynthesizer {
    coordinator: Arc<HybridSynthesizer>,
    config: SpeechConfig,
}

impl SceneBatchSynthesizer {
    /// Create a batch synthesizer over a hybrid coordinator
    #[must_use]
    pub fn new(coordinator: Arc<HybridSynthesizer>, config: SpeechConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// Synthesize narration for every scene, in plan order
    ///
    /// Scenes run sequentially so quota admission sees each request's
    /// true remaining budget. Individual failures are recorded and the
    /// batch carries on.
    #[instrument(skip(self, scenes), fields(scene_count = scenes.len(), language = %language))]
    pub async fn synthesize_all(&self, scenes: &[Scene], language: &Language) -> BatchReport {
        self.purge_stale_artifacts();

        let mut outcomes = Vec::with_capacity(scenes.len());

        for scene in scenes {
            let outcome = self.synthesize_scene(scene, language).await;
            outcomes.push(outcome);
        }

        let report = BatchReport { outcomes };
        info!(
            synthesized = report.synthesized_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Batch synthesis complete"
        );
        report
    }

    async fn synthesize_scene(&self, scene: &Scene, language: &Language) -> SceneOutcome {
        if !scene.has_narration() {
            debug!(scene_id = %scene.id, "Scene has no meaningful narration, leaving silent");
            return SceneOutcome::Skipped {
                scene_id: scene.id,
                reason: SkipReason::NarrationTooShort,
            };
        }

        match self.coordinator.synthesize(&scene.narration, language).await {
            Ok(audio) => SceneOutcome::Synthesized(SceneAudio::bind(scene.id, audio)),
            Err(e) => {
                warn!(scene_id = %scene.id, error = %e, "Scene synthesis failed, continuing batch");
                SceneOutcome::Failed {
                    scene_id: scene.id,
                    error: e.to_string(),
                }
            },
        }
    }

    /// Remove audio artifacts older than the retention window
    ///
    /// Purge failures are logged and ignored; a full output directory
    /// is a nuisance, a refused batch is a defect.
    fn purge_stale_artifacts(&self) {
        let Ok(entries) = std::fs::read_dir(&self.config.audio_dir) else {
            return;
        };
        let now = SystemTime::now();
        let retention = Duration::from_secs(self.config.retention_secs);

        for entry in entries.flatten() {
            let path = entry.path();
            if !is_audio_artifact(&path) {
                continue;
            }
            let stale = entry
                .metadata()
                .and_then(|m| m.modified())
                .is_ok_and(|modified| is_stale(modified, now, retention));
            if stale {
                debug!(path = %path.display(), "Purging stale audio artifact");
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "Could not purge artifact");
                }
            }
        }
    }
}

fn is_audio_artifact(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp3") || e.eq_ignore_ascii_case("wav"))
}

fn is_stale(modified: SystemTime, now: SystemTime, retention: Duration) -> bool {
    now.duration_since(modified)
        .is_ok_and(|age| age > retention)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use domain::{SceneVisual, ScenePlan};

    use super::*;
    use crate::error::SpeechError;
    use crate::ports::SpeechSynthesis;
    use crate::probe::DurationProbe;
    use crate::quota::QuotaLedger;
    use crate::types::{AudioData, AudioFormat, TtsProvider};

    mockall::mock! {
        Provider {}

        #[async_trait]
        impl SpeechSynthesis for Provider {
            async fn synthesize(
                &self,
                text: &str,
                voice: Option<String>,
            ) -> Result<AudioData, SpeechError>;

            fn provider(&self) -> TtsProvider;
        }
    }

    fn scene(id: u32, narration: &str) -> Scene {
        Scene {
            id: SceneId::new(id),
            narration: narration.to_string(),
            planned_duration: 5.0,
            visual: SceneVisual::Text {
                heading: "Heading".to_string(),
                points: vec!["A point".to_string()],
            },
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        batch: SceneBatchSynthesizer,
        config: SpeechConfig,
    }

    fn fixture(mut mock: MockProvider) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = SpeechConfig {
            audio_dir: dir.path().join("audio"),
            state_file: dir.path().join("quota.json"),
            ..Default::default()
        };
        mock.expect_provider().return_const(TtsProvider::ElevenLabs);
        let ledger = Arc::new(QuotaLedger::load(&config.state_file, 10_000));
        let coordinator = HybridSynthesizer::new(
            Some(Arc::new(mock)),
            None,
            ledger,
            DurationProbe::new(),
            config.clone(),
        )
        .unwrap();
        Fixture {
            _dir: dir,
            batch: SceneBatchSynthesizer::new(Arc::new(coordinator), config.clone()),
            config,
        }
    }

    #[tokio::test]
    async fn every_scene_gets_exactly_one_outcome_in_order() {
        let mut mock = MockProvider::new();
        mock.expect_synthesize()
            .returning(|_, _| Ok(AudioData::new(vec![0u8; 32], AudioFormat::Mp3)));
        let fx = fixture(mock);

        let scenes = vec![
            scene(1, "The first narrated scene"),
            scene(2, "The second narrated scene"),
            scene(3, "The third narrated scene"),
        ];
        let report = fx.batch.synthesize_all(&scenes, &Language::english()).await;

        assert_eq!(report.outcomes().len(), 3);
        let ids: Vec<u32> = report
            .outcomes()
            .iter()
            .map(|o| o.scene_id().value())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(report.synthesized_count(), 3);
    }

    #[tokio::test]
    async fn short_narration_is_skipped_without_a_provider_call() {
        let mut mock = MockProvider::new();
        mock.expect_synthesize()
            .times(1)
            .returning(|_, _| Ok(AudioData::new(vec![0u8; 32], AudioFormat::Mp3)));
        let fx = fixture(mock);

        let scenes = vec![scene(1, "Hm"), scene(2, "A proper narration line")];
        let report = fx.batch.synthesize_all(&scenes, &Language::english()).await;

        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.synthesized_count(), 1);
        assert!(matches!(
            report.outcomes()[0],
            SceneOutcome::Skipped {
                reason: SkipReason::NarrationTooShort,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn whitespace_narration_is_skipped() {
        let mock = MockProvider::new();
        let fx = fixture(mock);

        let scenes = vec![scene(1, "         ")];
        let report = fx.batch.synthesize_all(&scenes, &Language::english()).await;

        assert_eq!(report.skipped_count(), 1);
        assert!(!report.has_audio());
    }

    #[tokio::test]
    async fn one_failing_scene_does_not_abort_the_batch() {
        let mut mock = MockProvider::new();
        let mut call = 0;
        mock.expect_synthesize().times(3).returning(move |_, _| {
            call += 1;
            if call == 2 {
                Err(SpeechError::SynthesisFailed("boom".to_string()))
            } else {
                Ok(AudioData::new(vec![0u8; 32], AudioFormat::Mp3))
            }
        });
        let fx = fixture(mock);

        let scenes = vec![
            scene(1, "First narrated scene"),
            scene(2, "Second narrated scene"),
            scene(3, "Third narrated scene"),
        ];
        let report = fx.batch.synthesize_all(&scenes, &Language::english()).await;

        assert_eq!(report.outcomes().len(), 3);
        assert_eq!(report.synthesized_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(matches!(
            report.outcomes()[1],
            SceneOutcome::Failed { scene_id, .. } if scene_id == SceneId::new(2)
        ));
    }

    #[tokio::test]
    async fn audio_accessor_keeps_plan_order() {
        let mut mock = MockProvider::new();
        mock.expect_synthesize()
            .returning(|_, _| Ok(AudioData::new(vec![0u8; 32], AudioFormat::Mp3)));
        let fx = fixture(mock);

        let scenes = vec![
            scene(1, "First narrated scene"),
            scene(2, "Hm"),
            scene(3, "Third narrated scene"),
        ];
        let report = fx.batch.synthesize_all(&scenes, &Language::english()).await;

        let audio = report.audio();
        assert_eq!(audio.len(), 2);
        assert_eq!(audio[0].scene_id, SceneId::new(1));
        assert_eq!(audio[1].scene_id, SceneId::new(3));
    }

    #[tokio::test]
    async fn fresh_artifacts_survive_the_purge() {
        let mut mock = MockProvider::new();
        mock.expect_synthesize()
            .returning(|_, _| Ok(AudioData::new(vec![0u8; 32], AudioFormat::Mp3)));
        let fx = fixture(mock);

        std::fs::create_dir_all(&fx.config.audio_dir).unwrap();
        let fresh = fx.config.audio_dir.join("el_123.mp3");
        std::fs::write(&fresh, b"audio").unwrap();
        let unrelated = fx.config.audio_dir.join("notes.txt");
        std::fs::write(&unrelated, b"keep").unwrap();

        let scenes = vec![scene(1, "A narrated scene")];
        fx.batch.synthesize_all(&scenes, &Language::english()).await;

        // Well inside the one-hour retention window.
        assert!(fresh.exists());
        assert!(unrelated.exists());
    }

    #[tokio::test]
    async fn empty_scene_list_yields_empty_report() {
        let mock = MockProvider::new();
        let fx = fixture(mock);

        let report = fx.batch.synthesize_all(&[], &Language::english()).await;

        assert!(report.outcomes().is_empty());
        assert!(!report.has_audio());
    }

    #[test]
    fn staleness_respects_the_retention_boundary() {
        let now = SystemTime::now();
        let retention = Duration::from_secs(3600);

        let old = now - Duration::from_secs(3601);
        let recent = now - Duration::from_secs(3599);

        assert!(is_stale(old, now, retention));
        assert!(!is_stale(recent, now, retention));
    }

    #[test]
    fn artifact_filter_matches_audio_extensions() {
        use std::path::Path;
        assert!(is_audio_artifact(Path::new("el_1.mp3")));
        assert!(is_audio_artifact(Path::new("oai_2.WAV")));
        assert!(!is_audio_artifact(Path::new("quota.json")));
        assert!(!is_audio_artifact(Path::new("noext")));
    }

    #[test]
    fn plan_validation_feeds_batch_input() {
        let plan = ScenePlan {
            title: "Demo".to_string(),
            scenes: vec![scene(1, "First"), scene(2, "Second")],
        };
        assert!(plan.validate().is_ok());
        assert_eq!(plan.scene_count(), 2);
    }
}
