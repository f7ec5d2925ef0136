//! Duration reconciliation timeline
//!
//! Pure functions binding measured narration lengths onto the visual
//! plan. The planner's `ScenePlan` is immutable input; this module
//! produces derived `RenderScene` entries instead of mutating it.

use std::collections::HashMap;
use std::path::PathBuf;

use domain::{Scene, SceneId};
use speech::SceneAudio;

/// A scene with its final on-screen duration and optional narration
///
/// Derived from the plan once real audio exists; the measured audio
/// duration replaces the planner's estimate.
#[derive(Debug, Clone)]
pub struct RenderScene {
    /// The planned scene (visual payload and ordering key)
    pub scene: Scene,
    /// Final on-screen duration in seconds
    pub duration_secs: f64,
    /// Narration clip path, when this scene was synthesized
    pub audio_path: Option<PathBuf>,
}

impl RenderScene {
    /// Whether this scene carries narration
    #[must_use]
    pub const fn is_narrated(&self) -> bool {
        self.audio_path.is_some()
    }
}

/// Bind measured audio durations onto the plan, scene by scene
///
/// A scene with a synthesized clip takes the clip's measured duration;
/// the planner's estimate is discarded once real audio exists. Scenes
/// without audio (skipped or failed) keep the planner's estimate and
/// render silently. A clip whose duration could not be decoded (`0.0`)
/// also falls back to the estimate so no scene collapses to zero
/// screen time.
#[must_use]
pub fn bind_durations(scenes: &[Scene], audio: &[SceneAudio]) -> Vec<RenderScene> {
    let by_scene: HashMap<SceneId, &SceneAudio> =
        audio.iter().map(|clip| (clip.scene_id, clip)).collect();

    scenes
        .iter()
        .map(|scene| match by_scene.get(&scene.id) {
            Some(clip) => RenderScene {
                scene: scene.clone(),
                duration_secs: if clip.duration_secs > 0.0 {
                    clip.duration_secs
                } else {
                    scene.planned_duration
                },
                audio_path: Some(clip.path.clone()),
            },
            None => RenderScene {
                scene: scene.clone(),
                duration_secs: scene.planned_duration,
                audio_path: None,
            },
        })
        .collect()
}

/// Total timeline length before reconciliation
#[must_use]
pub fn total_duration(scenes: &[RenderScene]) -> f64 {
    scenes.iter().map(|s| s.duration_secs).sum()
}

/// Decide the final video duration against the authoritative audio track
///
/// Returns `Some(audio_secs)` when the tracks diverge by more than the
/// tolerance and the video must be forced to the audio length, `None`
/// when they already agree.
#[must_use]
pub fn reconciled_duration(video_secs: f64, audio_secs: f64, tolerance_secs: f64) -> Option<f64> {
    if (video_secs - audio_secs).abs() > tolerance_secs {
        Some(audio_secs)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use domain::SceneVisual;
    use speech::TtsProvider;

    use super::*;

    fn scene(id: u32, planned: f64) -> Scene {
        Scene {
            id: SceneId::new(id),
            narration: "Narration for this scene".to_string(),
            planned_duration: planned,
            visual: SceneVisual::Title {
                text: "Title".to_string(),
            },
        }
    }

    fn clip(id: u32, duration: f64) -> SceneAudio {
        SceneAudio {
            scene_id: SceneId::new(id),
            path: PathBuf::from(format!("outputs/audio/el_{id}.mp3")),
            duration_secs: duration,
            provider: TtsProvider::ElevenLabs,
            characters: 120,
        }
    }

    #[test]
    fn measured_duration_overwrites_planned() {
        let scenes = vec![scene(1, 5.0)];
        let audio = vec![clip(1, 12.3)];

        let bound = bind_durations(&scenes, &audio);

        assert!((bound[0].duration_secs - 12.3).abs() < f64::EPSILON);
        assert!(bound[0].is_narrated());
    }

    #[test]
    fn scene_without_audio_keeps_planner_estimate() {
        let scenes = vec![scene(1, 5.0), scene(2, 7.0)];
        let audio = vec![clip(1, 12.3)];

        let bound = bind_durations(&scenes, &audio);

        assert!((bound[1].duration_secs - 7.0).abs() < f64::EPSILON);
        assert!(!bound[1].is_narrated());
    }

    #[test]
    fn unmeasurable_clip_falls_back_to_planned() {
        let scenes = vec![scene(1, 5.0)];
        let audio = vec![clip(1, 0.0)];

        let bound = bind_durations(&scenes, &audio);

        // The clip still plays, but the visual holds the estimate
        // rather than collapsing to zero screen time.
        assert!((bound[0].duration_secs - 5.0).abs() < f64::EPSILON);
        assert!(bound[0].is_narrated());
    }

    #[test]
    fn binding_preserves_plan_order_and_ids() {
        let scenes = vec![scene(3, 4.0), scene(1, 4.0), scene(2, 4.0)];
        let audio = vec![clip(1, 6.0), clip(2, 6.0), clip(3, 6.0)];

        let bound = bind_durations(&scenes, &audio);

        let ids: Vec<u32> = bound.iter().map(|s| s.scene.id.value()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn input_plan_is_not_mutated() {
        let scenes = vec![scene(1, 5.0)];
        let audio = vec![clip(1, 12.3)];

        let _ = bind_durations(&scenes, &audio);

        assert!((scenes[0].planned_duration - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_is_the_sum_of_bound_durations() {
        let scenes = vec![scene(1, 4.0), scene(2, 5.0), scene(3, 10.0), scene(4, 4.0)];
        let audio = vec![clip(2, 12.3), clip(3, 10.5)];

        let bound = bind_durations(&scenes, &audio);

        assert!((total_duration(&bound) - 30.8).abs() < 1e-9);
    }

    #[test]
    fn small_track_mismatch_is_tolerated() {
        assert_eq!(reconciled_duration(30.8, 30.75, 0.1), None);
        assert_eq!(reconciled_duration(30.8, 30.8, 0.1), None);
    }

    #[test]
    fn large_track_mismatch_forces_audio_duration() {
        assert_eq!(reconciled_duration(30.8, 28.0, 0.1), Some(28.0));
        assert_eq!(reconciled_duration(28.0, 30.8, 0.1), Some(30.8));
    }
}
