//! Scene composer
//!
//! Assembles the final artifact: renders one segment per scene,
//! concatenates video segments and narration clips in plan order,
//! reconciles the two track lengths (audio is authoritative) and muxes
//! to a single timestamped MP4. Runs strictly after the synthesis
//! batch has settled; concatenation order is plan order.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use domain::{ComposedVideo, Scene};
use speech::SceneAudio;
use speech::probe::DurationProbe;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::config::CompositionConfig;
use crate::error::CompositionError;
use crate::renderer::SceneRenderer;
use crate::timeline::{RenderScene, bind_durations, reconciled_duration, total_duration};

/// Which pipeline stage an FFmpeg run belongs to, for error mapping
#[derive(Debug, Clone, Copy)]
enum Stage {
    Concat,
    Encode,
}

/// Composes rendered scenes and narration into the final video
#[derive(Debug, Clone)]
pub struct SceneComposer {
    renderer: SceneRenderer,
    probe: DurationProbe,
    config: CompositionConfig,
}

impl SceneComposer {
    /// Create a composer over a composition config
    #[must_use]
    pub fn new(config: CompositionConfig) -> Self {
        let probe = DurationProbe::with_ffprobe_path(config.ffprobe());
        Self {
            renderer: SceneRenderer::new(config.clone()),
            probe,
            config,
        }
    }

    /// Compose the scenes and their narration clips into one MP4
    ///
    /// Scenes without narration render silently for their planned
    /// duration; the output is silent when no clip exists at all.
    ///
    /// # Errors
    ///
    /// Any render, concatenation or encode failure is fatal and no
    /// partial artifact is returned.
    #[instrument(skip_all, fields(scene_count = scenes.len(), clip_count = audio.len()))]
    pub async fn compose(
        &self,
        scenes: &[Scene],
        audio: &[SceneAudio],
        diagram: Option<&Path>,
    ) -> Result<ComposedVideo, CompositionError> {
        let bound = bind_durations(scenes, audio);
        info!(
            timeline_secs = total_duration(&bound),
            "Composing video from bound timeline"
        );

        let temp_dir = self.config.temp_dir();
        tokio::fs::create_dir_all(&temp_dir).await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let mut staged: Vec<PathBuf> = Vec::new();
        let result = self.compose_inner(&bound, diagram, &temp_dir, &mut staged).await;

        for path in staged {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                debug!(path = %path.display(), error = %e, "Leaving staged file behind");
            }
        }

        result
    }

    async fn compose_inner(
        &self,
        bound: &[RenderScene],
        diagram: Option<&Path>,
        temp_dir: &Path,
        staged: &mut Vec<PathBuf>,
    ) -> Result<ComposedVideo, CompositionError> {
        // One visual segment per scene, plan order
        let mut segments = Vec::with_capacity(bound.len());
        for (i, scene) in bound.iter().enumerate() {
            let segment = temp_dir.join(format!("segment_{i}.mp4"));
            self.renderer.render(scene, diagram, &segment).await?;
            staged.push(segment.clone());
            segments.push(segment);
        }

        let merged_video = temp_dir.join("merged.mp4");
        self.concat(&segments, temp_dir, "video_concat.txt", &merged_video, staged)
            .await?;
        staged.push(merged_video.clone());

        let clips: Vec<PathBuf> = bound
            .iter()
            .filter_map(|s| s.audio_path.clone())
            .collect();

        let output_path = self
            .config
            .output_dir
            .join(artifact_name(chrono::Utc::now().timestamp()));

        if clips.is_empty() {
            // No narration at all: the silent video track is the artifact.
            warn!("No narration clips bound, producing silent video");
            tokio::fs::rename(&merged_video, &output_path).await?;
        } else {
            let merged_audio = temp_dir.join("merged.mp3");
            self.concat(&clips, temp_dir, "audio_concat.txt", &merged_audio, staged)
                .await?;
            staged.push(merged_audio.clone());

            self.mux(&merged_video, &merged_audio, &output_path).await?;
        }

        let total = self.probe.duration_secs(&output_path).await;
        info!(path = %output_path.display(), total_secs = total, "Video composed");

        Ok(ComposedVideo {
            path: output_path,
            total_duration: total,
            scene_count: bound.len(),
        })
    }

    /// Concatenate media files with the concat demuxer, stream copy
    async fn concat(
        &self,
        inputs: &[PathBuf],
        temp_dir: &Path,
        list_name: &str,
        output: &Path,
        staged: &mut Vec<PathBuf>,
    ) -> Result<(), CompositionError> {
        let mut manifest = String::new();
        for input in inputs {
            let absolute = input.canonicalize()?;
            manifest.push_str(&concat_entry(&absolute));
        }

        let list_path = temp_dir.join(list_name);
        tokio::fs::write(&list_path, manifest).await?;
        staged.push(list_path.clone());

        self.run_ffmpeg(
            &[
                "-y",
                "-f",
                "concat",
                "-safe",
                "0",
                "-i",
                &list_path.display().to_string(),
                "-c",
                "copy",
                &output.display().to_string(),
            ],
            Stage::Concat,
        )
        .await
    }

    /// Bind the audio track onto the video track, reconciling lengths
    async fn mux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), CompositionError> {
        let video_secs = self.probe.duration_secs(video).await;
        let audio_secs = self.probe.duration_secs(audio).await;

        let video_arg = video.display().to_string();
        let audio_arg = audio.display().to_string();
        let output_arg = output.display().to_string();

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-i".into(),
            video_arg,
            "-i".into(),
            audio_arg,
        ];

        match reconciled_duration(video_secs, audio_secs, self.config.sync_tolerance_secs) {
            None => {
                args.extend(["-map".into(), "0:v:0".into(), "-c:v".into(), "copy".into()]);
            },
            Some(target) if video_secs > target => {
                // Video runs long: cut it to the audio length.
                info!(video_secs, audio_secs, "Trimming video to audio length");
                args.extend([
                    "-map".into(),
                    "0:v:0".into(),
                    "-c:v".into(),
                    "copy".into(),
                    "-t".into(),
                    target.to_string(),
                ]);
            },
            Some(target) => {
                // Video runs short: hold the last frame until the
                // narration finishes.
                let pad = target - video_secs;
                info!(video_secs, audio_secs, "Extending video to audio length");
                args.extend([
                    "-filter_complex".into(),
                    format!("[0:v]tpad=stop_mode=clone:stop_duration={pad}[v]"),
                    "-map".into(),
                    "[v]".into(),
                    "-c:v".into(),
                    "libx264".into(),
                    "-preset".into(),
                    "ultrafast".into(),
                    "-b:v".into(),
                    self.config.video_bitrate.clone(),
                ]);
            },
        }

        args.extend([
            "-map".into(),
            "1:a:0".into(),
            "-c:a".into(),
            "aac".into(),
            output_arg,
        ]);

        let borrowed: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_ffmpeg(&borrowed, Stage::Encode).await
    }

    async fn run_ffmpeg(&self, args: &[&str], stage: Stage) -> Result<(), CompositionError> {
        let output = Command::new(self.config.ffmpeg())
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CompositionError::Launch {
                tool: self.config.ffmpeg().to_string(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = format!("FFmpeg exited with {}: {}", output.status, stderr.trim());
        Err(match stage {
            Stage::Concat => CompositionError::Concat(detail),
            Stage::Encode => CompositionError::Encode(detail),
        })
    }
}

/// Timestamped artifact file name
fn artifact_name(timestamp: i64) -> String {
    format!("video_{timestamp}.mp4")
}

/// One line of a concat demuxer list
fn concat_entry(path: &Path) -> String {
    format!("file '{}'\n", path.display())
}

#[cfg(test)]
mod tests {
    use domain::{SceneId, SceneVisual};

    use super::*;

    #[test]
    fn artifact_name_is_timestamped_mp4() {
        assert_eq!(artifact_name(1_700_000_000), "video_1700000000.mp4");
    }

    #[test]
    fn concat_entries_quote_absolute_paths() {
        let entry = concat_entry(Path::new("/tmp/work/segment_0.mp4"));
        assert_eq!(entry, "file '/tmp/work/segment_0.mp4'\n");
    }

    #[tokio::test]
    async fn missing_ffmpeg_fails_before_any_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompositionConfig {
            output_dir: dir.path().to_path_buf(),
            ffmpeg_path: Some("/nonexistent/ffmpeg".to_string()),
            ffprobe_path: Some("/nonexistent/ffprobe".to_string()),
            ..Default::default()
        };
        let composer = SceneComposer::new(config);

        let scenes = vec![Scene {
            id: SceneId::new(1),
            narration: "Some narration".to_string(),
            planned_duration: 5.0,
            visual: SceneVisual::Title {
                text: "Title".to_string(),
            },
        }];

        let result = composer.compose(&scenes, &[], None).await;

        assert!(matches!(result, Err(CompositionError::Launch { .. })));
        // No partial artifact may be left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.path().extension().is_some_and(|x| x == "mp4"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
