//! Configuration for video composition

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for scene rendering and final encoding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// Output frame width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output frame height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Fade in/out length applied to every scene clip, in seconds
    #[serde(default = "default_fade_secs")]
    pub fade_secs: f64,

    /// Maximum tolerated difference between total video and audio
    /// length before the video is forced to the audio duration
    #[serde(default = "default_sync_tolerance_secs")]
    pub sync_tolerance_secs: f64,

    /// Video bitrate passed to the encoder
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,

    /// Directory for the final video artifact (segments are staged in
    /// a `temp` subdirectory)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// FFmpeg binary path (defaults to "ffmpeg" in PATH)
    #[serde(default)]
    pub ffmpeg_path: Option<String>,

    /// ffprobe binary path (defaults to "ffprobe" in PATH)
    #[serde(default)]
    pub ffprobe_path: Option<String>,
}

const fn default_width() -> u32 {
    1280
}

const fn default_height() -> u32 {
    720
}

const fn default_fps() -> u32 {
    24
}

const fn default_fade_secs() -> f64 {
    0.3
}

const fn default_sync_tolerance_secs() -> f64 {
    0.1
}

fn default_video_bitrate() -> String {
    "3000k".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs/video")
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            fade_secs: default_fade_secs(),
            sync_tolerance_secs: default_sync_tolerance_secs(),
            video_bitrate: default_video_bitrate(),
            output_dir: default_output_dir(),
            ffmpeg_path: None,
            ffprobe_path: None,
        }
    }
}

impl CompositionConfig {
    /// The FFmpeg binary to invoke
    #[must_use]
    pub fn ffmpeg(&self) -> &str {
        self.ffmpeg_path.as_deref().unwrap_or("ffmpeg")
    }

    /// The ffprobe binary to invoke
    #[must_use]
    pub fn ffprobe(&self) -> &str {
        self.ffprobe_path.as_deref().unwrap_or("ffprobe")
    }

    /// Staging directory for per-scene segments and concat lists
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.output_dir.join("temp")
    }
}
