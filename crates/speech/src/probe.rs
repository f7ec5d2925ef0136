//! Audio duration probe
//!
//! Decodes a produced audio file with `ffprobe` to obtain its real
//! duration. The measured value is authoritative for scene timing; the
//! words-per-second estimate is logged for comparison only. When
//! decoding fails the probe degrades to `0.0` rather than failing the
//! synthesis call.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Average narration pace used for the illustrative estimate only
const WORDS_PER_SECOND: f64 = 2.5;

/// Probes audio files for their decoded duration
///
/// Requires `ffprobe` (ships with FFmpeg) on the system.
#[derive(Debug, Clone, Default)]
pub struct DurationProbe {
    /// ffprobe binary path (defaults to "ffprobe" in PATH)
    ffprobe_path: Option<String>,
}

impl DurationProbe {
    /// Create a probe using `ffprobe` from PATH
    #[must_use]
    pub const fn new() -> Self {
        Self { ffprobe_path: None }
    }

    /// Create a probe with a custom ffprobe path
    #[must_use]
    pub fn with_ffprobe_path(path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: Some(path.into()),
        }
    }

    fn ffprobe_path(&self) -> &str {
        self.ffprobe_path.as_deref().unwrap_or("ffprobe")
    }

    /// Measure the duration of an audio file in seconds
    ///
    /// Returns `0.0` when the file cannot be decoded; the caller logs
    /// and carries on with degraded timing rather than failing.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn duration_secs(&self, path: &Path) -> f64 {
        match self.try_duration(path).await {
            Ok(secs) => {
                debug!(duration_secs = secs, "Measured audio duration");
                secs
            },
            Err(e) => {
                warn!(error = %e, "Could not decode audio duration, using 0.0");
                0.0
            },
        }
    }

    async fn try_duration(&self, path: &Path) -> Result<f64, String> {
        let output = Command::new(self.ffprobe_path())
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| format!("Failed to run ffprobe: {e}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "ffprobe exited with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("Unparseable ffprobe duration '{}': {e}", stdout.trim()))
    }
}

/// Words-per-second duration estimate, logged alongside the measured value
#[must_use]
pub fn estimate_secs(text: &str) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let words = text.split_whitespace().count() as f64;
    words / WORDS_PER_SECOND
}
