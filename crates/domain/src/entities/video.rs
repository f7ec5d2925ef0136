//! Composed video summary

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Summary of the final encoded artifact
///
/// Derived, not persisted: the artifact itself is a file on disk and
/// this struct is the summary returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedVideo {
    /// Path to the encoded MP4
    pub path: PathBuf,
    /// Total duration in seconds after reconciliation
    pub total_duration: f64,
    /// Number of scenes rendered
    pub scene_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_path() {
        let video = ComposedVideo {
            path: PathBuf::from("outputs/video/video_1700000000.mp4"),
            total_duration: 30.8,
            scene_count: 4,
        };

        let json = serde_json::to_string(&video).unwrap();
        assert!(json.contains("video_1700000000.mp4"));
        assert!(json.contains("30.8"));
    }
}
