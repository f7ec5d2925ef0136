//! Scene renderer
//!
//! Draws one styled visual clip per scene with FFmpeg's lavfi color
//! source plus drawbox/drawtext filters: dark slide background, accent
//! bars, centered wrapped text, keyed by scene kind. Diagram scenes
//! overlay a pre-rendered image when one is available and fall back to
//! a placeholder card otherwise. Every clip gets a short fade in/out
//! for visual continuity.

use std::path::Path;
use std::process::Stdio;

use domain::{SceneKind, SceneVisual};
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::config::CompositionConfig;
use crate::error::CompositionError;
use crate::timeline::RenderScene;

/// Slide palette
const BG_DARK: &str = "0x0f172a";
const BG_CARD: &str = "0x1e293b";
const ACCENT: &str = "0x3b82f6";
const TEXT_WHITE: &str = "0xf8fafc";
const TEXT_GRAY: &str = "0x94a3b8";

/// Font search order; the last entry relies on fontconfig
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
];

/// Renders a single scene to an MP4 segment
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    config: CompositionConfig,
}

impl SceneRenderer {
    /// Create a renderer over a composition config
    #[must_use]
    pub const fn new(config: CompositionConfig) -> Self {
        Self { config }
    }

    /// Render one scene's visual clip to `output`
    ///
    /// # Errors
    ///
    /// Returns `CompositionError::Launch` when FFmpeg cannot be started
    /// and `CompositionError::Render` when it exits unsuccessfully.
    #[instrument(skip(self, scene, diagram), fields(scene_id = %scene.scene.id, kind = %scene.scene.kind()))]
    pub async fn render(
        &self,
        scene: &RenderScene,
        diagram: Option<&Path>,
        output: &Path,
    ) -> Result<(), CompositionError> {
        let diagram = diagram.filter(|p| p.exists());
        let args = self.build_args(scene, diagram, output);
        debug!(duration_secs = scene.duration_secs, "Rendering scene clip");

        let result = Command::new(self.config.ffmpeg())
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CompositionError::Launch {
                tool: self.config.ffmpeg().to_string(),
                reason: e.to_string(),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(CompositionError::Render(format!(
                "FFmpeg exited with {} for scene {}: {}",
                result.status,
                scene.scene.id,
                last_lines(&stderr, 4)
            )));
        }

        Ok(())
    }

    /// Assemble the full FFmpeg argument list for one scene
    fn build_args(
        &self,
        scene: &RenderScene,
        diagram: Option<&Path>,
        output: &Path,
    ) -> Vec<String> {
        let duration = scene.duration_secs;
        let with_overlay = scene.scene.kind() == SceneKind::Diagram && diagram.is_some();

        let mut args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!(
                "color=c={BG_DARK}:s={}x{}:r={}:d={duration}",
                self.config.width, self.config.height, self.config.fps
            ),
        ];

        if with_overlay {
            if let Some(path) = diagram {
                args.push("-i".to_string());
                args.push(path.display().to_string());
            }
        }

        args.push("-filter_complex".to_string());
        args.push(self.filter_for(scene, with_overlay));

        args.extend([
            "-map".to_string(),
            "[v]".to_string(),
            "-t".to_string(),
            duration.to_string(),
            "-r".to_string(),
            self.config.fps.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-an".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "ultrafast".to_string(),
            output.display().to_string(),
        ]);

        args
    }

    /// Build the filter graph for a scene, keyed by its kind
    fn filter_for(&self, scene: &RenderScene, with_overlay: bool) -> String {
        let mut steps = match &scene.scene.visual {
            SceneVisual::Title { text } => self.title_filters(text),
            SceneVisual::Diagram { caption } => self.diagram_filters(caption, with_overlay),
            SceneVisual::Text { heading, points } => self.text_filters(heading, points),
            SceneVisual::Summary { text } => self.summary_filters(text),
        };

        steps.push(self.fade_filters(scene.duration_secs));
        let chain = steps.join(",");

        if with_overlay {
            // Diagram image scaled to fit the content area, centered
            // below the header band.
            let max_w = self.config.width - 80;
            let max_h = self.config.height - 220;
            format!(
                "[1:v]scale={max_w}:{max_h}:force_original_aspect_ratio=decrease[dg];\
                 [0:v][dg]overlay=(W-w)/2:100[bg];[bg]{chain}[v]"
            )
        } else {
            format!("[0:v]{chain}[v]")
        }
    }

    fn title_filters(&self, text: &str) -> Vec<String> {
        let h = i64::from(self.config.height);
        let mut steps = vec![
            accent_bar(0),
            accent_bar(h - 10),
        ];

        let lines = wrap_text(text, 35);
        let shown = &lines[..lines.len().min(3)];
        #[allow(clippy::cast_possible_wrap)]
        let y_start = h / 2 - (shown.len() as i64) * 40;
        for (i, line) in shown.iter().enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            let y = y_start + (i as i64) * 75;
            steps.push(drawtext(line, Position::Centered, y, 52, TEXT_WHITE));
        }

        steps.push(drawtext(
            "AI Generated Explanation",
            Position::Centered,
            h / 2 + 130,
            28,
            TEXT_GRAY,
        ));
        steps
    }

    fn diagram_filters(&self, caption: &str, with_overlay: bool) -> Vec<String> {
        let h = i64::from(self.config.height);
        let mut steps = vec![
            band(0, 90, BG_CARD),
            band(88, 2, ACCENT),
            drawtext("System Architecture", Position::Centered, 28, 38, ACCENT),
        ];

        if !with_overlay {
            steps.push(drawtext(
                "[ Process Diagram ]",
                Position::Centered,
                h / 2,
                48,
                TEXT_GRAY,
            ));
        }

        steps.push(band(h - 100, 100, BG_CARD));
        steps.push(band(h - 102, 2, ACCENT));

        let caption_lines = wrap_text(caption, 70);
        if let Some(line) = caption_lines.first().filter(|line| !line.trim().is_empty()) {
            steps.push(drawtext(line, Position::Centered, h - 70, 28, TEXT_WHITE));
        }
        steps
    }

    fn text_filters(&self, heading: &str, points: &[String]) -> Vec<String> {
        let mut steps = vec![
            band(0, 110, BG_CARD),
            band(108, 2, ACCENT),
            drawtext(heading, Position::Centered, 32, 44, ACCENT),
        ];

        for (i, point) in points.iter().take(3).enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            let y = 160 + (i as i64) * 155;
            steps.push(drawtext(
                &format!("{}.", i + 1),
                Position::At(80),
                y,
                32,
                ACCENT,
            ));

            let lines = wrap_text(point, 52);
            for (j, line) in lines.iter().take(2).enumerate() {
                #[allow(clippy::cast_possible_wrap)]
                let line_y = y + 5 + (j as i64) * 35;
                steps.push(drawtext(line, Position::At(155), line_y, 28, TEXT_WHITE));
            }
        }
        steps
    }

    fn summary_filters(&self, text: &str) -> Vec<String> {
        let w = i64::from(self.config.width);
        let h = i64::from(self.config.height);
        let padding = 100;

        let mut steps = vec![
            accent_bar(0),
            accent_bar(h - 10),
            format!(
                "drawbox=x={padding}:y={}:w={}:h=230:color={BG_CARD}:t=fill",
                h / 2 - 130,
                w - 2 * padding
            ),
            format!(
                "drawbox=x={padding}:y={}:w={}:h=230:color={ACCENT}:t=3",
                h / 2 - 130,
                w - 2 * padding
            ),
        ];

        let lines = wrap_text(text, 45);
        let shown = &lines[..lines.len().min(3)];
        #[allow(clippy::cast_possible_wrap)]
        let y_start = h / 2 - (shown.len() as i64) * 25;
        for (i, line) in shown.iter().enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            let y = y_start + (i as i64) * 52;
            steps.push(drawtext(line, Position::Centered, y, 36, TEXT_WHITE));
        }
        steps
    }

    fn fade_filters(&self, duration_secs: f64) -> String {
        let fade = self.config.fade_secs;
        let fade_out_start = (duration_secs - fade).max(0.0);
        format!("fade=t=in:st=0:d={fade},fade=t=out:st={fade_out_start}:d={fade}")
    }
}

/// Horizontal placement of a drawtext step
enum Position {
    Centered,
    At(i64),
}

fn band(y: i64, height: i64, color: &str) -> String {
    format!("drawbox=x=0:y={y}:w=iw:h={height}:color={color}:t=fill")
}

/// Full-width 10px accent strip
fn accent_bar(y: i64) -> String {
    band(y, 10, ACCENT)
}

fn drawtext(text: &str, x: Position, y: i64, size: u32, color: &str) -> String {
    let x = match x {
        Position::Centered => "(w-text_w)/2".to_string(),
        Position::At(px) => px.to_string(),
    };
    format!(
        "drawtext={}:text='{}':fontsize={size}:fontcolor={color}:x={x}:y={y}",
        font_arg(),
        escape_drawtext(text)
    )
}

/// Pick a concrete font file when one is installed, otherwise let
/// fontconfig resolve a sans face
fn font_arg() -> String {
    FONT_CANDIDATES
        .iter()
        .find(|p| Path::new(p).exists())
        .map_or_else(
            || "font=Sans".to_string(),
            |p| format!("fontfile={p}"),
        )
}

/// Escape characters that are meaningful inside a drawtext expression
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\u{2019}")
        .replace(':', "\\:")
        .replace(',', "\\,")
        .replace('%', "\\%")
}

/// Greedy word wrap capped at `max_chars` per line; always yields at
/// least one line so callers can index the head
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        // Long text with no words (all whitespace) wraps to nothing.
        lines.push(String::new());
    }
    lines
}

/// Trailing lines of a process's stderr, for error messages
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join(" | ")
}
