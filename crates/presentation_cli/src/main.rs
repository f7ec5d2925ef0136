//! explaincast CLI
//!
//! Turns a planner-produced scene script into a narrated video:
//! hybrid text-to-speech with quota-aware failover, then scene
//! rendering synced to the measured narration lengths.

#![allow(clippy::print_stdout)]

mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use application::VideoGenerationService;
use clap::{Parser, Subcommand};
use composition::SceneComposer;
use domain::{Language, ScenePlan};
use settings::AppConfig;
use speech::{HybridSynthesizer, SceneBatchSynthesizer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// explaincast CLI
#[derive(Parser)]
#[command(name = "explaincast")]
#[command(author, version, about = "Narrated explainer video generator", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (TOML; defaults to ./explaincast.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a narrated video from a scene plan
    ///
    /// The plan is the upstream planner's JSON output: an ordered list
    /// of scenes with narration, planned durations and visual payloads.
    Generate {
        /// Path to the scene plan JSON file
        plan: PathBuf,

        /// Narration language (ISO 639-1)
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Pre-rendered diagram image used by diagram scenes
        #[arg(long)]
        diagram: Option<PathBuf>,
    },

    /// Show speech provider availability and quota figures
    Status,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Parse a planner-produced scene plan file
fn read_plan(path: &PathBuf) -> anyhow::Result<ScenePlan> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read plan {}: {e}", path.display()))?;
    let plan: ScenePlan = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Plan {} is not valid: {e}", path.display()))?;
    Ok(plan)
}

/// Wire the full service stack from configuration
fn build_service(config: AppConfig) -> anyhow::Result<VideoGenerationService> {
    let coordinator = Arc::new(HybridSynthesizer::from_config(config.speech.clone())?);
    let batch = SceneBatchSynthesizer::new(Arc::clone(&coordinator), config.speech);
    let composer = SceneComposer::new(config.composition);
    Ok(VideoGenerationService::new(coordinator, batch, composer))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter_from_verbosity(cli.verbose);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            plan,
            language,
            diagram,
        } => {
            let plan = read_plan(&plan)?;
            let service = build_service(config)?;

            println!("🎬 Generating \"{}\" ({} scenes)...", plan.title, plan.scene_count());

            match service
                .generate(&plan, &Language::new(language), diagram.as_deref())
                .await
            {
                Ok(result) => {
                    println!("✅ Video generated");
                    println!("   📁 {}", result.video.path.display());
                    println!("   ⏱️  {:.1}s across {} scenes", result.video.total_duration, result.video.scene_count);
                    println!(
                        "   🎙️  {} narrated, {} silent, {} failed",
                        result.synthesized, result.skipped, result.failed
                    );
                    if !result.is_fully_narrated() {
                        println!("   ⚠️  Some scenes rendered without narration");
                    }
                },
                Err(e) => {
                    println!("❌ Generation failed: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Status => {
            let service = build_service(config)?;
            let status = service.status();

            println!("📊 Speech Status:");
            println!("{}", serde_json::to_string_pretty(&status)?);
        },
    }

    Ok(())
}
