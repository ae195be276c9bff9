//! procwatch - process telemetry quality control
//!
//! # Usage
//!
//! ```bash
//! # Poll JSON frames from stdin
//! sensor-feed | procwatch acquire
//!
//! # Replay a captured session
//! procwatch --config plant.toml acquire --input session.jsonl
//!
//! # Assess equipment condition from sensor frames
//! procwatch assess --input frames.jsonl
//!
//! # Print the effective configuration
//! procwatch check-config
//! ```
//!
//! # Environment Variables
//!
//! - `PROCWATCH_CONFIG`: Config file path when `--config` is not given
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

use procwatch::acquisition::JsonLinesTransport;
use procwatch::classification::{ClassificationEngine, JsonLinesFeatureSource};
use procwatch::config::PipelineConfig;
use procwatch::pipeline::{AcquisitionLoop, SessionOutcome};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "procwatch")]
#[command(about = "Process telemetry quality control and condition assessment")]
#[command(version)]
struct CliArgs {
    /// Path to procwatch.toml (falls back to $PROCWATCH_CONFIG, then ./procwatch.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Poll readings, track SPC limits and forward batches
    Acquire {
        /// JSON-lines frame file (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Score sensor frames and classify equipment health
    Assess {
        /// JSON-lines sensor frame file
        #[arg(long)]
        input: PathBuf,
    },

    /// Validate configuration and print the effective TOML
    CheckConfig,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = PipelineConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, stopping after the current iteration...");
        shutdown_token.cancel();
    });

    match args.command {
        SubCommand::Acquire { input } => run_acquire(&config, input, cancel_token).await,
        SubCommand::Assess { input } => run_assess(&config, &input, cancel_token).await,
        SubCommand::CheckConfig => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

// ============================================================================
// Subcommands
// ============================================================================

async fn run_acquire(
    config: &PipelineConfig,
    input: Option<PathBuf>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  procwatch - {} ({})", config.station.name, config.station.device_id);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let transport = match input {
        Some(path) => {
            info!("📥 Input: {}", path.display());
            JsonLinesTransport::file(path)
        }
        None => {
            info!("📥 Input: stdin (JSON frames)");
            JsonLinesTransport::stdin()
        }
    };

    let mut acquisition = AcquisitionLoop::new(transport, config);
    acquisition.connect().await?;
    let report = acquisition.run(cancel_token).await?;

    match report.outcome {
        SessionOutcome::Stopped { reason } => {
            info!(
                ?reason,
                measurements = report.stats.measurements,
                alarms = report.stats.alarms,
                "Session stopped"
            );
            Ok(())
        }
        SessionOutcome::SafeMode {
            consecutive_errors,
            last_fault,
        } => Err(anyhow::anyhow!(
            "Acquisition entered safe mode after {} consecutive faults (last: {})",
            consecutive_errors,
            last_fault
        )),
    }
}

async fn run_assess(config: &PipelineConfig, input: &Path, cancel_token: CancellationToken) -> Result<()> {
    let mut source = JsonLinesFeatureSource::open(input)
        .await
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let mut engine = ClassificationEngine::from_config(config);

    let summary = engine.run(&mut source, cancel_token).await?;
    if let Some(latest) = engine.latest() {
        println!("{}", serde_json::to_string_pretty(latest)?);
    }
    info!(
        frames = summary.frames,
        anomalies = summary.anomalies,
        skipped = source.skipped(),
        "Assessment complete"
    );
    Ok(())
}
