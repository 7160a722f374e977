//! Krisis CLI - Assess captured agent traces from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use krisis_core::prelude::*;

#[derive(Parser)]
#[command(name = "krisis")]
#[command(about = "Agent trace quality assessment CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a captured trace with the default judge suite
    Assess {
        /// Path to a trace record JSON file
        trace: PathBuf,

        /// Path to a krisis.toml configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit the full report as pretty JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List the judges in the default suite
    Judges,
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("krisis {}", env!("CARGO_PKG_VERSION"));
            println!("krisis-core {}", krisis_core::VERSION);
        }
        Commands::Judges => {
            let registry = JudgeRegistry::with_default_suite();
            for judge in registry.list() {
                println!("{:<24} {:?}", judge.name(), judge.category());
            }
        }
        Commands::Assess {
            trace,
            config,
            json,
        } => {
            let config = match config {
                Some(path) => AssessmentConfig::from_file(path)?,
                None => AssessmentConfig::load()?,
            };

            let raw = std::fs::read_to_string(&trace)
                .with_context(|| format!("failed to read trace file {}", trace.display()))?;
            let record = TraceRecord::from_json(&raw).context("failed to parse trace record")?;

            let registry = Arc::new(JudgeRegistry::with_default_suite());
            let store = Arc::new(InMemoryReportStore::new());
            let queue = Arc::new(InMemoryReviewQueue::new());
            let pipeline = AssessmentPipeline::new(registry.clone(), &config, store, queue);

            tracing::info!(
                trace_id = %record.trace_id(),
                judges = registry.len(),
                "starting assessment"
            );
            let outcome = pipeline.process(&record).await?;
            tracing::info!(
                trace_id = %record.trace_id(),
                verdict = ?outcome.report.verdict,
                escalated = outcome.decision.escalated,
                "assessment complete"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            } else {
                println!("{}", outcome.report.to_summary());
            }
            println!();
            if outcome.decision.escalated {
                println!(
                    "Escalated for review ({:?} priority): {}",
                    outcome.decision.priority,
                    outcome.decision.reasons.join(", ")
                );
            } else {
                println!("Archived without review");
            }

            if outcome.report.verdict == Verdict::Fail {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
