//! Tunekit CLI - dataset curation, fine-tuning jobs, and model publishing
//!
//! This CLI provides a `tune` command for collecting conversation datasets,
//! driving fine-tuning jobs through an external training pipeline, and
//! publishing trained artifacts to a hosted model registry.

mod commands;

use clap::Parser;
use commands::types::{DatasetCommand, PublishArgs, TrainCommand};
use commands::{dataset, publish, train};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Tunekit - fine-tuning pipeline tooling
#[derive(Parser, Debug)]
#[command(
    name = "tune",
    author,
    version,
    about = "Tunekit - dataset curation, fine-tuning jobs, and model publishing",
    long_about = "Tunekit (tune) wraps an external fine-tuning ecosystem with explicit,\nvalidated configuration: collect conversation datasets, run adapter training\njobs, and publish the results to a model registry."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Collect and inspect training conversations
    #[command(subcommand)]
    Dataset(DatasetCommand),

    /// Configure and run fine-tuning jobs
    #[command(subcommand)]
    Train(TrainCommand),

    /// Publish a trained model directory to the hub
    Publish(PublishArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Dataset(cmd) => dataset::execute(cmd)?,
        Command::Train(cmd) => train::execute(cmd).await?,
        Command::Publish(cmd) => publish::execute(cmd).await?,
    }

    Ok(())
}
