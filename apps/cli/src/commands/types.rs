//! Command type definitions shared between main.rs and tests.

use clap::{Args, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_DATASET_PATH: &str = "data/training_data.jsonl";

#[derive(Subcommand, Debug, Clone)]
pub enum DatasetCommand {
    /// Append a question/answer pair to the dataset
    AddQa {
        /// User question
        #[arg(long)]
        question: String,

        /// Assistant answer
        #[arg(long)]
        answer: String,

        /// Optional leading system prompt
        #[arg(long)]
        system: Option<String>,

        /// Dataset file (line-delimited JSON)
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        data: PathBuf,
    },

    /// Show dataset statistics
    Stats {
        /// Dataset file (line-delimited JSON)
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        data: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reload the dataset and report parse problems
    Validate {
        /// Dataset file (line-delimited JSON)
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        data: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TrainCommand {
    /// Write a fine-tune config template
    InitConfig {
        /// Target path for the template
        #[arg(default_value = "finetune.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run a fine-tuning job from a config file
    Run {
        /// Fine-tune config (TOML)
        #[arg(long)]
        config: PathBuf,

        /// Output the manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// List trained models in this workspace
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Trained model directory, or trained:<job_id> from `tune train list`
    #[arg(long)]
    pub model: String,

    /// Hub repository id (namespace/name)
    #[arg(long)]
    pub repo: String,

    /// Model version tag
    #[arg(long, default_value = "v0.1.0")]
    pub version: String,

    /// Base model for the model card (defaults to the job manifest's)
    #[arg(long)]
    pub base_model: Option<String>,

    /// Create the repository as private
    #[arg(long)]
    pub private: bool,

    /// Hub token (falls back to the HF_TOKEN environment variable)
    #[arg(long)]
    pub token: Option<String>,

    /// Output the publish report as JSON
    #[arg(long)]
    pub json: bool,
}
