//! Training command implementation.

use crate::commands::types::TrainCommand;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tunekit_training::{
    discover_trained_models, FineTuneConfig, NullProgressSink, ProcessTrainer, ProgressSink,
    StdoutProgressSink, Trainer, TrainingJobSpec,
};

const CONFIG_TEMPLATE: &str = r#"# Tunekit fine-tune configuration.

base_model = "meta-llama/Llama-2-7b-chat-hf"
model_name = "my-model-7b"
version = "v0.1.0"
dataset_path = "data/training_data.jsonl"
quantization = "int8" # none | int8 | int4

[adapter]
rank = 16
alpha = 32.0
dropout = 0.05
target_modules = ["q_proj", "v_proj", "k_proj", "o_proj"]

[hyperparams]
seed = 42
epochs = 3
batch_size = 4
gradient_accumulation_steps = 4
learning_rate = 2e-4
max_seq_len = 512
warmup_steps = 50

[tracking]
enabled = false
project = "tunekit"

[trainer]
# Command that executes the training loop. The job config path and adapter
# output directory are appended as `--config <path> --output-dir <dir>`.
command = ["python3", "train.py"]
"#;

pub async fn execute(command: TrainCommand) -> Result<()> {
    match command {
        TrainCommand::InitConfig { path, force } => init_config(path, force),
        TrainCommand::Run { config, json } => run(config, json).await,
        TrainCommand::List { json } => list(json),
    }
}

fn init_config(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, CONFIG_TEMPLATE)?;

    println!();
    println!("{}", "Fine-tune config template written".bold().green());
    println!("  Path: {}", path.display().to_string().cyan());
    println!();
    println!("  {}", "Next: edit the template, then run `tune train run --config <path>`.".dimmed());
    println!();
    Ok(())
}

async fn run(config_path: PathBuf, json_output: bool) -> Result<()> {
    let config = FineTuneConfig::from_toml_path(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    config.validate().context("Invalid fine-tune config")?;

    let workspace_root = std::env::current_dir()?;
    let trainer = ProcessTrainer::new(workspace_root);
    let job = TrainingJobSpec::new(config);

    // Keep stdout machine-readable when the manifest itself is the output.
    let progress: &dyn ProgressSink =
        if json_output { &NullProgressSink } else { &StdoutProgressSink };

    trainer.prepare(&job).await?;
    let manifest = trainer.run(&job, progress).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!();
    println!("{}", "Training complete".bold().green());
    println!("  Job: {}", manifest.job_id.to_string().cyan());
    println!("  Base model: {}", manifest.base_model.cyan());
    if let Some(loss) = manifest.metrics.train_loss {
        println!("  Train loss: {}", format!("{loss:.4}").cyan());
    }
    println!(
        "  Use: {}",
        format!("tune publish --model trained:{} --repo <namespace/name>", manifest.job_id)
            .dimmed()
    );
    println!();
    Ok(())
}

fn list(json_output: bool) -> Result<()> {
    let workspace_root = std::env::current_dir()?;
    let models =
        discover_trained_models(&workspace_root).context("Failed to discover trained models")?;

    if json_output {
        let out: Vec<_> = models
            .into_iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.trained_model_id,
                    "adapter_dir": m.adapter_dir,
                    "job_id": m.manifest.job_id.0,
                    "created_at": m.manifest.created_at,
                    "base_model": m.manifest.base_model,
                    "dataset_id": m.manifest.dataset_id.0,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Trained Models ({})", models.len()).bold().cyan());
    println!();

    if models.is_empty() {
        println!("  {}", "No trained models found for this workspace.".dimmed());
        println!();
        println!(
            "  {}",
            "Tip: run `tune train run --config finetune.toml` to produce one.".dimmed()
        );
        return Ok(());
    }

    println!("{:<44} {:<34} {}", "ID", "Base model", "Adapter");
    println!("{}", "─".repeat(100));
    for m in models {
        println!(
            "{:<44} {:<34} {}",
            m.trained_model_id.cyan(),
            m.manifest.base_model.dimmed(),
            m.adapter_dir.display().to_string().dimmed()
        );
    }
    println!();
    Ok(())
}
