//! Dataset command implementation.

use crate::commands::types::DatasetCommand;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tunekit_training::DatasetCollector;

pub fn execute(command: DatasetCommand) -> Result<()> {
    match command {
        DatasetCommand::AddQa { question, answer, system, data } => {
            add_qa(&question, &answer, system.as_deref(), data)
        }
        DatasetCommand::Stats { data, json } => stats(data, json),
        DatasetCommand::Validate { data } => validate(data),
    }
}

fn add_qa(question: &str, answer: &str, system: Option<&str>, data: PathBuf) -> Result<()> {
    let mut collector = DatasetCollector::new(data);
    collector
        .load_existing()
        .with_context(|| format!("Failed to load {}", collector.output_path().display()))?;

    collector.add_simple_qa(question, answer, system).context("Invalid conversation")?;
    let written = collector.save().context("Failed to save dataset")?;

    println!();
    println!(
        "{} {} {}",
        "Saved".bold().green(),
        written.to_string().cyan(),
        format!("examples to {}", collector.output_path().display()).dimmed()
    );
    println!();
    Ok(())
}

fn stats(data: PathBuf, json_output: bool) -> Result<()> {
    let mut collector = DatasetCollector::new(data);
    collector
        .load_existing()
        .with_context(|| format!("Failed to load {}", collector.output_path().display()))?;
    let stats = collector.stats();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("{}", "Dataset Statistics".bold().cyan());
    println!();
    println!("  Total examples:      {}", stats.total_records.to_string().cyan());
    println!("  User messages:       {}", stats.user_messages.to_string().cyan());
    println!("  Assistant messages:  {}", stats.assistant_messages.to_string().cyan());
    println!(
        "  Average length:      {} messages",
        format!("{:.1}", stats.avg_messages_per_record).cyan()
    );
    println!();
    Ok(())
}

fn validate(data: PathBuf) -> Result<()> {
    let mut collector = DatasetCollector::new(data);

    if !collector.output_path().exists() {
        println!();
        println!(
            "  {}",
            format!("No dataset found at {}.", collector.output_path().display()).dimmed()
        );
        println!("  {}", "Tip: add examples with `tune dataset add-qa`.".dimmed());
        println!();
        return Ok(());
    }

    let loaded = collector
        .load_existing()
        .with_context(|| format!("Failed to parse {}", collector.output_path().display()))?;

    println!();
    println!(
        "{} {}",
        "Dataset OK".bold().green(),
        format!("({loaded} records)").dimmed()
    );
    println!();
    Ok(())
}
