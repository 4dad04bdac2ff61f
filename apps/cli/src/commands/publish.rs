//! Publish command implementation.

use crate::commands::types::PublishArgs;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tunekit_hub::{publish, HttpHubClient, ModelCard, PublishSpec};
use tunekit_training::resolve_trained_model;

pub async fn execute(args: PublishArgs) -> Result<()> {
    let (artifact_dir, manifest_base_model) = resolve_model(&args.model)?;

    let base_model = args
        .base_model
        .or(manifest_base_model)
        .context("No base model known; pass --base-model")?;

    let model_name = args
        .repo
        .split('/')
        .next_back()
        .unwrap_or(args.repo.as_str())
        .to_string();

    let spec = PublishSpec {
        artifact_dir,
        repo_id: args.repo.clone(),
        version: args.version.clone(),
        private: args.private,
    };
    let card = ModelCard::new(&args.repo, model_name, base_model, &args.version);

    let client = HttpHubClient::new(args.token)?;
    let report = publish(&spec, &card, &client).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("{}", "Model published".bold().green());
    println!("  Repo: {}", report.repo_url.cyan());
    println!("  Files uploaded: {}", report.files_uploaded.to_string().cyan());
    println!();
    Ok(())
}

/// A `--model` argument is either a directory or a `trained:<job_id>` id
/// resolved through the local training registry.
fn resolve_model(model: &str) -> Result<(PathBuf, Option<String>)> {
    if model.starts_with("trained:") {
        let workspace_root = std::env::current_dir()?;
        let entry = resolve_trained_model(&workspace_root, model)
            .context("Failed to resolve trained model")?;
        return Ok((entry.adapter_dir, Some(entry.manifest.base_model)));
    }
    Ok((PathBuf::from(model), None))
}
