use crate::artifacts::{
    make_artifact, read_metrics_file, ArtifactKind, TrainingManifest, TrainingMetrics,
};
use crate::collector::{write_jsonl_records, DatasetCollector};
use crate::dataset::{compute_dataset_id, validate_conversation};
use crate::error::{TrainingError, TrainingResult};
use crate::job::{FineTuneConfig, TrainingJobId, TrainingJobSpec};
use crate::layout::TrainingLayout;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::trainer::{Trainer, TrainerStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use walkdir::WalkDir;

/// Fine-tuning driver that sequences dataset loading, config snapshotting,
/// and artifact collection around an external training command.
///
/// The training loop itself always runs in the collaborator process named by
/// `trainer.command`; this type never touches model weights.
#[derive(Clone)]
pub struct ProcessTrainer {
    workspace_root: PathBuf,
    statuses: Arc<Mutex<HashMap<String, TrainerStatus>>>,
}

impl ProcessTrainer {
    #[must_use]
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root, statuses: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn layout_for(&self, config: &FineTuneConfig) -> TrainingLayout {
        config.output_dir.as_ref().map_or_else(
            || TrainingLayout::for_workspace_root(&self.workspace_root),
            |dir| TrainingLayout::new(dir.clone()),
        )
    }

    fn set_status(&self, job_id: &TrainingJobId, status: TrainerStatus) {
        if let Ok(mut s) = self.statuses.lock() {
            s.insert(job_id.0.clone(), status);
        }
    }

    fn fail(&self, job_id: &TrainingJobId, err: TrainingError) -> TrainingError {
        self.set_status(job_id, TrainerStatus::Failed(err.to_string()));
        err
    }
}

/// Run record written when tracking is enabled.
#[derive(Debug, Serialize)]
struct TrackingRun<'a> {
    run_id: &'a str,
    project: &'a str,
    params: serde_json::Value,
    metrics: &'a TrainingMetrics,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> TrainingResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load the collector-produced dataset and re-check every record.
fn load_dataset(config: &FineTuneConfig) -> TrainingResult<DatasetCollector> {
    let mut collector = DatasetCollector::new(&config.dataset_path);
    let loaded = collector.load_existing()?;
    if loaded == 0 {
        return Err(TrainingError::Dataset(format!(
            "no training records found at {}",
            config.dataset_path.display()
        )));
    }
    for (idx, record) in collector.records().iter().enumerate() {
        validate_conversation(&record.messages).map_err(|e| {
            TrainingError::Dataset(format!("record {} is invalid: {e}", idx + 1))
        })?;
    }
    Ok(collector)
}

async fn spawn_trainer_command(
    config: &FineTuneConfig,
    config_path: &Path,
    adapter_dir: &Path,
    job_id: &TrainingJobId,
    progress: &dyn ProgressSink,
) -> TrainingResult<()> {
    let command = &config.trainer.command;
    let mut child = tokio::process::Command::new(&command[0])
        .args(&command[1..])
        .arg("--config")
        .arg(config_path)
        .arg("--output-dir")
        .arg(adapter_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TrainingError::Trainer(format!("failed to spawn {}: {e}", command[0])))?;

    // Drain stderr on its own task so neither pipe can fill up and block
    // the child while we stream the other one.
    let stderr_task = child.stderr.take().map(|stderr| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            progress.on_event(ProgressEvent::TrainerOutput {
                job_id: job_id.clone(),
                line,
            });
        }
    }

    let stderr_tail = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    let status = child.wait().await?;
    if !status.success() {
        let detail = stderr_tail.trim();
        return Err(TrainingError::Trainer(format!(
            "trainer command exited with {status}{}",
            if detail.is_empty() { String::new() } else { format!(": {detail}") }
        )));
    }
    Ok(())
}

fn classify_adapter_file(path: &Path) -> ArtifactKind {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if name.contains("tokenizer") {
        ArtifactKind::Tokenizer
    } else if name.ends_with("config.json") {
        ArtifactKind::Config
    } else {
        ArtifactKind::Adapter
    }
}

fn collect_adapter_artifacts(
    adapter_dir: &Path,
) -> TrainingResult<Vec<crate::artifacts::TrainingArtifact>> {
    let mut paths: Vec<PathBuf> = WalkDir::new(adapter_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(TrainingError::Trainer(format!(
            "trainer produced no adapter files in {}",
            adapter_dir.display()
        )));
    }

    paths
        .into_iter()
        .map(|p| {
            let kind = classify_adapter_file(&p);
            make_artifact(kind, p)
        })
        .collect()
}

#[async_trait]
impl Trainer for ProcessTrainer {
    fn id(&self) -> &'static str {
        "process"
    }

    async fn prepare(&self, job: &TrainingJobSpec) -> TrainingResult<()> {
        job.validate()?;
        self.layout_for(&job.config).ensure_job_dirs(&job.job_id)?;
        Ok(())
    }

    async fn run(
        &self,
        job: &TrainingJobSpec,
        progress: &dyn ProgressSink,
    ) -> TrainingResult<TrainingManifest> {
        job.validate()?;

        let job_id = job.job_id.clone();
        let started_at = Utc::now();
        progress.on_event(ProgressEvent::Started { job_id: job_id.clone() });
        self.set_status(&job_id, TrainerStatus::Preparing);

        let layout = self.layout_for(&job.config);
        layout.ensure_job_dirs(&job_id).map_err(|e| self.fail(&job_id, e))?;

        progress.on_event(ProgressEvent::Phase {
            job_id: job_id.clone(),
            phase: "loading dataset".to_string(),
        });
        let collector = load_dataset(&job.config).map_err(|e| self.fail(&job_id, e))?;
        let dataset_id =
            compute_dataset_id(collector.records()).map_err(|e| self.fail(&job_id, e))?;

        // Snapshot the inputs next to the outputs so a job directory is
        // self-describing.
        let dataset_path = layout.dataset_jsonl_path(&job_id);
        write_jsonl_records(&dataset_path, collector.records())
            .map_err(|e| self.fail(&job_id, e))?;
        let config_path = layout.config_path(&job_id);
        write_json(&config_path, &job.config).map_err(|e| self.fail(&job_id, e))?;

        self.set_status(&job_id, TrainerStatus::Running);
        progress.on_event(ProgressEvent::Phase {
            job_id: job_id.clone(),
            phase: format!("delegating to `{}`", job.config.trainer.command.join(" ")),
        });

        let adapter_dir = layout.adapter_dir(&job_id);
        spawn_trainer_command(&job.config, &config_path, &adapter_dir, &job_id, progress)
            .await
            .map_err(|e| self.fail(&job_id, e))?;

        let metrics_path = layout.metrics_path(&job_id);
        let metrics = if metrics_path.exists() {
            read_metrics_file(&metrics_path).map_err(|e| self.fail(&job_id, e))?
        } else {
            TrainingMetrics::default()
        };

        if job.config.tracking.enabled {
            let run = TrackingRun {
                run_id: &job_id.0,
                project: &job.config.tracking.project,
                params: serde_json::json!({
                    "base_model": job.config.base_model,
                    "adapter": job.config.adapter,
                    "hyperparams": job.config.hyperparams,
                    "quantization": job.config.quantization,
                }),
                metrics: &metrics,
                started_at,
                ended_at: Utc::now(),
            };
            write_json(layout.run_path(&job_id), &run).map_err(|e| self.fail(&job_id, e))?;
        }

        let mut artifacts =
            collect_adapter_artifacts(&adapter_dir).map_err(|e| self.fail(&job_id, e))?;
        artifacts.push(
            make_artifact(ArtifactKind::DatasetJsonl, dataset_path)
                .map_err(|e| self.fail(&job_id, e))?,
        );
        artifacts.push(
            make_artifact(ArtifactKind::Config, config_path)
                .map_err(|e| self.fail(&job_id, e))?,
        );
        if metrics_path.exists() {
            artifacts.push(
                make_artifact(ArtifactKind::Metrics, metrics_path)
                    .map_err(|e| self.fail(&job_id, e))?,
            );
        }

        let manifest = TrainingManifest {
            job_id: job_id.clone(),
            created_at: Utc::now(),
            base_model: job.config.base_model.clone(),
            dataset_id,
            metrics,
            artifacts,
        };
        write_json(layout.job_manifest_path(&job_id), &manifest)
            .map_err(|e| self.fail(&job_id, e))?;

        self.set_status(&job_id, TrainerStatus::Finished);
        progress.on_event(ProgressEvent::Finished { job_id });
        Ok(manifest)
    }

    async fn status(&self, job_id: &TrainingJobId) -> TrainingResult<TrainerStatus> {
        Ok(self
            .statuses
            .lock()
            .ok()
            .and_then(|s| s.get(&job_id.0).cloned())
            .unwrap_or(TrainerStatus::Idle))
    }

    /// Marks the job cancelled for status reporting. A collaborator process
    /// already in flight runs to completion; its exit is still surfaced to
    /// the caller of `run`.
    async fn cancel(&self, job_id: &TrainingJobId) -> TrainingResult<()> {
        self.set_status(job_id, TrainerStatus::Cancelled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::StdoutProgressSink;
    use tempfile::TempDir;

    fn seed_dataset(dir: &Path) -> PathBuf {
        let path = dir.join("data").join("training_data.jsonl");
        let mut collector = DatasetCollector::new(&path);
        collector.add_simple_qa("Q1", "A1", Some("SYS")).unwrap();
        collector.add_simple_qa("Q2", "A2", None).unwrap();
        collector.save().unwrap();
        path
    }

    fn job_in(ws: &Path, command: Vec<String>) -> TrainingJobSpec {
        let dataset_path = seed_dataset(ws);
        TrainingJobSpec::new(FineTuneConfig {
            base_model: "meta-llama/Llama-2-7b-chat-hf".to_string(),
            model_name: "demo-7b".to_string(),
            dataset_path,
            trainer: crate::job::TrainerBackend { command },
            ..FineTuneConfig::default()
        })
    }

    #[tokio::test]
    async fn test_run_writes_snapshot_and_manifest() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_path_buf();

        // The appended args land in $0..$3, so $3 is the adapter output dir.
        let job = job_in(
            &ws,
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo step 1; touch \"$3/adapter_model.safetensors\"".to_string(),
            ],
        );

        let trainer = ProcessTrainer::new(ws.clone());
        trainer.prepare(&job).await.unwrap();
        let manifest = trainer.run(&job, &StdoutProgressSink).await.unwrap();

        let layout = TrainingLayout::for_workspace_root(&ws);
        assert!(layout.job_manifest_path(&job.job_id).exists());
        assert!(layout.dataset_jsonl_path(&job.job_id).exists());
        assert!(layout.config_path(&job.job_id).exists());

        assert_eq!(manifest.base_model, "meta-llama/Llama-2-7b-chat-hf");
        assert!(manifest
            .artifacts
            .iter()
            .any(|a| a.kind == ArtifactKind::Adapter));
        assert!(manifest
            .artifacts
            .iter()
            .any(|a| a.kind == ArtifactKind::DatasetJsonl));

        assert_eq!(trainer.status(&job.job_id).await.unwrap(), TrainerStatus::Finished);
    }

    #[tokio::test]
    async fn test_run_picks_up_collaborator_metrics() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_path_buf();

        // Metrics land next to the adapter dir (the job dir is its parent).
        let job = job_in(
            &ws,
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "touch \"$3/adapter_model.safetensors\"; printf '{\"train_loss\": 0.5, \"steps\": 12}' > \"$3/../metrics.json\"".to_string(),
            ],
        );

        let trainer = ProcessTrainer::new(ws);
        trainer.prepare(&job).await.unwrap();
        let manifest = trainer.run(&job, &StdoutProgressSink).await.unwrap();

        assert_eq!(manifest.metrics.train_loss, Some(0.5));
        assert_eq!(manifest.metrics.steps, Some(12));
        assert!(manifest.artifacts.iter().any(|a| a.kind == ArtifactKind::Metrics));
    }

    #[tokio::test]
    async fn test_run_writes_tracking_record_when_enabled() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_path_buf();

        let mut job = job_in(
            &ws,
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "touch \"$3/adapter_model.safetensors\"".to_string(),
            ],
        );
        job.config.tracking.enabled = true;

        let trainer = ProcessTrainer::new(ws.clone());
        trainer.prepare(&job).await.unwrap();
        trainer.run(&job, &StdoutProgressSink).await.unwrap();

        let run_path = TrainingLayout::for_workspace_root(&ws).run_path(&job.job_id);
        let run: serde_json::Value =
            serde_json::from_slice(&std::fs::read(run_path).unwrap()).unwrap();
        assert_eq!(run["project"], "tunekit");
        assert_eq!(run["params"]["adapter"]["rank"], 16);
    }

    #[tokio::test]
    async fn test_failing_command_surfaces_trainer_error() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_path_buf();

        let job = job_in(&ws, vec!["false".to_string()]);

        let trainer = ProcessTrainer::new(ws);
        trainer.prepare(&job).await.unwrap();
        let err = trainer.run(&job, &StdoutProgressSink).await.unwrap_err();
        assert!(matches!(err, TrainingError::Trainer(_)));

        let status = trainer.status(&job.job_id).await.unwrap();
        assert!(matches!(status, TrainerStatus::Failed(_)));
        assert!(status.is_terminal());
    }

    #[tokio::test]
    async fn test_empty_adapter_output_is_an_error() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_path_buf();

        let job = job_in(&ws, vec!["true".to_string()]);

        let trainer = ProcessTrainer::new(ws);
        trainer.prepare(&job).await.unwrap();
        let err = trainer.run(&job, &StdoutProgressSink).await.unwrap_err();
        assert!(err.to_string().contains("no adapter files"));
    }

    #[tokio::test]
    async fn test_missing_dataset_fails_before_spawning() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_path_buf();

        let job = TrainingJobSpec::new(FineTuneConfig {
            base_model: "m".to_string(),
            model_name: "n".to_string(),
            dataset_path: ws.join("does-not-exist.jsonl"),
            ..FineTuneConfig::default()
        });

        let trainer = ProcessTrainer::new(ws);
        trainer.prepare(&job).await.unwrap();
        let err = trainer.run(&job, &StdoutProgressSink).await.unwrap_err();
        assert!(matches!(err, TrainingError::Dataset(_)));
    }
}
