use crate::error::TrainingResult;
use crate::job::TrainingJobId;
use std::path::{Path, PathBuf};

/// Filesystem layout for fine-tuning artifacts.
///
/// Default layout is under `.tunekit/artifacts/training/<job_id>/...`; a
/// config-level `output_dir` can root the same structure anywhere else.
#[derive(Debug, Clone)]
pub struct TrainingLayout {
    root: PathBuf,
}

impl TrainingLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create a layout rooted in a workspace directory.
    #[must_use]
    pub fn for_workspace_root(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join(".tunekit").join("artifacts").join("training"))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn job_dir(&self, job_id: &TrainingJobId) -> PathBuf {
        self.root.join(job_id.0.as_str())
    }

    #[must_use]
    pub fn job_manifest_path(&self, job_id: &TrainingJobId) -> PathBuf {
        self.job_dir(job_id).join("training_manifest.json")
    }

    #[must_use]
    pub fn dataset_jsonl_path(&self, job_id: &TrainingJobId) -> PathBuf {
        self.job_dir(job_id).join("dataset.jsonl")
    }

    #[must_use]
    pub fn config_path(&self, job_id: &TrainingJobId) -> PathBuf {
        self.job_dir(job_id).join("finetune_config.json")
    }

    #[must_use]
    pub fn metrics_path(&self, job_id: &TrainingJobId) -> PathBuf {
        self.job_dir(job_id).join("metrics.json")
    }

    #[must_use]
    pub fn run_path(&self, job_id: &TrainingJobId) -> PathBuf {
        self.job_dir(job_id).join("run.json")
    }

    /// Directory the external trainer writes adapter weights into.
    #[must_use]
    pub fn adapter_dir(&self, job_id: &TrainingJobId) -> PathBuf {
        self.job_dir(job_id).join("adapter")
    }

    pub fn ensure_job_dirs(&self, job_id: &TrainingJobId) -> TrainingResult<()> {
        std::fs::create_dir_all(self.job_dir(job_id))?;
        std::fs::create_dir_all(self.adapter_dir(job_id))?;
        Ok(())
    }
}
