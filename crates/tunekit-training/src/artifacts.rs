use crate::dataset::DatasetId;
use crate::error::{TrainingError, TrainingResult};
use crate::job::TrainingJobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Adapter,
    Tokenizer,
    Config,
    Metrics,
    DatasetJsonl,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub sha256: String,
}

/// Final metrics reported by the external training loop, if it wrote any.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrainingMetrics {
    pub train_loss: Option<f64>,
    pub eval_loss: Option<f64>,
    pub steps: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingManifest {
    pub job_id: TrainingJobId,
    pub created_at: DateTime<Utc>,
    pub base_model: String,
    pub dataset_id: DatasetId,
    #[serde(default)]
    pub metrics: TrainingMetrics,
    pub artifacts: Vec<TrainingArtifact>,
}

pub fn sha256_file(path: &Path) -> TrainingResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub fn make_artifact(kind: ArtifactKind, path: PathBuf) -> TrainingResult<TrainingArtifact> {
    if !path.exists() {
        return Err(TrainingError::Artifact(format!(
            "artifact path does not exist: {}",
            path.display()
        )));
    }

    let hash = sha256_file(&path)?;
    Ok(TrainingArtifact { kind, path, sha256: hash })
}

/// Read the `metrics.json` a collaborator may leave in the job directory.
pub fn read_metrics_file(path: &Path) -> TrainingResult<TrainingMetrics> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        TrainingError::Artifact(format!("failed to parse metrics {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_artifact_requires_existing_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.bin");
        assert!(make_artifact(ArtifactKind::Adapter, missing).is_err());
    }

    #[test]
    fn test_make_artifact_hashes_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("adapter.bin");
        std::fs::write(&path, b"weights").unwrap();

        let artifact = make_artifact(ArtifactKind::Adapter, path.clone()).unwrap();
        assert_eq!(artifact.sha256, sha256_file(&path).unwrap());
        assert_eq!(artifact.sha256.len(), 64);
    }

    #[test]
    fn test_read_metrics_file_accepts_partial_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metrics.json");
        std::fs::write(&path, r#"{"train_loss": 0.42}"#).unwrap();

        let metrics = read_metrics_file(&path).unwrap();
        assert_eq!(metrics.train_loss, Some(0.42));
        assert_eq!(metrics.eval_loss, None);
    }
}
