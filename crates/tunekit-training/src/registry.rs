use crate::artifacts::{ArtifactKind, TrainingManifest};
use crate::error::{TrainingError, TrainingResult};
use crate::layout::TrainingLayout;
use std::path::{Path, PathBuf};

/// A trained model discovered from job manifests on disk.
#[derive(Debug, Clone)]
pub struct TrainedModelEntry {
    /// Stable identifier used in CLI arguments (`trained:<job_id>`).
    pub trained_model_id: String,
    /// Directory holding the adapter weights to publish or serve.
    pub adapter_dir: PathBuf,
    /// The job manifest for details/metadata.
    pub manifest: TrainingManifest,
}

#[must_use]
pub fn trained_model_id_for_job(job_id: &str) -> String {
    format!("trained:{job_id}")
}

fn read_manifest(path: &Path) -> TrainingResult<TrainingManifest> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<TrainingManifest>(&bytes)?)
}

fn adapter_dir_from(manifest: &TrainingManifest) -> TrainingResult<PathBuf> {
    let adapter = manifest
        .artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::Adapter)
        .ok_or_else(|| {
            TrainingError::Artifact(format!(
                "training manifest for job {} has no adapter artifact",
                manifest.job_id
            ))
        })?;
    Ok(adapter
        .path
        .parent()
        .map_or_else(|| adapter.path.clone(), Path::to_path_buf))
}

/// Discover trained models by scanning `<layout root>/*/training_manifest.json`.
pub fn discover_trained_models(workspace_root: &Path) -> TrainingResult<Vec<TrainedModelEntry>> {
    let layout = TrainingLayout::for_workspace_root(workspace_root);
    let mut out = Vec::new();

    let dir = match std::fs::read_dir(layout.root()) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };

    for entry in dir {
        let entry = entry?;
        let job_dir = entry.path();
        if !job_dir.is_dir() {
            continue;
        }
        let manifest_path = job_dir.join("training_manifest.json");
        if !manifest_path.exists() {
            continue;
        }
        let manifest = read_manifest(&manifest_path)?;
        let adapter_dir = adapter_dir_from(&manifest)?;

        out.push(TrainedModelEntry {
            trained_model_id: trained_model_id_for_job(&manifest.job_id.0),
            adapter_dir,
            manifest,
        });
    }

    Ok(out)
}

/// Resolve a `trained:<job_id>` id into the adapter directory it produced.
pub fn resolve_trained_model(
    workspace_root: &Path,
    trained_model_id: &str,
) -> TrainingResult<TrainedModelEntry> {
    let job_id = trained_model_id.strip_prefix("trained:").ok_or_else(|| {
        TrainingError::InvalidSpec(format!("invalid trained model id: {trained_model_id}"))
    })?;

    let layout = TrainingLayout::for_workspace_root(workspace_root);
    let manifest_path = layout.root().join(job_id).join("training_manifest.json");
    if !manifest_path.exists() {
        return Err(TrainingError::InvalidSpec(format!(
            "trained model not found (missing manifest): {trained_model_id}"
        )));
    }
    let manifest = read_manifest(&manifest_path)?;
    let adapter_dir = adapter_dir_from(&manifest)?;

    Ok(TrainedModelEntry {
        trained_model_id: trained_model_id.to_string(),
        adapter_dir,
        manifest,
    })
}
