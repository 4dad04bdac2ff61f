use crate::card::ModelCard;
use crate::client::HubClient;
use crate::error::{HubError, HubResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// What to publish and where.
#[derive(Debug, Clone)]
pub struct PublishSpec {
    pub artifact_dir: PathBuf,
    pub repo_id: String,
    pub version: String,
    pub private: bool,
}

impl PublishSpec {
    pub fn validate(&self) -> HubResult<()> {
        if !self.artifact_dir.is_dir() {
            return Err(HubError::ArtifactDir(format!(
                "not a directory: {}",
                self.artifact_dir.display()
            )));
        }
        if !self
            .repo_id
            .split_once('/')
            .is_some_and(|(org, name)| !org.is_empty() && !name.is_empty())
        {
            return Err(HubError::InvalidRepoId { repo_id: self.repo_id.clone() });
        }
        Ok(())
    }
}

/// Outcome of a publish run.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub repo_url: String,
    pub files_uploaded: usize,
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

fn repo_relative(dir: &Path, file: &Path) -> HubResult<String> {
    let rel = file.strip_prefix(dir).map_err(|_| {
        HubError::ArtifactDir(format!("file escapes artifact dir: {}", file.display()))
    })?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Publish an artifact directory: write the model card into it, ensure the
/// remote repository exists, then upload every file under the directory.
pub async fn publish(
    spec: &PublishSpec,
    card: &ModelCard,
    client: &dyn HubClient,
) -> HubResult<PublishReport> {
    spec.validate()?;

    std::fs::write(spec.artifact_dir.join("README.md"), card.render())?;

    let repo_url = client.create_repo(&spec.repo_id, spec.private).await?;
    info!(repo_url, "hub repository ready");

    let mut files_uploaded = 0;
    for file in files_under(&spec.artifact_dir) {
        let path_in_repo = repo_relative(&spec.artifact_dir, &file)?;
        client.upload_file(&spec.repo_id, &file, &path_in_repo).await?;
        files_uploaded += 1;
    }

    info!(files_uploaded, "publish complete");
    Ok(PublishReport { repo_url, files_uploaded })
}
