use crate::error::{HubError, HubResult};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Resolve a hub token: explicit value first, then the `HF_TOKEN`
/// environment variable. Blank values count as absent.
#[must_use]
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|t| !t.trim().is_empty())
        .or_else(|| std::env::var("HF_TOKEN").ok().filter(|t| !t.trim().is_empty()))
}

/// Transport to a hosted model registry.
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Create the repository if needed and return its browsable URL.
    async fn create_repo(&self, repo_id: &str, private: bool) -> HubResult<String>;

    /// Upload one local file to `path_in_repo` on the main revision.
    async fn upload_file(
        &self,
        repo_id: &str,
        local_path: &Path,
        path_in_repo: &str,
    ) -> HubResult<()>;
}

/// `HubClient` over the registry's REST API with bearer-token auth.
pub struct HttpHubClient {
    base_url: String,
    client: reqwest::Client,
    token: String,
}

impl HttpHubClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://huggingface.co";

    pub fn new(token: Option<String>) -> HubResult<Self> {
        Self::with_base_url(token, Self::DEFAULT_BASE_URL)
    }

    /// The base URL is overridable so tests and private registries can point
    /// elsewhere.
    pub fn with_base_url(token: Option<String>, base_url: impl Into<String>) -> HubResult<Self> {
        let token = resolve_token(token).ok_or(HubError::AuthRequired)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("tunekit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HubError::Http { message: format!("failed to build http client: {e}") })?;

        let base_url: String = base_url.into();
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client, token })
    }

    fn split_repo_id(repo_id: &str) -> HubResult<(&str, &str)> {
        repo_id
            .split_once('/')
            .filter(|(org, name)| !org.is_empty() && !name.is_empty())
            .ok_or_else(|| HubError::InvalidRepoId { repo_id: repo_id.to_string() })
    }
}

#[async_trait]
impl HubClient for HttpHubClient {
    async fn create_repo(&self, repo_id: &str, private: bool) -> HubResult<String> {
        let (org, name) = Self::split_repo_id(repo_id)?;
        let url = format!("{}/api/repos/create", self.base_url);
        debug!(repo_id, private, "creating hub repository");

        let body = serde_json::json!({
            "name": name,
            "organization": org,
            "type": "model",
            "private": private,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| HubError::Http { message: format!("create repo request failed: {e}") })?;

        // 409 means the repository already exists, which is fine.
        if response.status().is_success() || response.status().as_u16() == 409 {
            Ok(format!("{}/{repo_id}", self.base_url))
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(HubError::RepoCreationFailed {
                repo_id: repo_id.to_string(),
                message: format!("HTTP {status}: {body}"),
            })
        }
    }

    async fn upload_file(
        &self,
        repo_id: &str,
        local_path: &Path,
        path_in_repo: &str,
    ) -> HubResult<()> {
        Self::split_repo_id(repo_id)?;
        let content = tokio::fs::read(local_path).await?;
        let url = format!(
            "{}/api/models/{repo_id}/upload/main/{path_in_repo}",
            self.base_url
        );
        debug!(path_in_repo, bytes = content.len(), "uploading file");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/octet-stream")
            .body(content)
            .send()
            .await
            .map_err(|e| HubError::UploadFailed {
                path: path_in_repo.to_string(),
                message: format!("upload request failed: {e}"),
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(HubError::UploadFailed {
                path: path_in_repo.to_string(),
                message: format!("HTTP {status}: {body}"),
            })
        }
    }
}
