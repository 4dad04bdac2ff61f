use thiserror::Error;

pub type HubResult<T> = std::result::Result<T, HubError>;

#[derive(Debug, Error)]
pub enum HubError {
    /// No token was given and none could be resolved from the environment.
    #[error("no hub token available (pass --token or set HF_TOKEN)")]
    AuthRequired,

    #[error("invalid repository id (expected namespace/name): {repo_id}")]
    InvalidRepoId { repo_id: String },

    #[error("artifact directory error: {0}")]
    ArtifactDir(String),

    #[error("http error: {message}")]
    Http { message: String },

    #[error("failed to create repository {repo_id}: {message}")]
    RepoCreationFailed { repo_id: String, message: String },

    #[error("failed to upload {path}: {message}")]
    UploadFailed { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
