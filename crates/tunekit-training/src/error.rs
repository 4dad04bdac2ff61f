use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    /// A message or conversation failed structural validation. Nothing is
    /// appended or persisted when this is returned.
    #[error("invalid conversation: {0}")]
    Validation(String),

    /// A persisted dataset line could not be decoded. The reload that hit
    /// this aborts without replacing in-memory state.
    #[error("failed to parse dataset line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid fine-tune config: {0}")]
    InvalidSpec(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("trainer error: {0}")]
    Trainer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
