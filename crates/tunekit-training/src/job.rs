use crate::error::{TrainingError, TrainingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identifier for a fine-tuning job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainingJobId(pub String);

impl TrainingJobId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for TrainingJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Low-rank adapter parameters handed to the external fine-tuning pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterParams {
    pub rank: u32,
    pub alpha: f32,
    pub dropout: f32,
    pub target_modules: Vec<String>,
}

impl Default for AdapterParams {
    fn default() -> Self {
        Self {
            rank: 16,
            alpha: 32.0,
            dropout: 0.05,
            target_modules: vec![
                "q_proj".to_string(),
                "v_proj".to_string(),
                "k_proj".to_string(),
                "o_proj".to_string(),
            ],
        }
    }
}

impl AdapterParams {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.rank == 0 {
            return Err(TrainingError::InvalidSpec("adapter.rank must be >= 1".to_string()));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(TrainingError::InvalidSpec("adapter.alpha must be > 0".to_string()));
        }
        if !self.dropout.is_finite() || !(0.0..1.0).contains(&self.dropout) {
            return Err(TrainingError::InvalidSpec(
                "adapter.dropout must be in [0, 1)".to_string(),
            ));
        }
        if self.target_modules.is_empty() {
            return Err(TrainingError::InvalidSpec(
                "adapter.target_modules must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hyperparameters for the delegated training loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingHyperParams {
    pub seed: u64,
    pub epochs: u32,
    pub batch_size: u32,
    pub gradient_accumulation_steps: u32,
    pub learning_rate: f64,
    pub max_seq_len: u32,
    pub warmup_steps: u32,
}

impl Default for TrainingHyperParams {
    fn default() -> Self {
        Self {
            seed: 42,
            epochs: 3,
            batch_size: 4,
            gradient_accumulation_steps: 4,
            learning_rate: 2e-4,
            max_seq_len: 512,
            warmup_steps: 50,
        }
    }
}

impl TrainingHyperParams {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.epochs == 0 {
            return Err(TrainingError::InvalidSpec("hyperparams.epochs must be >= 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidSpec(
                "hyperparams.batch_size must be >= 1".to_string(),
            ));
        }
        if self.gradient_accumulation_steps == 0 {
            return Err(TrainingError::InvalidSpec(
                "hyperparams.gradient_accumulation_steps must be >= 1".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidSpec(
                "hyperparams.learning_rate must be > 0".to_string(),
            ));
        }
        if self.max_seq_len == 0 {
            return Err(TrainingError::InvalidSpec(
                "hyperparams.max_seq_len must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the base model weights are loaded by the external pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationMode {
    None,
    #[default]
    Int8,
    Int4,
}

impl std::fmt::Display for QuantizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Int8 => write!(f, "int8"),
            Self::Int4 => write!(f, "int4"),
        }
    }
}

/// Experiment-tracking switch. When enabled the driver records a run file
/// (params, metrics, timestamps) next to the other job artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingOptions {
    pub enabled: bool,
    pub project: String,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self { enabled: false, project: "tunekit".to_string() }
    }
}

/// The external command that executes the training loop. The driver appends
/// `--config <path> --output-dir <dir>` when spawning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerBackend {
    pub command: Vec<String>,
}

impl Default for TrainerBackend {
    fn default() -> Self {
        Self { command: vec!["python3".to_string(), "train.py".to_string()] }
    }
}

impl TrainerBackend {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.command.is_empty() || self.command[0].trim().is_empty() {
            return Err(TrainingError::InvalidSpec("trainer.command must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Complete fine-tune configuration, loaded from a TOML file.
///
/// Every knob the external collaborators need lives here as a named field;
/// there is no ambient configuration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneConfig {
    pub base_model: String,
    pub model_name: String,
    pub version: String,
    pub output_dir: Option<PathBuf>,
    pub dataset_path: PathBuf,
    pub adapter: AdapterParams,
    pub hyperparams: TrainingHyperParams,
    pub quantization: QuantizationMode,
    pub tracking: TrackingOptions,
    pub trainer: TrainerBackend,
}

impl Default for FineTuneConfig {
    fn default() -> Self {
        Self {
            base_model: String::new(),
            model_name: String::new(),
            version: "v0.1.0".to_string(),
            output_dir: None,
            dataset_path: PathBuf::from("data/training_data.jsonl"),
            adapter: AdapterParams::default(),
            hyperparams: TrainingHyperParams::default(),
            quantization: QuantizationMode::default(),
            tracking: TrackingOptions::default(),
            trainer: TrainerBackend::default(),
        }
    }
}

impl FineTuneConfig {
    pub fn from_toml_path(path: &Path) -> TrainingResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            TrainingError::InvalidSpec(format!("failed to parse {}: {e}", path.display()))
        })
    }

    pub fn validate(&self) -> TrainingResult<()> {
        if self.base_model.trim().is_empty() {
            return Err(TrainingError::InvalidSpec("base_model is required".to_string()));
        }
        if self.model_name.trim().is_empty() {
            return Err(TrainingError::InvalidSpec("model_name is required".to_string()));
        }
        if self.dataset_path.as_os_str().is_empty() {
            return Err(TrainingError::InvalidSpec("dataset_path is required".to_string()));
        }
        self.adapter.validate()?;
        self.hyperparams.validate()?;
        self.trainer.validate()?;
        Ok(())
    }
}

/// A fine-tuning job: a validated config plus identity and creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobSpec {
    pub job_id: TrainingJobId,
    pub created_at: DateTime<Utc>,
    pub config: FineTuneConfig,
}

impl TrainingJobSpec {
    #[must_use]
    pub fn new(config: FineTuneConfig) -> Self {
        Self { job_id: TrainingJobId::new(), created_at: Utc::now(), config }
    }

    pub fn validate(&self) -> TrainingResult<()> {
        self.config.validate()
    }
}
