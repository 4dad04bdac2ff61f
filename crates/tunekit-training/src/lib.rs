//! Tunekit Training
//!
//! Primitives for supervised fine-tuning pipelines:
//! - Collecting and validating conversation datasets (`DatasetCollector`)
//! - Describing fine-tune jobs as explicit config (`FineTuneConfig`)
//! - Writing training artifacts + manifests
//! - Delegating the training loop to an external command (`ProcessTrainer`)

pub mod artifacts;
pub mod collector;
pub mod dataset;
pub mod driver;
pub mod error;
pub mod job;
pub mod layout;
pub mod progress;
pub mod registry;
pub mod trainer;

pub use artifacts::{ArtifactKind, TrainingArtifact, TrainingManifest, TrainingMetrics};
pub use collector::{read_jsonl_records, write_jsonl_records, DatasetCollector, DatasetStats};
pub use dataset::{
    compute_dataset_id, validate_conversation, ConversationRecord, DatasetId, Message, Role,
};
pub use driver::ProcessTrainer;
pub use error::{TrainingError, TrainingResult};
pub use job::{
    AdapterParams, FineTuneConfig, QuantizationMode, TrackingOptions, TrainerBackend,
    TrainingHyperParams, TrainingJobId, TrainingJobSpec,
};
pub use layout::TrainingLayout;
pub use progress::{NullProgressSink, ProgressEvent, ProgressSink, StdoutProgressSink};
pub use registry::{
    discover_trained_models, resolve_trained_model, trained_model_id_for_job, TrainedModelEntry,
};
pub use trainer::{Trainer, TrainerStatus};
