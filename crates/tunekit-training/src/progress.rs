use crate::job::TrainingJobId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { job_id: TrainingJobId },
    /// Driver-side phase transitions (loading dataset, spawning trainer, ...).
    Phase { job_id: TrainingJobId, phase: String },
    /// A line of stdout forwarded from the external training process.
    TrainerOutput { job_id: TrainingJobId, line: String },
    Finished { job_id: TrainingJobId },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Discards all events. Used where stdout must stay machine-readable.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { job_id } => println!("[train:{job_id}] started"),
            ProgressEvent::Phase { job_id, phase } => println!("[train:{job_id}] {phase}"),
            ProgressEvent::TrainerOutput { job_id, line } => println!("[train:{job_id}] | {line}"),
            ProgressEvent::Finished { job_id } => println!("[train:{job_id}] finished"),
        }
    }
}
