use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable identifier for a dataset (content hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(pub String);

/// Who authored a turn within a conversation. Closed set; anything else is
/// rejected at parse and validation boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(TrainingError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// A single role-tagged turn.
///
/// `role` is declared before `content` so serialized records match the wire
/// shape `{"role": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One training example: an ordered sequence of messages.
///
/// Serializes to `{"messages": [...]}`, one record per line in the persisted
/// dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Check a conversation against the data-model invariants.
///
/// Conversations may begin with a system message; ordering of user/assistant
/// turns is deliberately unconstrained (no alternation rule). Role membership
/// and field presence for data read from disk are enforced by the serde
/// boundary; this covers what the type system cannot.
pub fn validate_conversation(messages: &[Message]) -> TrainingResult<()> {
    if messages.is_empty() {
        return Err(TrainingError::Validation(
            "conversation must contain at least one message".to_string(),
        ));
    }
    for (idx, msg) in messages.iter().enumerate() {
        if msg.content.trim().is_empty() {
            return Err(TrainingError::Validation(format!(
                "message[{idx}] ({}) has empty content",
                msg.role
            )));
        }
    }
    Ok(())
}

pub fn compute_dataset_id(records: &[ConversationRecord]) -> TrainingResult<DatasetId> {
    let mut hasher = Sha256::new();

    for record in records {
        let bytes = serde_json::to_vec(record)?;
        hasher.update(bytes);
        hasher.update(b"\n");
    }

    Ok(DatasetId(hex::encode(hasher.finalize())))
}
