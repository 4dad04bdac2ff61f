use crate::dataset::{validate_conversation, ConversationRecord, Message, Role};
use crate::error::{TrainingError, TrainingResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Accumulates conversation records in memory and persists them as one JSON
/// object per line.
///
/// Append-only: records can be added or reloaded wholesale from disk, never
/// edited in place. `save` overwrites the whole file from the in-memory
/// sequence, so a failed `add_conversation` can never leave a partial record
/// behind.
#[derive(Debug)]
pub struct DatasetCollector {
    output_path: PathBuf,
    records: Vec<ConversationRecord>,
}

/// Summary counters for a collected dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_records: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub avg_messages_per_record: f64,
}

impl DatasetCollector {
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self { output_path: output_path.into(), records: Vec::new() }
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn records(&self) -> &[ConversationRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validate and append one conversation. On error nothing is appended.
    pub fn add_conversation(&mut self, messages: Vec<Message>) -> TrainingResult<()> {
        validate_conversation(&messages)?;
        self.records.push(ConversationRecord::new(messages));
        Ok(())
    }

    /// Append a question/answer pair, optionally preceded by a system prompt.
    pub fn add_simple_qa(
        &mut self,
        question: &str,
        answer: &str,
        system_prompt: Option<&str>,
    ) -> TrainingResult<()> {
        let mut messages = Vec::with_capacity(3);
        if let Some(system) = system_prompt {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(question));
        messages.push(Message::assistant(answer));
        self.add_conversation(messages)
    }

    /// Overwrite the output file with the in-memory records, creating the
    /// parent directory if needed. Returns the number of records written.
    pub fn save(&self) -> TrainingResult<usize> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        write_jsonl_records(&self.output_path, &self.records)?;
        Ok(self.records.len())
    }

    /// Reload records from the output file, replacing the in-memory sequence.
    ///
    /// The file is parsed in full before any state changes, so a malformed
    /// line leaves the collector untouched. Returns the number of records
    /// loaded; a missing file loads zero records and is not an error.
    pub fn load_existing(&mut self) -> TrainingResult<usize> {
        if !self.output_path.exists() {
            return Ok(0);
        }
        let records = read_jsonl_records(&self.output_path)?;
        let count = records.len();
        self.records = records;
        Ok(count)
    }

    #[must_use]
    pub fn stats(&self) -> DatasetStats {
        let user_messages = self.count_role(Role::User);
        let assistant_messages = self.count_role(Role::Assistant);
        let total_messages: usize = self.records.iter().map(|r| r.messages.len()).sum();
        let avg_messages_per_record = if self.records.is_empty() {
            0.0
        } else {
            total_messages as f64 / self.records.len() as f64
        };

        DatasetStats {
            total_records: self.records.len(),
            user_messages,
            assistant_messages,
            avg_messages_per_record,
        }
    }

    fn count_role(&self, role: Role) -> usize {
        self.records
            .iter()
            .map(|r| r.messages.iter().filter(|m| m.role == role).count())
            .sum()
    }
}

pub fn write_jsonl_records(path: &Path, records: &[ConversationRecord]) -> TrainingResult<()> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

pub fn read_jsonl_records(path: &Path) -> TrainingResult<Vec<ConversationRecord>> {
    let contents = std::fs::read_to_string(path)?;
    let mut records = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: ConversationRecord = serde_json::from_str(line)
            .map_err(|e| TrainingError::Parse { line: idx + 1, message: e.to_string() })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn collector_in(temp: &TempDir) -> DatasetCollector {
        DatasetCollector::new(temp.path().join("data").join("training_data.jsonl"))
    }

    #[test]
    fn test_add_conversation_appends_exactly_one_record() {
        let temp = TempDir::new().unwrap();
        let mut collector = collector_in(&temp);

        collector
            .add_conversation(vec![Message::user("hello"), Message::assistant("hi")])
            .unwrap();
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_invalid_conversation_leaves_count_unchanged() {
        let temp = TempDir::new().unwrap();
        let mut collector = collector_in(&temp);
        collector.add_simple_qa("Q", "A", None).unwrap();

        let err = collector.add_conversation(vec![Message::user("")]).unwrap_err();
        assert!(matches!(err, TrainingError::Validation(_)));
        assert_eq!(collector.len(), 1);

        assert!(collector.add_conversation(Vec::new()).is_err());
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let mut collector = collector_in(&temp);
        collector.add_simple_qa("Q1", "A1", Some("SYS")).unwrap();
        collector
            .add_conversation(vec![
                Message::user("first"),
                Message::assistant("second"),
                Message::user("third"),
            ])
            .unwrap();
        let written = collector.save().unwrap();
        assert_eq!(written, 2);

        let mut fresh = DatasetCollector::new(collector.output_path());
        let loaded = fresh.load_existing().unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(fresh.records(), collector.records());
    }

    #[test]
    fn test_save_writes_exact_wire_format() {
        let temp = TempDir::new().unwrap();
        let mut collector = collector_in(&temp);
        collector.add_simple_qa("Q1", "A1", Some("SYS")).unwrap();
        collector.save().unwrap();

        let contents = std::fs::read_to_string(collector.output_path()).unwrap();
        assert_eq!(
            contents,
            concat!(
                r#"{"messages":[{"role":"system","content":"SYS"},"#,
                r#"{"role":"user","content":"Q1"},"#,
                r#"{"role":"assistant","content":"A1"}]}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_save_creates_missing_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("deep").join("out.jsonl");
        let mut collector = DatasetCollector::new(&path);
        collector.add_simple_qa("Q", "A", None).unwrap();
        collector.save().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_existing_replaces_in_memory_state() {
        let temp = TempDir::new().unwrap();
        let mut collector = collector_in(&temp);
        collector.add_simple_qa("persisted", "yes", None).unwrap();
        collector.save().unwrap();

        collector.add_simple_qa("unsaved", "gone after reload", None).unwrap();
        assert_eq!(collector.len(), 2);

        let loaded = collector.load_existing().unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.records()[0].messages[0].content, "persisted");
    }

    #[test]
    fn test_load_existing_missing_file_is_empty_not_error() {
        let temp = TempDir::new().unwrap();
        let mut collector = collector_in(&temp);
        assert_eq!(collector.load_existing().unwrap(), 0);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_load_reports_offending_line_number() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"messages":[{"role":"user","content":"ok"}]}"#,
                "\n",
                "not json at all\n",
            ),
        )
        .unwrap();

        let mut collector = DatasetCollector::new(&path);
        match collector.load_existing().unwrap_err() {
            TrainingError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other}"),
        }
        // Aborted reload must not leave a partial dataset behind.
        assert!(collector.is_empty());
    }

    #[test]
    fn test_load_rejects_record_without_messages_field() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.jsonl");
        std::fs::write(&path, "{\"turns\":[]}\n").unwrap();

        let mut collector = DatasetCollector::new(&path);
        assert!(matches!(
            collector.load_existing().unwrap_err(),
            TrainingError::Parse { line: 1, .. }
        ));
    }

    #[test]
    fn test_load_rejects_unknown_role() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.jsonl");
        std::fs::write(
            &path,
            "{\"messages\":[{\"role\":\"narrator\",\"content\":\"hi\"}]}\n",
        )
        .unwrap();

        let mut collector = DatasetCollector::new(&path);
        assert!(matches!(
            collector.load_existing().unwrap_err(),
            TrainingError::Parse { line: 1, .. }
        ));
    }

    #[test]
    fn test_stats_on_empty_collector() {
        let temp = TempDir::new().unwrap();
        let collector = collector_in(&temp);
        let stats = collector.stats();
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.user_messages, 0);
        assert_eq!(stats.assistant_messages, 0);
        assert_eq!(stats.avg_messages_per_record, 0.0);
    }

    #[test]
    fn test_stats_counts_roles_and_average_length() {
        let temp = TempDir::new().unwrap();
        let mut collector = collector_in(&temp);
        collector.add_simple_qa("Q1", "A1", None).unwrap();
        collector.add_simple_qa("Q2", "A2", None).unwrap();

        let stats = collector.stats();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.user_messages, 2);
        assert_eq!(stats.assistant_messages, 2);
        assert_eq!(stats.avg_messages_per_record, 2.0);
    }
}
