//! Session activity log, one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::references::ReferenceSource;

/// Something the panel did that is worth a line in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    ReferenceAdded {
        reference_id: String,
        source: ReferenceSource,
        count: usize,
    },
    ReferenceRemoved {
        reference_id: String,
        count: usize,
    },
    ReferencesCleared {
        removed: usize,
    },
    BatchStarted {
        requested: usize,
        payloads: usize,
        references: usize,
    },
    CallCompleted {
        index: usize,
        payload_index: usize,
        images: usize,
    },
    BatchCompleted {
        results: usize,
    },
    BatchFailed {
        error: String,
    },
    UsageFetched {
        available: bool,
    },
}

/// One logged line: the event plus the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: String,
    pub ts: String,
    #[serde(flatten)]
    pub event: StudioEvent,
}

/// Appends [`StudioEvent`]s to a JSONL file under a single session id.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
    session_id: String,
}

impl EventLog {
    /// Log with a fresh random session id.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_session(path, Uuid::new_v4().to_string())
    }

    pub fn with_session(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            session_id: session_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn record(&self, event: StudioEvent) -> anyhow::Result<EventRecord> {
        let record = EventRecord {
            session_id: self.session_id.clone(),
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(record)
    }

    /// Reads every well-formed record back; malformed lines are skipped.
    pub fn read(&self) -> anyhow::Result<Vec<EventRecord>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::DateTime;
    use serde_json::{json, Value};

    use super::{EventLog, StudioEvent};
    use crate::references::ReferenceSource;

    #[test]
    fn records_are_tagged_by_event_type() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let log = EventLog::with_session(temp.path().join("events.jsonl"), "session-1");
        log.record(StudioEvent::ReferenceAdded {
            reference_id: "1700".to_string(),
            source: ReferenceSource::Layer,
            count: 2,
        })?;

        let line: Value = serde_json::from_str(fs::read_to_string(log.path())?.trim_end())?;
        assert_eq!(line["type"], json!("reference_added"));
        assert_eq!(line["session_id"], json!("session-1"));
        assert_eq!(line["source"], json!("layer"));
        assert_eq!(line["count"], json!(2));
        DateTime::parse_from_rfc3339(line["ts"].as_str().unwrap_or_default())?;
        Ok(())
    }

    #[test]
    fn read_returns_records_in_order_and_skips_garbage() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let log = EventLog::open(temp.path().join("nested").join("events.jsonl"));
        assert!(log.read()?.is_empty());

        log.record(StudioEvent::BatchStarted {
            requested: 2,
            payloads: 1,
            references: 0,
        })?;
        fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .and_then(|mut file| std::io::Write::write_all(&mut file, b"not json\n"))?;
        log.record(StudioEvent::BatchFailed {
            error: "timeout".to_string(),
        })?;

        let records = log.read()?;
        let events: Vec<&StudioEvent> = records.iter().map(|record| &record.event).collect();
        assert_eq!(
            events,
            vec![
                &StudioEvent::BatchStarted {
                    requested: 2,
                    payloads: 1,
                    references: 0,
                },
                &StudioEvent::BatchFailed {
                    error: "timeout".to_string(),
                },
            ]
        );
        assert!(records.iter().all(|record| record.session_id == log.session_id()));
        Ok(())
    }
}
