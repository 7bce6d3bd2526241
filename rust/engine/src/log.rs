use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One line of the match's append-only audit log.
/// Serialized to JSONL by [`TranscriptWriter`] for hand-history storage.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Hand during which the event occurred (1-based).
    pub hand_number: u32,
    /// Acting seat; `None` for system events (antes, deals, awards).
    pub seat: Option<usize>,
    /// Short machine-readable action name ("bet", "discard", "showdown").
    pub action: String,
    /// Human-readable description for event-log display.
    pub description: String,
    /// Timestamp (RFC3339 when serialized).
    pub ts: DateTime<Utc>,
}

/// Append-only action log for one match.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        hand_number: u32,
        seat: Option<usize>,
        action: &str,
        description: impl Into<String>,
    ) {
        self.entries.push(ActionLogEntry {
            hand_number,
            seat,
            action: action.to_string(),
            description: description.into(),
            ts: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn for_hand(&self, hand_number: u32) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.hand_number == hand_number)
    }
}

/// Writes log entries as JSONL, one entry per line, flushed eagerly so a
/// crash loses at most the in-flight line.
pub struct TranscriptWriter {
    writer: BufWriter<File>,
}

impl TranscriptWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(f),
        })
    }

    pub fn append(&mut self, entry: &ActionLogEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    pub fn append_all(&mut self, log: &ActionLog) -> std::io::Result<()> {
        for entry in log.entries() {
            self.append(entry)?;
        }
        Ok(())
    }
}
