//! JSONL file writer for transcript events.
//!
//! Each [`TranscriptEvent`] is serialized as a single JSON line with its
//! `type` tag and a `timestamp` field, appended to the file via a buffered
//! writer.

use circle_application::{TranscriptEvent, TranscriptSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL transcript writer that records one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlTranscriptWriter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptWriter {
    /// Create a new writer at the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not create transcript log file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptSink for JsonlTranscriptWriter {
    fn record(&self, event: TranscriptEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // The event already carries its type tag; merge the timestamp in
        let record = match serde_json::to_value(&event) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.insert(
                    "timestamp".to_string(),
                    serde_json::Value::String(timestamp),
                );
                serde_json::Value::Object(map)
            }
            Ok(other) => serde_json::json!({
                "timestamp": timestamp,
                "data": other,
            }),
            Err(e) => {
                warn!("Could not serialize transcript event: {}", e);
                return;
            }
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flush per event for crash safety — JSONL is append-only
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlTranscriptWriter {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circle_domain::{CircleId, EntityId, TerminationReason};
    use std::io::Read;

    #[test]
    fn test_writes_tagged_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.transcript.jsonl");
        let writer = JsonlTranscriptWriter::new(&path).unwrap();

        writer.record(TranscriptEvent::SessionStarted {
            circle_id: CircleId::new("circle-test"),
            topic: "shipping".to_string(),
            participants: vec![EntityId::new("ember"), EntityId::new("oak")],
            policy: "round_robin".to_string(),
        });
        writer.record(TranscriptEvent::SessionEnded {
            circle_id: CircleId::new("circle-test"),
            reason: TerminationReason::MaxTurnsReached,
            rounds_completed: 2,
            messages: 4,
        });

        // Flush
        drop(writer);

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("type").is_some());
            assert!(value.get("timestamp").is_some());
        }

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "session_started");
        assert_eq!(first["topic"], "shipping");
        assert_eq!(first["participants"][0], "ember");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "session_ended");
        assert_eq!(second["reason"], "max_turns_reached");
        assert_eq!(second["rounds_completed"], 2);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("log.jsonl");
        let writer = JsonlTranscriptWriter::new(&path);
        assert!(writer.is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_path_returns_none() {
        let result = JsonlTranscriptWriter::new("/proc/nonexistent/deeply/nested/file.jsonl");
        // The exact failure depends on the platform; just verify no panic
        let _ = result;
    }
}
