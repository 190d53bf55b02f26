//! Structured event stream.
//!
//! Discrete, typed events emitted while a scenario runs. Events are
//! serialized as newline-delimited JSON (JSONL) and carry a monotonically
//! increasing sequence number plus the run id, so several runs appended to
//! one file can be told apart.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::sim::{Notification, RunSummary};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a run.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A scenario run has started.
    RunStarted {
        /// When the run started.
        timestamp: DateTime<Utc>,
        /// Scenario file or label.
        scenario: String,
        /// Random seed.
        seed: u64,
        /// Steps that will run.
        steps: u64,
        /// Actors spawned.
        actors: usize,
    },

    /// The world raised a notification.
    Notification {
        /// When the event was recorded.
        timestamp: DateTime<Utc>,
        /// Step during which the notification was raised.
        step: u64,
        /// The notification itself.
        notification: Notification,
    },

    /// A scenario run has finished.
    RunFinished {
        /// When the run finished.
        timestamp: DateTime<Utc>,
        /// Aggregate outcome.
        summary: RunSummary,
    },
}

impl Event {
    /// Wraps a world notification raised during `step`.
    #[must_use]
    pub fn notification(step: u64, notification: &Notification) -> Self {
        Self::Notification {
            timestamp: Utc::now(),
            step,
            notification: notification.clone(),
        }
    }
}

/// Wraps an [`Event`] with its sequence number and run id.
#[derive(Debug, Serialize)]
struct EventEnvelope<'a> {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// Identifier shared by every event of one emitter.
    run_id: &'a str,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
    run_id: String,
}

// Box<dyn Write> is not Debug, so provide a manual impl.
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence)
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that appends to the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// The run id stamped on every event.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Emits an event as a single JSONL line.
    ///
    /// Write and serialization failures are dropped so a broken sink never
    /// aborts a run.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            run_id: &self.run_id,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Flushes the underlying writer.
    pub fn flush(&self) {
        if let Ok(mut w) = self.writer.lock() {
            let _ = w.flush();
        }
    }
}

impl Drop for EventEmitter {
    fn drop(&mut self) {
        self.flush();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;
    use crate::sim::ActorId;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> Event {
        Event::RunStarted {
            timestamp: DateTime::parse_from_rfc3339("2026-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            scenario: "arena.yaml".to_owned(),
            seed: 7,
            steps: 100,
            actors: 2,
        }
    }

    #[test]
    fn emitter_writes_valid_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.flush();

        let output = tw.contents();
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["type"], "RunStarted");
        assert_eq!(parsed["scenario"], "arena.yaml");
        assert_eq!(parsed["sequence"], 0);
        assert_eq!(parsed["run_id"], emitter.run_id());
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(Event::notification(
            3,
            &Notification::ActorDied {
                actor: ActorId(1),
                killer: Some(ActorId(0)),
            },
        ));
        emitter.flush();

        assert_eq!(emitter.event_count(), 2);

        let lines: Vec<serde_json::Value> = tw
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["type"], "Notification");
        assert_eq!(lines[1]["step"], 3);
        assert_eq!(lines[1]["notification"]["type"], "actor_died");
        assert_eq!(lines[1]["notification"]["killer"], 0);
    }

    #[test]
    fn run_finished_carries_summary() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(Event::RunFinished {
            timestamp: Utc::now(),
            summary: RunSummary {
                steps: 12,
                deaths: 1,
                ..RunSummary::default()
            },
        });
        drop(emitter);

        let parsed: serde_json::Value = serde_json::from_str(tw.contents().trim()).unwrap();
        assert_eq!(parsed["summary"]["steps"], 12);
        assert_eq!(parsed["summary"]["deaths"], 1);
    }

    #[test]
    fn noop_emitter_counts() {
        let emitter = EventEmitter::noop();
        emitter.emit(sample_event());
        assert_eq!(emitter.event_count(), 1);
    }
}
