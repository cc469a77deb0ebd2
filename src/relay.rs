//! Console message relay from the isolated renderer to the host.
//!
//! The renderer posts `{type: "console", logType, message}` payloads. They
//! travel through an unbounded channel and are appended to an ordered
//! [`ConsoleLog`] when the owning session pumps the relay.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Default wall-clock format for log timestamps, e.g. `3:04:05 PM`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-I:%M:%S %p";

/// Kind of console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    #[default]
    Log,
    Error,
    Warn,
}

impl LogKind {
    /// Maps a relayed `logType`; anything unrecognised is a plain log.
    pub fn from_log_type(log_type: Option<&str>) -> Self {
        match log_type {
            Some("error") => LogKind::Error,
            Some("warn") => LogKind::Warn,
            Some("log") | None => LogKind::Log,
            Some(other) => {
                tracing::debug!(log_type = %other, "unrecognised log type, recording as log");
                LogKind::Log
            }
        }
    }
}

/// A console message decoded from a relayed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    pub kind: LogKind,
    pub message: String,
}

impl ConsoleMessage {
    /// Decodes a relayed payload.
    ///
    /// Returns `None` for payloads whose `type` is not `"console"`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        if payload.get("type").and_then(Value::as_str) != Some("console") {
            return None;
        }

        let kind = LogKind::from_log_type(payload.get("logType").and_then(Value::as_str));
        let message = match payload.get("message") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Some(Self { kind, message })
    }

    /// Encodes the message in the renderer's wire shape.
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "type": "console",
            "logType": self.kind,
            "message": self.message,
        })
    }
}

/// One line of the host console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLogEntry {
    pub kind: LogKind,
    pub message: String,
    pub timestamp: String,
}

/// Append-only console log, ordered by arrival.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    entries: Vec<ConsoleLogEntry>,
}

impl ConsoleLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry after all prior entries.
    pub fn push(&mut self, entry: ConsoleLogEntry) {
        self.entries.push(entry);
    }

    /// Returns entries in arrival order.
    pub fn entries(&self) -> &[ConsoleLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Producer half of the relay, handed to whatever hosts the renderer.
#[derive(Debug, Clone)]
pub struct RelaySender {
    tx: mpsc::UnboundedSender<Value>,
}

impl RelaySender {
    /// Posts a structured payload.
    pub fn post(&self, payload: Value) -> Result<()> {
        self.tx.send(payload).map_err(|_| Error::RelayClosed)
    }

    /// Posts a payload given as JSON text.
    pub fn post_json(&self, raw: &str) -> Result<()> {
        let payload: Value = serde_json::from_str(raw)?;
        self.post(payload)
    }

    /// Posts a console message.
    pub fn console(&self, kind: LogKind, message: impl Into<String>) -> Result<()> {
        self.post(
            ConsoleMessage {
                kind,
                message: message.into(),
            }
            .to_payload(),
        )
    }
}

/// Consumer half of the relay, owned by the session.
#[derive(Debug)]
pub struct MessageRelay {
    rx: mpsc::UnboundedReceiver<Value>,
    tx: mpsc::UnboundedSender<Value>,
    timestamp_format: String,
}

impl MessageRelay {
    /// Creates a relay stamping entries with `timestamp_format` (chrono syntax).
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rx,
            tx,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Returns a new producer handle.
    pub fn sender(&self) -> RelaySender {
        RelaySender {
            tx: self.tx.clone(),
        }
    }

    /// Builds a log entry for a message, stamped with the current local time.
    pub fn stamp(&self, message: ConsoleMessage) -> ConsoleLogEntry {
        let now = chrono::Local::now();
        let mut timestamp = String::new();
        if write!(timestamp, "{}", now.format(&self.timestamp_format)).is_err() {
            timestamp = now.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
        }

        ConsoleLogEntry {
            kind: message.kind,
            message: message.message,
            timestamp,
        }
    }

    /// Moves every pending console message into `log`.
    ///
    /// Non-console payloads are dropped. Returns the number of entries appended.
    pub fn drain_into(&mut self, log: &mut ConsoleLog) -> usize {
        let mut appended = 0;
        while let Ok(payload) = self.rx.try_recv() {
            if let Some(message) = ConsoleMessage::from_payload(&payload) {
                log.push(self.stamp(message));
                appended += 1;
            } else {
                tracing::trace!(payload = %payload, "ignoring non-console message");
            }
        }
        appended
    }

    /// Waits for the next console message and appends it to `log`.
    ///
    /// Returns `None` once every sender is gone. Since the relay holds a
    /// sender of its own this only happens after [`MessageRelay::close`].
    pub async fn recv_into(&mut self, log: &mut ConsoleLog) -> Option<ConsoleLogEntry> {
        loop {
            let payload = self.rx.recv().await?;
            if let Some(message) = ConsoleMessage::from_payload(&payload) {
                let entry = self.stamp(message);
                log.push(entry.clone());
                return Some(entry);
            }
        }
    }

    /// Stops accepting new messages; pending ones can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
