use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

/// How much of each exchange the NDJSON message log captures.
pub enum MessageLogMode {
    /// Request lines and response statuses only.
    Requests,
    /// Requests plus decoded response bodies.
    Full,
}

/// Append-only NDJSON log of the client's traffic, for protocol debugging.
/// Credentials and bearer tokens are never written.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { mode, file })
    }

    pub fn log_auth(&mut self, status: u16) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "auth",
            "status": status,
        });
        self.write_line(&entry);
    }

    pub fn log_request(&mut self, method: &str, url: &str, body: Option<&Value>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": method,
            "url": url,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, status: u16, body: &str) {
        let entry = match self.mode {
            MessageLogMode::Requests => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "resp",
                "status": status,
            }),
            MessageLogMode::Full => {
                let body_json = serde_json::from_str(body).unwrap_or(Value::Null);
                json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "resp",
                    "status": status,
                    "body": body_json,
                })
            }
        };
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
