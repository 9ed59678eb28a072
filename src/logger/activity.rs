//! Activity log facade used by the CLI commands.
//!
//! Commands report [`ActivityEvent`]s; when a JSONL path is configured they are
//! converted to [`LogEntry`] lines, otherwise they are dropped. Logging is
//! synchronous: runs are short and every event is emitted from the thread
//! that owns the command.

#![allow(missing_docs)]

use parking_lot::Mutex;

use crate::core::config::LoggingConfig;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Events recorded by the organize and index commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    RunStarted {
        command: String,
        root: String,
        config_hash: String,
    },
    ArtifactMoved {
        source: String,
        destination: String,
        package: String,
    },
    ArtifactSkipped {
        source: String,
        reason: String,
    },
    DirectoryCreated {
        path: String,
    },
    IndexWritten {
        path: String,
        entries: usize,
    },
    RunCompleted {
        command: String,
        count: usize,
        duration_ms: u64,
    },
    Error {
        command: String,
        code: String,
        message: String,
    },
}

/// Activity log handle; a no-op when no JSONL path is configured.
pub struct ActivityLog {
    writer: Option<Mutex<JsonlWriter>>,
}

impl ActivityLog {
    pub fn open(config: &LoggingConfig) -> Self {
        Self {
            writer: JsonlConfig::from_logging(config).map(|cfg| Mutex::new(JsonlWriter::open(cfg))),
        }
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn log(&self, event: &ActivityEvent) {
        if let Some(writer) = &self.writer {
            writer.lock().write_entry(&event_to_log_entry(event));
        }
    }

    pub fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.lock().flush();
        }
    }
}

fn event_to_log_entry(event: &ActivityEvent) -> LogEntry {
    match event {
        ActivityEvent::RunStarted {
            command,
            root,
            config_hash,
        } => {
            let mut e = LogEntry::new(EventType::RunStart, Severity::Info);
            e.command = Some(command.clone());
            e.path = Some(root.clone());
            e.config_hash = Some(config_hash.clone());
            e.details = Some(format!("version={}", env!("CARGO_PKG_VERSION")));
            e
        }
        ActivityEvent::ArtifactMoved {
            source,
            destination,
            package,
        } => {
            let mut e = LogEntry::new(EventType::ArtifactMove, Severity::Info);
            e.path = Some(source.clone());
            e.destination = Some(destination.clone());
            e.package = Some(package.clone());
            e.ok = Some(true);
            e
        }
        ActivityEvent::ArtifactSkipped { source, reason } => {
            let mut e = LogEntry::new(EventType::ArtifactSkip, Severity::Warning);
            e.path = Some(source.clone());
            e.details = Some(reason.clone());
            e.ok = Some(false);
            e
        }
        ActivityEvent::DirectoryCreated { path } => {
            let mut e = LogEntry::new(EventType::DirectoryCreate, Severity::Info);
            e.path = Some(path.clone());
            e.ok = Some(true);
            e
        }
        ActivityEvent::IndexWritten { path, entries } => {
            let mut e = LogEntry::new(EventType::IndexWrite, Severity::Info);
            e.path = Some(path.clone());
            e.entries = Some(*entries as u64);
            e.ok = Some(true);
            e
        }
        ActivityEvent::RunCompleted {
            command,
            count,
            duration_ms,
        } => {
            let mut e = LogEntry::new(EventType::RunComplete, Severity::Info);
            e.command = Some(command.clone());
            e.count = Some(*count as u64);
            e.duration_ms = Some(*duration_ms);
            e.ok = Some(true);
            e
        }
        ActivityEvent::Error {
            command,
            code,
            message,
        } => {
            let mut e = LogEntry::new(EventType::Error, Severity::Critical);
            e.command = Some(command.clone());
            e.error_code = Some(code.clone());
            e.error_message = Some(message.clone());
            e.ok = Some(false);
            e
        }
    }
}
