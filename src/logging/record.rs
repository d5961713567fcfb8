//! Log records and the call-site, process and thread context they carry.

use std::panic::Location;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::logging::level::Level;

/// Source location a record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// File stem of the source file (e.g. `server` for `src/http/server.rs`).
    pub module: String,
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        let file = file.into();
        Self {
            module: file_stem(&file),
            file,
            line,
        }
    }

    /// Placeholder for records whose origin cannot be determined.
    pub fn unknown() -> Self {
        Self {
            module: "<unknown>".to_string(),
            file: "<unknown>".to_string(),
            line: 0,
        }
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }

    /// Module-like name derived from the file path, e.g. `http::server`.
    pub fn path_name(&self) -> String {
        let trimmed = self.file.trim_end_matches(".rs");
        let trimmed = trimmed
            .strip_prefix("src/")
            .or_else(|| trimmed.strip_prefix("./src/"))
            .unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix("/mod").unwrap_or(trimmed);
        trimmed.replace(['/', '\\'], "::")
    }
}

fn file_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

/// Identity of the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub id: u32,
    pub name: String,
}

impl ProcessInfo {
    pub fn current() -> Self {
        static NAME: OnceLock<String> = OnceLock::new();
        let name = NAME.get_or_init(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "<unknown>".to_string())
        });
        Self {
            id: std::process::id(),
            name: name.clone(),
        }
    }
}

/// Identity of the thread a record was created on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: String,
    pub name: String,
}

impl ThreadInfo {
    pub fn current() -> Self {
        let thread = std::thread::current();
        // `ThreadId` only exposes its number through Debug: "ThreadId(7)".
        let raw = format!("{:?}", thread.id());
        let id = raw
            .trim_start_matches("ThreadId(")
            .trim_end_matches(')')
            .to_string();
        Self {
            id,
            name: thread.name().unwrap_or("<unnamed>").to_string(),
        }
    }
}

/// A single log event, created per logging call and consumed by the fan-out.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub time: DateTime<Local>,
    /// Time since the owning logger was created.
    pub elapsed: Duration,
    pub level: Level,
    pub message: String,
    /// Logger or module name the record was emitted under.
    pub name: String,
    pub caller: Caller,
    /// Exception or error chain text, forwarded verbatim.
    pub exception: Option<String>,
    pub process: ProcessInfo,
    pub thread: ThreadInfo,
}

impl LogRecord {
    /// Create a record stamped with the current time, process and thread.
    pub fn new(level: Level, message: impl Into<String>, name: impl Into<String>, caller: Caller) -> Self {
        Self {
            time: Local::now(),
            elapsed: Duration::ZERO,
            level,
            message: message.into(),
            name: name.into(),
            caller,
            exception: None,
            process: ProcessInfo::current(),
            thread: ThreadInfo::current(),
        }
    }

    pub fn with_exception(mut self, exception: Option<String>) -> Self {
        self.exception = exception;
        self
    }
}
