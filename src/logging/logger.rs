//! The structured logger handle.
//!
//! `Logger` is the context object every entry point emits through. It is
//! cheap to clone and carries the sink registry and the process start
//! instant used for uptime columns.

use std::panic::Location;
use std::sync::Arc;
use std::time::Instant;

use crate::logging::level::Level;
use crate::logging::record::{Caller, LogRecord};
use crate::logging::sink::SinkRegistry;

#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    registry: Arc<SinkRegistry>,
    started: Instant,
}

impl Logger {
    pub fn new(registry: Arc<SinkRegistry>) -> Self {
        Self::with_start(registry, Instant::now())
    }

    pub fn with_start(registry: Arc<SinkRegistry>, started: Instant) -> Self {
        Self {
            inner: Arc::new(Inner { registry, started }),
        }
    }

    pub fn registry(&self) -> &Arc<SinkRegistry> {
        &self.inner.registry
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.inner.registry.enabled(level)
    }

    /// Emit a record attributed to `caller`.
    ///
    /// Bridges call this with the call site they resolved; direct callers
    /// should prefer [`Logger::log`].
    pub fn emit(
        &self,
        level: Level,
        message: impl Into<String>,
        name: impl Into<String>,
        caller: Caller,
        exception: Option<String>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let mut record = LogRecord::new(level, message, name, caller).with_exception(exception);
        record.elapsed = self.inner.started.elapsed();
        self.inner.registry.dispatch(&record);
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.emit_here(level, message.into(), None, Location::caller());
    }

    /// Log with attached exception or error-chain text.
    #[track_caller]
    pub fn log_exception(&self, level: Level, message: impl Into<String>, exception: impl Into<String>) {
        self.emit_here(level, message.into(), Some(exception.into()), Location::caller());
    }

    fn emit_here(&self, level: Level, message: String, exception: Option<String>, location: &Location<'_>) {
        let caller = Caller::from_location(location);
        let name = caller.path_name();
        self.emit(level, message, name, caller, exception);
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::TRACE, message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message);
    }

    #[track_caller]
    pub fn success(&self, message: impl Into<String>) {
        self.log(Level::SUCCESS, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::WARNING, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::CRITICAL, message);
    }

    pub fn flush(&self) {
        self.inner.registry.flush();
    }
}
