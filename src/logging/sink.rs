//! Output destinations and the registry that fans records out to them.
//!
//! # Responsibilities
//! - Own each destination's writer and serialise physical writes to it
//! - Deliver a record to every sink whose threshold it meets
//! - Track which sinks bootstrap owns (default) and which callers added (custom)
//!
//! # Design Decisions
//! - The sink list is copy-on-write behind `ArcSwap`: emitting never takes a
//!   registry lock, mutations replace the whole list
//! - One rendered record is written with a single `write_all` under the
//!   sink's own mutex, so lines from concurrent threads never interleave
//! - Write failures after startup go to stderr; the logging caller never sees them

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::logging::error::LoggingError;
use crate::logging::format::Format;
use crate::logging::level::Level;
use crate::logging::record::LogRecord;

/// Registry-assigned sink identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

/// Who owns a sink's registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Registered by bootstrap; replaced on every re-bootstrap.
    Default,
    /// Registered by application code; survives re-bootstrap.
    Custom,
}

/// Where a sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Console,
    /// Base path of the (possibly rotating) log file.
    File(PathBuf),
    /// Caller-provided writer.
    Writer,
}

/// A configured log destination with a minimum level and a format.
pub struct Sink {
    id: SinkId,
    name: String,
    destination: Destination,
    min_level: Level,
    format: Format,
    ansi: bool,
    lifecycle: Lifecycle,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("destination", &self.destination)
            .field("min_level", &self.min_level)
            .field("format", &self.format)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl Sink {
    fn build(
        name: impl Into<String>,
        destination: Destination,
        min_level: Level,
        format: Format,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            id: SinkId(0),
            name: name.into(),
            destination,
            min_level,
            format,
            ansi: false,
            lifecycle: Lifecycle::Custom,
            writer: Mutex::new(writer),
        }
    }

    /// Colored standard-format sink on the process's stdout.
    pub fn console(min_level: Level) -> Self {
        Self::console_on(io::stdout(), min_level)
    }

    /// [`Sink::console`] on an explicit terminal handle.
    pub fn console_on<W>(terminal: W, min_level: Level) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::build("console", Destination::Console, min_level, Format::Standard, Box::new(terminal))
            .with_ansi(true)
    }

    /// File sink named `<prefix>.log` in `directory` (rotation appends the period).
    ///
    /// The directory is created if missing; an unwritable location is an error.
    pub fn file(
        directory: &Path,
        prefix: &str,
        rotation: Rotation,
        min_level: Level,
        format: Format,
    ) -> Result<Self, LoggingError> {
        std::fs::create_dir_all(directory).map_err(|source| LoggingError::LogDirectory {
            path: directory.to_path_buf(),
            source,
        })?;
        let base = directory.join(format!("{prefix}.log"));
        let appender = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .build(directory)
            .map_err(|source| LoggingError::LogFile {
                path: base.clone(),
                source,
            })?;
        Ok(Self::build(prefix, Destination::File(base), min_level, format, Box::new(appender)))
    }

    /// Sink over an arbitrary writer.
    pub fn writer<W>(name: impl Into<String>, writer: W, min_level: Level, format: Format) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::build(name, Destination::Writer, min_level, format, Box::new(writer))
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn id(&self) -> SinkId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn accepts(&self, level: Level) -> bool {
        level >= self.min_level
    }

    pub fn write_record(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.format.render(record, self.ansi);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line.as_bytes())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }
}

/// Ordered set of sinks shared by every logging entry point.
#[derive(Debug)]
pub struct SinkRegistry {
    sinks: ArcSwap<Vec<Arc<Sink>>>,
    next_id: AtomicU64,
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self {
            sinks: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn assign_id(&self, sink: &mut Sink) -> SinkId {
        sink.id = SinkId(self.next_id.fetch_add(1, Ordering::Relaxed));
        sink.id
    }

    /// Register a sink after all existing ones.
    pub fn add(&self, mut sink: Sink) -> SinkId {
        let id = self.assign_id(&mut sink);
        let sink = Arc::new(sink);
        self.sinks.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(Arc::clone(&sink));
            next
        });
        id
    }

    /// Register a custom sink, replacing any custom sink with the same name.
    pub fn add_custom(&self, sink: Sink) -> SinkId {
        let name = sink.name.clone();
        self.retain(|existing| !(existing.lifecycle == Lifecycle::Custom && existing.name == name));
        self.add(sink.with_lifecycle(Lifecycle::Custom))
    }

    pub fn remove(&self, id: SinkId) -> bool {
        self.retain(|sink| sink.id != id) > 0
    }

    /// Drop every bootstrap-owned sink; returns how many were removed.
    pub fn clear_defaults(&self) -> usize {
        self.retain(|sink| sink.lifecycle != Lifecycle::Default)
    }

    /// Swap the whole default set for `sinks` in one update.
    ///
    /// Custom sinks stay where they are; the new defaults go after them.
    pub fn replace_defaults(&self, sinks: Vec<Sink>) -> Vec<SinkId> {
        let sinks: Vec<Arc<Sink>> = sinks
            .into_iter()
            .map(|mut sink| {
                self.assign_id(&mut sink);
                Arc::new(sink.with_lifecycle(Lifecycle::Default))
            })
            .collect();
        self.sinks.rcu(|current| {
            current
                .iter()
                .filter(|sink| sink.lifecycle != Lifecycle::Default)
                .chain(&sinks)
                .cloned()
                .collect::<Vec<_>>()
        });
        sinks.iter().map(|sink| sink.id).collect()
    }

    fn retain(&self, keep: impl Fn(&Sink) -> bool) -> usize {
        let previous = self.sinks.rcu(|current| {
            current
                .iter()
                .filter(|sink| keep(sink))
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().filter(|sink| !keep(sink)).count()
    }

    /// Snapshot of the registered sinks, in registration order.
    pub fn sinks(&self) -> Vec<Arc<Sink>> {
        Vec::clone(&self.sinks.load())
    }

    pub fn len(&self) -> usize {
        self.sinks.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any sink would accept a record at `level`.
    pub fn enabled(&self, level: Level) -> bool {
        self.sinks.load().iter().any(|sink| sink.accepts(level))
    }

    /// Deliver `record` to every sink whose threshold it meets.
    pub fn dispatch(&self, record: &LogRecord) {
        for sink in self.sinks.load().iter().filter(|sink| sink.accepts(record.level)) {
            if let Err(e) = sink.write_record(record) {
                let _ = writeln!(io::stderr(), "logging: sink '{}' failed to write: {}", sink.name, e);
            }
        }
    }

    pub fn flush(&self) {
        for sink in self.sinks.load().iter() {
            if let Err(e) = sink.flush() {
                let _ = writeln!(io::stderr(), "logging: sink '{}' failed to flush: {}", sink.name, e);
            }
        }
    }
}
