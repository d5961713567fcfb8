//! One-shot wiring of sinks and bridges at process start.
//!
//! # Order
//! ```text
//! 1. open console, file and (debug mode) diagnostic file sinks
//! 2. swap console and file in for the previous default sinks
//! 3. debug mode only: warn, then register the diagnostic sink at TRACE
//! 4. capture_stdout only: redirect fd 1 into the pipeline
//! 5. legacy `log` handler    (all levels pass; sinks filter)
//! ```
//!
//! # Design Decisions
//! - Bootstrap never creates custom sinks, so running it again replaces the
//!   default set and leaves custom sinks untouched
//! - Every sink is opened before the registry changes: a sink that cannot be
//!   opened aborts the run and the previous defaults keep working

use std::io::{self, Write};
use std::panic::Location;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::logging::capture::StreamCapture;
use crate::logging::error::LoggingError;
use crate::logging::format::Format;
use crate::logging::intercept::{self, HandlerHandle, InterceptAdapter};
use crate::logging::layer::SinkLayer;
use crate::logging::level::Level;
use crate::logging::logger::Logger;
#[cfg(unix)]
use crate::logging::redirect::{self, StdoutRedirect};
use crate::logging::sink::{Lifecycle, Sink, SinkId, SinkRegistry};

pub const DEBUG_MODE_WARNING: &str = "Debug mode is enabled. Use it with care in production!";

/// Builder for the logging pipeline.
pub struct Bootstrap<'a> {
    config: &'a LoggingConfig,
    started_at: DateTime<Local>,
    console: Option<Box<dyn Write + Send>>,
    legacy_handler: bool,
}

impl<'a> Bootstrap<'a> {
    pub fn new(config: &'a LoggingConfig) -> Self {
        Self {
            config,
            started_at: Local::now(),
            console: None,
            legacy_handler: true,
        }
    }

    /// Timestamp used to name the log files.
    pub fn started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Send console output to `writer` (uncolored) instead of stdout.
    pub fn console_writer<W>(mut self, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.console = Some(Box::new(writer));
        self
    }

    /// Leave the `log` facade alone.
    pub fn without_legacy_handler(mut self) -> Self {
        self.legacy_handler = false;
        self
    }

    pub fn run(self) -> Result<LoggingContext, LoggingError> {
        let logger = Logger::new(Arc::new(SinkRegistry::new()));
        let mut context = LoggingContext {
            logger,
            capture_level: Level::INFO,
            legacy: None,
            #[cfg(unix)]
            stdout: None,
        };
        self.run_on(&mut context)?;
        Ok(context)
    }

    /// Re-run bootstrap against an existing context.
    ///
    /// On error the context keeps its previous default sinks.
    pub fn run_on(self, context: &mut LoggingContext) -> Result<(), LoggingError> {
        let config = self.config;
        let threshold: Level = config.level.parse()?;
        let capture_level: Level = config.capture_level.parse()?;
        let logger = context.logger.clone();
        let registry = logger.registry();

        let console = match self.console {
            Some(writer) => Sink::writer("console", writer, threshold, Format::Standard),
            None if config.capture_stdout => {
                let terminal = context.terminal().map_err(LoggingError::StdoutRedirect)?;
                Sink::console_on(terminal, threshold)
            }
            None => Sink::console(threshold),
        };

        let rotation = config.rotation.rotation();
        let prefix = format!(
            "{}_{}",
            config.file_prefix,
            self.started_at.format("%Y-%m-%d_%H-%M-%S")
        );
        let file = Sink::file(&config.log_dir, &prefix, rotation.clone(), threshold, Format::Standard)?;
        let trace = if config.debug_mode {
            Some(Sink::file(
                &config.log_dir,
                &format!("{prefix}_DEBUG"),
                rotation,
                Level::TRACE,
                Format::Diagnostic,
            )?)
        } else {
            None
        };

        // fd 1 must reach the terminal again before a plain stdout console is live
        if !config.capture_stdout {
            context.release_stdout();
        }
        registry.replace_defaults(vec![console, file]);
        tracing::debug!(sinks = registry.len(), "default sinks installed");

        if let Some(trace) = trace {
            logger.warning(DEBUG_MODE_WARNING);
            registry.add(trace.with_lifecycle(Lifecycle::Default));
        }

        context.capture_level = capture_level;
        if config.capture_stdout {
            context.redirect_stdout()?;
        }
        if self.legacy_handler {
            let adapter = InterceptAdapter::new(logger.clone());
            context.legacy = Some(intercept::install(Arc::new(adapter))?);
        }
        Ok(())
    }
}

/// The running logging pipeline: owns the logger, the `log` registration
/// and the stdout redirect.
#[derive(Debug)]
pub struct LoggingContext {
    logger: Logger,
    capture_level: Level,
    legacy: Option<HandlerHandle>,
    #[cfg(unix)]
    stdout: Option<(Level, StdoutRedirect)>,
}

impl LoggingContext {
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn registry(&self) -> &SinkRegistry {
        self.logger.registry()
    }

    /// Registration of the legacy handler, if bootstrap installed one.
    pub fn legacy_handler(&self) -> Option<&HandlerHandle> {
        self.legacy.as_ref()
    }

    /// Text capture at the configured capture level.
    #[track_caller]
    pub fn capture(&self) -> StreamCapture {
        let location = Location::caller();
        StreamCapture::new_at(self.logger.clone(), location).with_level(self.capture_level)
    }

    pub fn tracing_layer(&self) -> SinkLayer {
        SinkLayer::new(self.logger.clone())
    }

    /// Route `tracing` events process-wide into the sinks.
    ///
    /// `RUST_LOG` may narrow the events seen; by default everything passes and
    /// the sinks' own thresholds apply.
    pub fn install_tracing_subscriber(&self) -> Result<(), LoggingError> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(self.tracing_layer());
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(())
    }

    /// Run `bootstrap` again on this context, replacing the default sinks.
    pub fn reconfigure(&mut self, bootstrap: Bootstrap<'_>) -> Result<(), LoggingError> {
        bootstrap.run_on(self)
    }

    /// Register a custom sink; it survives re-bootstrap.
    pub fn add_sink(&self, sink: Sink) -> SinkId {
        self.registry().add_custom(sink)
    }

    /// Handle on the real terminal, bypassing any stdout redirect.
    #[cfg(unix)]
    fn terminal(&self) -> io::Result<std::fs::File> {
        match &self.stdout {
            Some((_, active)) => active.original_stdout(),
            None => redirect::duplicate_stdout(),
        }
    }

    #[cfg(not(unix))]
    fn terminal(&self) -> io::Result<io::Stdout> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "stdout capture needs a unix platform"))
    }

    #[cfg(unix)]
    fn redirect_stdout(&mut self) -> Result<(), LoggingError> {
        if self.stdout.as_ref().is_some_and(|(level, _)| *level == self.capture_level) {
            return Ok(());
        }
        self.release_stdout();
        let redirect = StdoutRedirect::install(self.logger.clone(), self.capture_level)
            .map_err(LoggingError::StdoutRedirect)?;
        self.stdout = Some((self.capture_level, redirect));
        Ok(())
    }

    #[cfg(not(unix))]
    fn redirect_stdout(&mut self) -> Result<(), LoggingError> {
        Err(LoggingError::StdoutRedirect(io::Error::new(
            io::ErrorKind::Unsupported,
            "stdout capture needs a unix platform",
        )))
    }

    fn release_stdout(&mut self) {
        #[cfg(unix)]
        if let Some((_, redirect)) = self.stdout.take() {
            if let Err(e) = redirect.restore() {
                self.logger.error(format!("failed to restore stdout: {e}"));
            }
        }
    }

    /// Revoke the legacy handler, restore stdout, flush and drop the default sinks.
    pub fn teardown(mut self) {
        if let Some(handle) = self.legacy.take() {
            handle.revoke();
        }
        self.release_stdout();
        self.logger.flush();
        self.registry().clear_defaults();
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::TimeZone;

    use super::*;
    use crate::logging::sink::Destination;
    use crate::logging::test_support::SharedBuffer;

    fn config(dir: &Path, debug_mode: bool) -> LoggingConfig {
        LoggingConfig {
            level: "info".to_string(),
            debug_mode,
            log_dir: dir.to_path_buf(),
            ..LoggingConfig::default()
        }
    }

    fn started() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    fn boot(config: &LoggingConfig, console: &SharedBuffer) -> LoggingContext {
        Bootstrap::new(config)
            .started_at(started())
            .console_writer(console.clone())
            .without_legacy_handler()
            .run()
            .unwrap()
    }

    fn file_paths(context: &LoggingContext) -> Vec<PathBuf> {
        context
            .registry()
            .sinks()
            .iter()
            .filter_map(|sink| match sink.destination() {
                Destination::File(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_default_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let console = SharedBuffer::default();
        let context = boot(&config(dir.path(), false), &console);

        let sinks = context.registry().sinks();
        assert_eq!(sinks.len(), 2);
        assert!(sinks.iter().all(|sink| sink.min_level() == Level::INFO));
        assert!(sinks.iter().all(|sink| sink.lifecycle() == Lifecycle::Default));
        assert_eq!(
            file_paths(&context),
            vec![dir.path().join("obgw-log_2024-05-01_12-30-00.log")]
        );

        context.logger().info("ready");
        context.logger().debug("below threshold");
        let contents = std::fs::read_to_string(&file_paths(&context)[0]).unwrap();
        assert!(contents.contains("[INFO | logging::bootstrap] ready"));
        assert!(!contents.contains("below threshold"));
        assert_eq!(console.messages(), vec!["ready".to_string()]);
    }

    #[test]
    fn test_debug_mode_adds_trace_sink() {
        let dir = tempfile::tempdir().unwrap();
        let console = SharedBuffer::default();
        let context = boot(&config(dir.path(), true), &console);

        let sinks = context.registry().sinks();
        assert_eq!(sinks.len(), 3);
        assert_eq!(sinks[2].min_level(), Level::TRACE);
        assert_eq!(sinks[2].format(), Format::Diagnostic);

        let paths = file_paths(&context);
        assert_eq!(paths[1], dir.path().join("obgw-log_2024-05-01_12-30-00_DEBUG.log"));

        // the warning predates the trace sink
        assert_eq!(console.messages(), vec![DEBUG_MODE_WARNING.to_string()]);
        assert!(std::fs::read_to_string(&paths[0]).unwrap().contains(DEBUG_MODE_WARNING));
        assert!(!std::fs::read_to_string(&paths[1]).unwrap().contains(DEBUG_MODE_WARNING));

        context.logger().trace("fine grained");
        let trace = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(trace.contains("<DEBUGMSG:UPTIME("));
        assert!(trace.contains("MOD(bootstrap);"));
        assert!(trace.ends_with("fine grained\n"));
    }

    #[test]
    fn test_rerun_replaces_defaults_and_keeps_custom() {
        let dir = tempfile::tempdir().unwrap();
        let console = SharedBuffer::default();
        let config = config(dir.path(), true);
        let mut context = boot(&config, &console);
        let audit = SharedBuffer::default();
        context.add_sink(Sink::writer("audit", audit.clone(), Level::ERROR, Format::Standard));

        for _ in 0..2 {
            let bootstrap = Bootstrap::new(&config)
                .started_at(started())
                .console_writer(console.clone())
                .without_legacy_handler();
            context.reconfigure(bootstrap).unwrap();
        }

        let sinks = context.registry().sinks();
        assert_eq!(sinks.len(), 4);
        assert_eq!(sinks.iter().filter(|s| s.lifecycle() == Lifecycle::Custom).count(), 1);

        context.logger().error("once");
        assert_eq!(audit.messages(), vec!["once".to_string()]);
    }

    #[test]
    fn test_capture_uses_configured_level() {
        let dir = tempfile::tempdir().unwrap();
        let console = SharedBuffer::default();
        let mut config = config(dir.path(), false);
        config.capture_level = "warning".to_string();
        let context = boot(&config, &console);

        context.capture().write("printed\n");

        assert!(console.contents().contains("[WARNING | logging::bootstrap] printed"));
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), false);
        config.level = "chatty".to_string();

        let result = Bootstrap::new(&config).without_legacy_handler().run();
        assert!(matches!(result, Err(LoggingError::UnknownLevel(name)) if name == "chatty"));
    }

    #[test]
    fn test_unwritable_log_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let config = config(&blocker.join("logs"), false);

        let result = Bootstrap::new(&config)
            .console_writer(std::io::sink())
            .without_legacy_handler()
            .run();
        assert!(matches!(result, Err(LoggingError::LogDirectory { .. })));
    }

    #[test]
    fn test_failed_reconfigure_keeps_previous_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let console = SharedBuffer::default();
        let mut context = boot(&config(dir.path(), false), &console);
        let before: Vec<_> = context.registry().sinks().iter().map(|s| s.destination().clone()).collect();

        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let broken = config(&blocker.join("logs"), true);
        let bootstrap = Bootstrap::new(&broken)
            .started_at(started())
            .console_writer(std::io::sink())
            .without_legacy_handler();
        let result = context.reconfigure(bootstrap);
        assert!(matches!(result, Err(LoggingError::LogDirectory { .. })));

        let after: Vec<_> = context.registry().sinks().iter().map(|s| s.destination().clone()).collect();
        assert_eq!(before, after);
        context.logger().info("still here");
        assert_eq!(console.messages(), vec!["still here".to_string()]);
        let contents = std::fs::read_to_string(&file_paths(&context)[0]).unwrap();
        assert!(contents.contains("still here"));
    }

    #[test]
    fn test_teardown_drops_default_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let console = SharedBuffer::default();
        let context = boot(&config(dir.path(), false), &console);
        let registry = Arc::clone(context.logger().registry());

        context.teardown();
        assert!(registry.is_empty());
    }
}
