//! `tracing` integration: events from `tracing` macros become log records.

use std::error::Error;
use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::logging::level::LevelMapper;
use crate::logging::logger::Logger;
use crate::logging::record::Caller;

/// Subscriber layer that forwards every event to a [`Logger`].
///
/// Events keep their own file, line and target. A `level` field naming a
/// structured level (e.g. `level = "CRITICAL"`) overrides the event level;
/// `exception` or `error` fields become the record's exception text.
#[derive(Debug, Clone)]
pub struct SinkLayer {
    logger: Logger,
    mapper: LevelMapper,
}

impl SinkLayer {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            mapper: LevelMapper::new(),
        }
    }
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let base = self.mapper.from_tracing(*metadata.level());
        let level = match visitor.level.as_deref() {
            Some(name) => self.mapper.resolve(name, base.severity()),
            None => base,
        };
        let caller = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => Caller::new(file, line),
            _ => Caller::unknown(),
        };

        let exception = visitor.exception.take();
        self.logger.emit(
            level,
            visitor.into_message(),
            metadata.target(),
            caller,
            exception,
        );
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: String,
    level: Option<String>,
    exception: Option<String>,
}

impl EventVisitor {
    fn into_message(self) -> String {
        self.message + &self.fields
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        let _ = write!(self.fields, " {name}={value}");
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "level" => self.level = Some(value.to_string()),
            "exception" | "error" => self.exception = Some(value.to_string()),
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        let mut chain = value.to_string();
        let mut source = value.source();
        while let Some(cause) = source {
            let _ = write!(chain, "\nCaused by: {cause}");
            source = cause.source();
        }
        match field.name() {
            "exception" | "error" => self.exception = Some(chain),
            name => self.push_field(name, format_args!("{chain}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "level" => self.level = Some(format!("{value:?}").trim_matches('"').to_string()),
            "exception" | "error" => self.exception = Some(format!("{value:?}")),
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }
}
