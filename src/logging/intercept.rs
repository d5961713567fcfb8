//! Bridge from the `log` facade into the structured logger.
//!
//! # Responsibilities
//! - Map each legacy record's level onto the canonical scale
//! - Attribute the record to the code that called `log::*!`, not to the bridge
//! - Forward attached exception text unchanged
//! - Own the process-wide `log` registration behind a revocable handle
//!
//! # Design Decisions
//! - The `log` facade accepts one logger per process, so a static forwarder
//!   is registered once and the active handler lives in a swappable slot
//! - The facade's max level is `Trace`: thresholds belong to the sinks
//! - Handlers are replaced, never stacked; the newest install wins

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;
use log::kv::Key;

use crate::logging::caller::{CallerResolver, Frame};
use crate::logging::error::LoggingError;
use crate::logging::level::LevelMapper;
use crate::logging::logger::Logger;

/// Key-values a legacy record may use to carry exception text.
const EXCEPTION_KEYS: [&str; 2] = ["exception", "error"];

/// Key-value a legacy record may use to name a structured level.
const LEVEL_KEY: &str = "level";

/// Re-emits `log` records through a [`Logger`].
#[derive(Debug, Clone)]
pub struct InterceptAdapter {
    logger: Logger,
    mapper: LevelMapper,
    resolver: CallerResolver,
}

impl InterceptAdapter {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            mapper: LevelMapper::new(),
            resolver: CallerResolver::default(),
        }
    }

    pub fn handle(&self, record: &log::Record<'_>) {
        let name_override = record_value(record, LEVEL_KEY);
        let level = self.mapper.resolve_legacy(record.level(), name_override.as_deref());

        let frames = [
            Frame::new(Some(module_path!()), file!(), line!()),
            Frame::from_record(record),
        ];
        let caller = self.resolver.caller(&frames);

        let exception = EXCEPTION_KEYS.iter().find_map(|key| record_value(record, key));

        self.logger.emit(
            level,
            record.args().to_string(),
            record.target(),
            caller,
            exception,
        );
    }
}

fn record_value(record: &log::Record<'_>, key: &str) -> Option<String> {
    record
        .key_values()
        .get(Key::from_str(key))
        .map(|value| value.to_string())
}

impl log::Log for InterceptAdapter {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        self.handle(record);
    }

    fn flush(&self) {
        self.logger.flush();
    }
}

struct Registration {
    id: u64,
    handler: Arc<dyn log::Log>,
}

/// The logger actually registered with the `log` facade.
struct Forwarder {
    active: ArcSwapOption<Registration>,
}

impl log::Log for Forwarder {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.active
            .load()
            .as_ref()
            .is_some_and(|registration| registration.handler.enabled(metadata))
    }

    fn log(&self, record: &log::Record<'_>) {
        if let Some(registration) = self.active.load().as_ref() {
            registration.handler.log(record);
        }
    }

    fn flush(&self) {
        if let Some(registration) = self.active.load().as_ref() {
            registration.handler.flush();
        }
    }
}

static FORWARDER: Forwarder = Forwarder {
    active: ArcSwapOption::const_empty(),
};

static NEXT_REGISTRATION: AtomicU64 = AtomicU64::new(1);

/// Install `handler` as the process-wide `log` handler, replacing any other.
///
/// Fails only if a logger outside this module already owns the facade.
pub fn install(handler: Arc<dyn log::Log>) -> Result<HandlerHandle, LoggingError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    if !*REGISTERED.get_or_init(|| log::set_logger(&FORWARDER).is_ok()) {
        return Err(LoggingError::LegacyLoggerTaken);
    }
    log::set_max_level(log::LevelFilter::Trace);

    let id = NEXT_REGISTRATION.fetch_add(1, Ordering::Relaxed);
    FORWARDER.active.store(Some(Arc::new(Registration { id, handler })));
    Ok(HandlerHandle { id, revoked: false })
}

/// Id of the currently installed handler, if any.
pub fn active_handler() -> Option<u64> {
    FORWARDER.active.load().as_ref().map(|registration| registration.id)
}

/// Registration of a `log` handler. Dropping the handle revokes it.
#[derive(Debug)]
pub struct HandlerHandle {
    id: u64,
    revoked: bool,
}

impl HandlerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether this registration is still the active handler.
    pub fn is_active(&self) -> bool {
        active_handler() == Some(self.id)
    }

    /// Uninstall this handler; returns false if it had already been replaced.
    pub fn revoke(mut self) -> bool {
        self.revoke_in_place()
    }

    fn revoke_in_place(&mut self) -> bool {
        if self.revoked {
            return false;
        }
        self.revoked = true;
        let id = self.id;
        let previous = FORWARDER.active.rcu(|current| match current {
            Some(registration) if registration.id == id => None,
            other => other.clone(),
        });
        previous.is_some_and(|registration| registration.id == id)
    }
}

impl Drop for HandlerHandle {
    fn drop(&mut self) {
        self.revoke_in_place();
    }
}
