//! Logging subsystem.
//!
//! Every way the process produces diagnostic text ends up in one sink set.
//!
//! # Data Flow
//! ```text
//! Producers:
//!     → logger.rs    (Logger methods, direct structured calls)
//!     → layer.rs     (tracing macros, via SinkLayer)
//!     → intercept.rs (log facade macros, via InterceptAdapter)
//!     → capture.rs   (raw text written to a StreamCapture)
//!     → redirect.rs  (optional: anything written to fd 1, via a pipe)
//!
//! Each producer resolves level (level.rs) and call site (caller.rs),
//! then builds a LogRecord (record.rs) and hands it to
//!     → sink.rs      (SinkRegistry fan-out, per-sink threshold)
//!     → format.rs    (standard or diagnostic line layout)
//!
//! bootstrap.rs wires the default sinks and bridges once at startup.
//! ```
//!
//! # Design Decisions
//! - Thresholds live on sinks; bridges pass every level through
//! - A record is formatted once per sink and written in a single call
//! - Call sites come from `#[track_caller]` and record metadata, never from
//!   unwinding the stack

pub mod bootstrap;
pub mod caller;
pub mod capture;
pub mod error;
pub mod format;
pub mod intercept;
pub mod layer;
pub mod level;
pub mod logger;
pub mod record;
#[cfg(unix)]
pub mod redirect;
pub mod sink;

pub use bootstrap::{Bootstrap, LoggingContext};
pub use caller::{CallerResolver, Frame};
pub use capture::StreamCapture;
pub use error::LoggingError;
pub use format::Format;
pub use intercept::{HandlerHandle, InterceptAdapter};
pub use layer::SinkLayer;
pub use level::{Level, LevelMapper};
pub use logger::Logger;
pub use record::{Caller, LogRecord};
#[cfg(unix)]
pub use redirect::StdoutRedirect;
pub use sink::{Destination, Lifecycle, Sink, SinkId, SinkRegistry};
