//! Errors raised while configuring the logging pipeline.
//!
//! Only bootstrap-time failures surface here; once sinks are running,
//! logging calls never fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    #[error("cannot create log directory {}: {source}", path.display())]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    #[error("cannot redirect stdout: {0}")]
    StdoutRedirect(#[source] io::Error),

    #[error("the legacy log facade is already owned by another logger")]
    LegacyLoggerTaken,

    #[error("a global tracing subscriber is already installed")]
    TracingSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}
