//! Reframes raw text output as log records.
//!
//! # Responsibilities
//! - Split written text into lines and emit one record per non-blank line
//! - Attribute each record to the code that wrote the text
//!
//! # Design Decisions
//! - No line buffering across calls: each `write` is framed on its own, so
//!   two threads can never contribute to the same record
//! - `io::Write` input may split a multi-byte character; the incomplete tail
//!   is held until the next byte write completes it
//! - `flush` is a no-op; durability belongs to the sinks
//! - `io::Write` callers carry no call site and are attributed to the place
//!   the capture was created

use std::fmt;
use std::io;
use std::panic::Location;
use std::sync::{Mutex, PoisonError};

use crate::logging::caller::{CallerResolver, Frame};
use crate::logging::level::Level;
use crate::logging::logger::Logger;

/// Write sink that turns text into log records.
#[derive(Debug)]
pub struct StreamCapture {
    logger: Logger,
    level: Level,
    resolver: CallerResolver,
    origin: Frame,
    partial: Mutex<Vec<u8>>,
}

impl Clone for StreamCapture {
    fn clone(&self) -> Self {
        Self {
            logger: self.logger.clone(),
            level: self.level,
            resolver: self.resolver.clone(),
            origin: self.origin.clone(),
            partial: Mutex::default(),
        }
    }
}

impl StreamCapture {
    /// Capture at INFO, attributing `io::Write` output to the caller of `new`.
    #[track_caller]
    pub fn new(logger: Logger) -> Self {
        Self::new_at(logger, Location::caller())
    }

    /// Capture attributing `io::Write` output to `origin`.
    pub fn new_at(logger: Logger, origin: &Location<'_>) -> Self {
        Self {
            logger,
            level: Level::INFO,
            resolver: CallerResolver::default(),
            origin: Frame::from_location(origin),
            partial: Mutex::default(),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Emit each non-blank line of `buffer`; returns the number of records.
    #[track_caller]
    pub fn write(&self, buffer: &str) -> usize {
        self.write_from(buffer, Frame::from_location(Location::caller()))
    }

    pub fn flush(&self) {}

    fn write_from(&self, buffer: &str, writer: Frame) -> usize {
        let frames = [Frame::new(Some(module_path!()), file!(), line!()), writer];
        let caller = self.resolver.caller(&frames);
        let name = caller.path_name();

        let mut emitted = 0;
        for line in buffer.trim_end().lines() {
            let line = line.trim_end();
            if line.trim_start().is_empty() {
                continue;
            }
            self.logger.emit(self.level, line, name.as_str(), caller.clone(), None);
            emitted += 1;
        }
        emitted
    }

    fn write_bytes(&self, buf: &[u8]) -> usize {
        let text = {
            let mut partial = self.partial.lock().unwrap_or_else(PoisonError::into_inner);
            partial.extend_from_slice(buf);
            let complete = match std::str::from_utf8(&partial) {
                Err(err) if err.error_len().is_none() => err.valid_up_to(),
                _ => partial.len(),
            };
            let rest = partial.split_off(complete);
            let text = String::from_utf8_lossy(&partial).into_owned();
            *partial = rest;
            text
        };
        self.write_from(&text, self.origin.clone());
        buf.len()
    }

    // `write!` would otherwise hand each formatted fragment to `write` separately.
    fn write_args(&self, args: fmt::Arguments<'_>) {
        self.write_from(&args.to_string(), self.origin.clone());
    }
}

impl io::Write for StreamCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf))
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_args(args);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &StreamCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf))
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_args(args);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `println!` into a [`StreamCapture`], attributed to the macro call site.
#[macro_export]
macro_rules! capture_println {
    ($capture:expr) => {
        $capture.write("\n")
    };
    ($capture:expr, $($arg:tt)*) => {
        $capture.write(&::std::format!($($arg)*))
    };
}
