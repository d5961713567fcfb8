//! Line templates for rendering records.
//!
//! ```text
//! Standard:   [2024-05-01 12:00:00 +08:00] [INFO | http::server] message
//! Diagnostic: [2024-05-01 12:00:00 +08:00] [INFO | http::server] <DEBUGMSG:UPTIME(0:00:01.250000);
//!             MOD(server);LINE(42);PROC:(onebot-gateway [PID 7]);THREAD:(main [TID 1])> message
//! ```

use std::fmt::Write as _;
use std::time::Duration;

use crate::logging::level::Level;
use crate::logging::record::LogRecord;

const RESET: &str = "\x1b[0m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const MAGENTA: &str = "\x1b[35m";
const YELLOW: &str = "\x1b[33m";

/// Output template of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Timestamp, level, name and message.
    Standard,
    /// `Standard` plus uptime, module, line, process and thread columns.
    Diagnostic,
}

impl Format {
    /// Render `record` as one line (plus exception lines), newline terminated.
    pub fn render(&self, record: &LogRecord, ansi: bool) -> String {
        let mut out = String::with_capacity(128 + record.message.len());
        let paint = |code: &'static str| if ansi { code } else { "" };
        let reset = paint(RESET);

        let _ = write!(
            out,
            "[{}{}{} {}{}{} {}{}{}] [{}{}{} | {}{}{}] ",
            paint(BLUE),
            record.time.format("%Y-%m-%d"),
            reset,
            paint(CYAN),
            record.time.format("%H:%M:%S"),
            reset,
            paint(MAGENTA),
            record.time.format("%:z"),
            reset,
            paint(level_color(record.level)),
            record.level,
            reset,
            paint(YELLOW),
            record.name,
            reset,
        );

        if *self == Format::Diagnostic {
            let _ = write!(
                out,
                "<DEBUGMSG:UPTIME({});MOD({});LINE({});PROC:({} [PID {}]);THREAD:({} [TID {}])> ",
                format_elapsed(record.elapsed),
                record.caller.module,
                record.caller.line,
                record.process.name,
                record.process.id,
                record.thread.name,
                record.thread.id,
            );
        }

        out.push_str(&record.message);
        out.push('\n');
        if let Some(exception) = &record.exception {
            out.push_str(exception.trim_end());
            out.push('\n');
        }
        out
    }
}

fn level_color(level: Level) -> &'static str {
    match level {
        l if l >= Level::CRITICAL => "\x1b[1;41m",
        l if l >= Level::ERROR => "\x1b[1;31m",
        l if l >= Level::WARNING => "\x1b[1;33m",
        l if l >= Level::SUCCESS => "\x1b[1;32m",
        l if l >= Level::INFO => "\x1b[1m",
        l if l >= Level::DEBUG => "\x1b[1;34m",
        _ => "\x1b[1;36m",
    }
}

/// `H:MM:SS.micros`, hours unbounded.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{}:{:02}:{:02}.{:06}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        elapsed.subsec_micros()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::record::Caller;

    fn record() -> LogRecord {
        LogRecord::new(Level::WARNING, "disk almost full", "storage::disk", Caller::new("src/storage/disk.rs", 17))
    }

    #[test]
    fn test_standard_plain() {
        let line = Format::Standard.render(&record(), false);

        assert!(line.starts_with('['));
        assert!(line.ends_with("] [WARNING | storage::disk] disk almost full\n"));
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn test_standard_colored() {
        let line = Format::Standard.render(&record(), true);

        assert!(line.contains("\x1b[1;33mWARNING\x1b[0m"));
        assert!(line.contains("\x1b[33mstorage::disk\x1b[0m"));
    }

    #[test]
    fn test_diagnostic_columns() {
        let mut record = record();
        record.elapsed = Duration::from_millis(3_725_250);
        let line = Format::Diagnostic.render(&record, false);

        assert!(line.contains("<DEBUGMSG:UPTIME(1:02:05.250000);MOD(disk);LINE(17);PROC:("));
        assert!(line.contains(&format!("[PID {}]", std::process::id())));
        assert!(line.ends_with("])> disk almost full\n"));
    }

    #[test]
    fn test_exception_follows_message() {
        let record = record().with_exception(Some("Error: io failure\nCaused by: EACCES\n".into()));
        let line = Format::Standard.render(&record, false);

        assert!(line.ends_with("disk almost full\nError: io failure\nCaused by: EACCES\n"));
    }

    #[test]
    fn test_custom_level_label() {
        let mut record = record();
        record.level = Level::from_severity(35);

        assert!(Format::Standard.render(&record, false).contains("[Level 35 | storage::disk]"));
    }
}
