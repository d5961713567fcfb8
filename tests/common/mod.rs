//! Shared utilities for integration tests.

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use onebot_gateway::config::LoggingConfig;

/// In-memory writer that stays readable after it is handed to a sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Message part of each standard-format line.
    #[allow(dead_code)]
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .iter()
            .filter_map(|line| line.splitn(3, "] ").nth(2).map(str::to_string))
            .collect()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Logging config writing into `dir`.
pub fn logging_config(dir: &Path, level: &str, debug_mode: bool) -> LoggingConfig {
    LoggingConfig {
        level: level.to_string(),
        debug_mode,
        log_dir: dir.to_path_buf(),
        ..LoggingConfig::default()
    }
}

/// Contents of the main (or, with `debug`, the diagnostic) log file in `dir`.
pub fn read_log(dir: &Path, debug: bool) -> String {
    let mut matches: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            let name = path.to_string_lossy();
            name.ends_with(".log") && name.ends_with("_DEBUG.log") == debug
        })
        .collect();
    assert_eq!(matches.len(), 1, "expected one log file in {}", dir.display());
    std::fs::read_to_string(matches.remove(0)).unwrap()
}
