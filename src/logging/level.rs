//! Severity levels and translation between logging vocabularies.
//!
//! # Responsibilities
//! - Define the canonical, totally ordered `Level`
//! - Resolve level names case-insensitively against a closed table
//! - Translate `log` and `tracing` levels into canonical levels
//!
//! # Design Decisions
//! - A level is its numeric severity; names are a lookup over standard values
//! - Unknown names never fail resolution: the numeric fallback always wins
//! - Only configuration parsing treats an unknown name as an error

use std::fmt;
use std::str::FromStr;

use crate::logging::error::LoggingError;

/// A totally ordered severity.
///
/// Standard levels have a name; any other severity is a custom level that
/// sorts by its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u32);

impl Level {
    pub const TRACE: Level = Level(5);
    pub const DEBUG: Level = Level(10);
    pub const INFO: Level = Level(20);
    pub const SUCCESS: Level = Level(25);
    pub const WARNING: Level = Level(30);
    pub const ERROR: Level = Level(40);
    pub const CRITICAL: Level = Level(50);

    /// Build a level from a raw severity number.
    pub const fn from_severity(severity: u32) -> Self {
        Level(severity)
    }

    /// Numeric severity (higher is more severe).
    pub const fn severity(self) -> u32 {
        self.0
    }

    /// Canonical name, if this is a standard level.
    pub fn name(self) -> Option<&'static str> {
        STANDARD_LEVELS
            .iter()
            .find(|(_, level)| *level == self)
            .map(|(name, _)| *name)
    }

    pub fn is_standard(self) -> bool {
        self.name().is_some()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.pad(name),
            None => f.pad(&format!("Level {}", self.0)),
        }
    }
}

impl FromStr for Level {
    type Err = LoggingError;

    /// Parse a level name (any case) or a decimal severity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(level) = LevelMapper::lookup(trimmed) {
            return Ok(level);
        }
        trimmed
            .parse::<u32>()
            .map(Level::from_severity)
            .map_err(|_| LoggingError::UnknownLevel(s.to_string()))
    }
}

const STANDARD_LEVELS: [(&str, Level); 7] = [
    ("TRACE", Level::TRACE),
    ("DEBUG", Level::DEBUG),
    ("INFO", Level::INFO),
    ("SUCCESS", Level::SUCCESS),
    ("WARNING", Level::WARNING),
    ("ERROR", Level::ERROR),
    ("CRITICAL", Level::CRITICAL),
];

const ALIASES: [(&str, Level); 2] = [("WARN", Level::WARNING), ("FATAL", Level::CRITICAL)];

/// Translates severity identifiers into canonical levels.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevelMapper;

impl LevelMapper {
    pub fn new() -> Self {
        Self
    }

    /// Look up a level by name, ignoring case.
    pub fn lookup(name: &str) -> Option<Level> {
        STANDARD_LEVELS
            .iter()
            .chain(ALIASES.iter())
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, level)| *level)
    }

    /// Resolve a level name, degrading to `fallback` when the name is unknown.
    pub fn resolve(&self, name: &str, fallback: u32) -> Level {
        Self::lookup(name).unwrap_or(Level::from_severity(fallback))
    }

    /// Resolve a `log` record level.
    ///
    /// `name_override` comes from a record's `level` key-value and wins over
    /// the record's own level name when it is recognised.
    pub fn resolve_legacy(&self, level: log::Level, name_override: Option<&str>) -> Level {
        let name = name_override.unwrap_or(level.as_str());
        self.resolve(name, legacy_severity(level))
    }

    pub fn from_tracing(&self, level: tracing::Level) -> Level {
        match level {
            tracing::Level::TRACE => Level::TRACE,
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARNING,
            _ => Level::ERROR,
        }
    }
}

/// Numeric severity of a `log` level on the canonical scale.
///
/// `log` numbers its levels from Error = 1 to Trace = 5, the reverse of the
/// canonical direction.
pub fn legacy_severity(level: log::Level) -> u32 {
    match level {
        log::Level::Error => Level::ERROR.severity(),
        log::Level::Warn => Level::WARNING.severity(),
        log::Level::Info => Level::INFO.severity(),
        log::Level::Debug => Level::DEBUG.severity(),
        log::Level::Trace => Level::TRACE.severity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names_preserve_order() {
        let mapper = LevelMapper::new();
        let resolved: Vec<Level> = ["TRACE", "DEBUG", "INFO", "SUCCESS", "WARNING", "ERROR", "CRITICAL"]
            .iter()
            .map(|name| mapper.resolve(name, 0))
            .collect();

        assert!(resolved.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(resolved[2], Level::INFO);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(LevelMapper::lookup("warning"), Some(Level::WARNING));
        assert_eq!(LevelMapper::lookup("Warn"), Some(Level::WARNING));
        assert_eq!(LevelMapper::lookup("fatal"), Some(Level::CRITICAL));
        assert_eq!(LevelMapper::lookup("verbose"), None);
    }

    #[test]
    fn test_unknown_name_uses_numeric_fallback() {
        let level = LevelMapper::new().resolve("NOTICE", 35);

        assert_eq!(level, Level::from_severity(35));
        assert!(!level.is_standard());
        assert!(level > Level::WARNING && level < Level::ERROR);
        assert_eq!(level.to_string(), "Level 35");
    }

    #[test]
    fn test_legacy_levels_keep_relative_order() {
        let mapper = LevelMapper::new();
        let legacy = [
            log::Level::Trace,
            log::Level::Debug,
            log::Level::Info,
            log::Level::Warn,
            log::Level::Error,
        ];
        let resolved: Vec<Level> = legacy.iter().map(|l| mapper.resolve_legacy(*l, None)).collect();

        assert_eq!(
            resolved,
            vec![Level::TRACE, Level::DEBUG, Level::INFO, Level::WARNING, Level::ERROR]
        );
        for level in legacy {
            assert_eq!(mapper.resolve_legacy(level, None).severity(), legacy_severity(level));
        }
    }

    #[test]
    fn test_legacy_name_override() {
        let mapper = LevelMapper::new();

        assert_eq!(mapper.resolve_legacy(log::Level::Info, Some("success")), Level::SUCCESS);
        assert_eq!(mapper.resolve_legacy(log::Level::Error, Some("BOGUS")), Level::ERROR);
    }

    #[test]
    fn test_tracing_levels() {
        let mapper = LevelMapper::new();

        assert_eq!(mapper.from_tracing(tracing::Level::WARN), Level::WARNING);
        assert!(mapper.from_tracing(tracing::Level::TRACE) < mapper.from_tracing(tracing::Level::DEBUG));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("info".parse::<Level>().unwrap(), Level::INFO);
        assert_eq!(" Critical ".parse::<Level>().unwrap(), Level::CRITICAL);
        assert_eq!("15".parse::<Level>().unwrap(), Level::from_severity(15));
        assert!(matches!("loud".parse::<Level>(), Err(LoggingError::UnknownLevel(_))));
    }
}
