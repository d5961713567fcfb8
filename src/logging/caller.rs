//! Call-site resolution for bridged records.
//!
//! # Responsibilities
//! - Walk a call chain outward from a logging entry point
//! - Skip frames that belong to the logging bridge itself
//! - Attribute the record to the first frame outside the bridge
//!
//! # Design Decisions
//! - Entry points build the chain from `#[track_caller]` locations and legacy
//!   record metadata; no other module inspects frames
//! - Exhausting the chain degrades to best-effort attribution, never panics

use std::borrow::Cow;
use std::panic::Location;

use crate::logging::record::Caller;

/// Module paths whose frames are treated as bridging code.
const BRIDGE_MODULES: [&str; 3] = [
    concat!(env!("CARGO_CRATE_NAME"), "::logging"),
    "log",
    "tracing_log",
];

/// One frame of a call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub module_path: Option<String>,
    pub file: String,
    pub line: u32,
}

impl Frame {
    pub fn new(module_path: Option<&str>, file: &str, line: u32) -> Self {
        Self {
            module_path: module_path.map(str::to_string),
            file: file.to_string(),
            line,
        }
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(None, location.file(), location.line())
    }

    pub fn from_record(record: &log::Record<'_>) -> Self {
        Self::new(
            record.module_path(),
            record.file().unwrap_or("<unknown>"),
            record.line().unwrap_or(0),
        )
    }

    fn caller(&self) -> Caller {
        Caller::new(self.file.clone(), self.line)
    }
}

/// Finds the first frame outside the bridging modules.
#[derive(Debug, Clone)]
pub struct CallerResolver {
    bridge_modules: Vec<Cow<'static, str>>,
}

impl Default for CallerResolver {
    fn default() -> Self {
        Self::new(BRIDGE_MODULES.iter().map(|m| Cow::Borrowed(*m)))
    }
}

impl CallerResolver {
    pub fn new<I>(bridge_modules: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        Self {
            bridge_modules: bridge_modules.into_iter().map(Into::into).collect(),
        }
    }

    /// The bridge module set, extended with `module`.
    pub fn with_bridge_module(mut self, module: impl Into<Cow<'static, str>>) -> Self {
        self.bridge_modules.push(module.into());
        self
    }

    /// Whether `frame` lies inside one of the bridge modules.
    pub fn is_bridge_frame(&self, frame: &Frame) -> bool {
        let Some(path) = frame.module_path.as_deref() else {
            return false;
        };
        self.bridge_modules.iter().any(|module| {
            path == module.as_ref()
                || path
                    .strip_prefix(module.as_ref())
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }

    /// Number of frames to skip, innermost first, to reach the true caller.
    ///
    /// Frame 0 is the entry point and is always skipped. When every frame
    /// belongs to the bridge the depth reached (`frames.len()`) is returned.
    pub fn skip_depth(&self, frames: &[Frame]) -> usize {
        let mut depth = 0;
        while let Some(frame) = frames.get(depth) {
            if depth > 0 && !self.is_bridge_frame(frame) {
                return depth;
            }
            depth += 1;
        }
        depth
    }

    /// Resolve the caller a record should be attributed to.
    pub fn caller(&self, frames: &[Frame]) -> Caller {
        let depth = self.skip_depth(frames);
        frames
            .get(depth)
            .or_else(|| frames.last())
            .map(Frame::caller)
            .unwrap_or_else(Caller::unknown)
    }
}
