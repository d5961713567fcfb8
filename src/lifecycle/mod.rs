//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Banner → Load config → Bootstrap logging → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Trigger broadcast → Stop accepting → Drain → Teardown logging
//! ```
//!
//! # Design Decisions
//! - The banner is plain stdout; everything after it goes through logging
//! - Fail fast: any startup error is fatal

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
