//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer)
//!     → "/" handler
//!     → Send to client
//! ```

pub mod server;

pub use server::HttpServer;
