//! OneBot Gateway Library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logging;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use logging::{Bootstrap, Logger, LoggingContext};
