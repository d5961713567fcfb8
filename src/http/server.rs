//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up request tracing so request logs reach the sinks
//! - Serve on a bound listener until shutdown

use std::future::Future;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpServer {
    pub fn new() -> Self {
        Self {
            router: build_router(),
        }
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router() -> Router {
    Router::new()
        .route("/", get(hello_world))
        .layer(TraceLayer::new_for_http())
}

async fn hello_world() -> &'static str {
    "Hello World!"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::lifecycle::Shutdown;

    #[tokio::test]
    async fn test_root_says_hello() {
        let response = build_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Hello World!");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = build_router()
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = Shutdown::new();
        let server = HttpServer::new();
        let handle = tokio::spawn(server.run(listener, shutdown.wait()));

        shutdown.trigger();
        handle.await.unwrap().unwrap();
    }
}
