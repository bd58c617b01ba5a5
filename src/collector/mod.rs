//! Trace collector: authenticates submissions and archives them.
//!
//! Two surfaces share one [`CollectorState`]:
//!
//! ```text
//! POST /api/v1/submit_trace   Authorization: Bearer <token>   → {"status":"success"}
//! GET  /ws/v1/trace?token=…   WebSocket, one reply per trace  → {"status":"success"}
//! ```
//!
//! The token in the channel URL is weaker than the header used over HTTP (URLs
//! end up in proxy and access logs); it is kept for compatibility with existing
//! clients.
//!
//! # Modules
//!
//! - `auth`: Bearer token loading and verification
//! - `state`: Shared handler state
//! - `registry`: Open channel bookkeeping
//! - `http`: Request/response handler and error mapping
//! - `channel`: WebSocket session loop

pub mod auth;
pub mod channel;
pub mod http;
pub mod registry;
pub mod state;

pub use auth::{AuthToken, TokenOrigin};
pub use registry::{ConnectionGuard, ConnectionRegistry};
pub use state::CollectorState;

use crate::domain::error::Result;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

/// Path of the request/response submission endpoint.
pub const SUBMIT_PATH: &str = "/api/v1/submit_trace";

/// Path of the persistent-channel endpoint.
pub const CHANNEL_PATH: &str = "/ws/v1/trace";

/// Builds the collector's HTTP application.
pub fn router(state: CollectorState) -> Router {
    Router::new()
        .route(SUBMIT_PATH, post(http::submit_trace))
        .route(CHANNEL_PATH, get(channel::trace_channel))
        .with_state(state)
}

/// Binds `bind_addr` and serves the collector until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(bind_addr: &str, state: CollectorState) -> Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "collector listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("collector stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
