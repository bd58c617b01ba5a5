//! Persistent-channel submission surface.
//!
//! `GET /ws/v1/trace?token=<token>` upgrades to a WebSocket. Each text message
//! carries one trace tree and is answered by exactly one `{"status":"success"}`
//! text message once the trace is stored.
//!
//! Close codes:
//! - `1008` (policy violation): wrong or missing token, sent before any message is read
//! - `1011` (internal error): a message could not be parsed, stored, or answered

use crate::collector::state::CollectorState;
use crate::domain::error::{Result, TracelogError};
use crate::domain::{Acknowledgment, Trace};
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use std::time::Duration;
use tracing::Instrument;

/// Longest close reason allowed by the WebSocket protocol, in bytes.
const MAX_CLOSE_REASON_BYTES: usize = 123;

/// How long to wait for the peer to acknowledge our close frame.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Query parameters accepted when opening a channel.
#[derive(Debug, Deserialize)]
pub struct ChannelParams {
    token: Option<String>,
}

/// Handler for `GET /ws/v1/trace`.
pub async fn trace_channel(
    ws: WebSocketUpgrade,
    Query(params): Query<ChannelParams>,
    State(state): State<CollectorState>,
) -> Response {
    let authorized = state.token().verify_query(params.token.as_deref());

    ws.on_upgrade(move |socket| async move {
        match authorized {
            Ok(()) => run_session(socket, state).await,
            Err(e) => {
                tracing::warn!(error = %e, "refusing trace channel");
                close(socket, close_code::POLICY, "Invalid authentication token".to_string()).await;
            }
        }
    })
}

async fn run_session(mut socket: WebSocket, state: CollectorState) {
    let connection = state.registry().register();
    let span = tracing::info_span!("trace_channel", connection = %connection.id());

    async move {
        tracing::debug!(open_channels = state.registry().len(), "channel accepted");

        match serve_messages(&mut socket, &state).await {
            Ok(stored) => tracing::debug!(stored, "channel closed by peer"),
            Err(e) => {
                tracing::error!(error = %e, "channel fault");
                close(socket, close_code::ERROR, close_reason(&e)).await;
            }
        }

        drop(connection);
    }
    .instrument(span)
    .await;
}

/// Serves request/reply exchanges until the peer goes away. Returns the number
/// of traces stored.
async fn serve_messages(socket: &mut WebSocket, state: &CollectorState) -> Result<usize> {
    let mut stored = 0;

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "channel dropped without close frame");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let trace = Trace::from_json(&text)?;
                let function_name = trace.function_name().to_string();
                let path = state.persist(trace).await?;
                tracing::info!(function_name = %function_name, path = ?path, "trace stored");

                let ack = serde_json::to_string(&Acknowledgment::success())?;
                socket
                    .send(Message::Text(ack))
                    .await
                    .map_err(|e| TracelogError::Channel(format!("failed to send acknowledgment: {e}")))?;
                stored += 1;
            }
            Message::Binary(_) => {
                return Err(TracelogError::Channel("expected a text message".to_string()));
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => break,
        }
    }

    Ok(stored)
}

/// Sends a close frame, then discards whatever the peer still had in flight
/// until it answers the close, so the frame is not lost to a connection reset.
async fn close(mut socket: WebSocket, code: u16, reason: String) {
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "failed to send close frame");
        return;
    }

    let drain = async {
        while let Some(Ok(message)) = socket.recv().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    };
    if tokio::time::timeout(CLOSE_GRACE, drain).await.is_err() {
        tracing::debug!("peer did not answer close frame");
    }
}

fn close_reason(error: &TracelogError) -> String {
    let mut reason = format!("Internal server error: {error}");
    if reason.len() > MAX_CLOSE_REASON_BYTES {
        let mut end = MAX_CLOSE_REASON_BYTES;
        while !reason.is_char_boundary(end) {
            end -= 1;
        }
        reason.truncate(end);
    }
    reason
}
