//! Persistent-channel client binding.
//!
//! A [`TraceChannel`] keeps one WebSocket open to the collector and runs a strict
//! request/reply exchange over it: one trace out, one acknowledgment back.
//! Submissions take `&mut self`, so a channel never has more than one exchange
//! in flight; use separate channels for concurrent submitters.
//!
//! # Failure Handling
//!
//! The channel connects lazily on first submission. A submission that starts
//! without an open connection and hits a transport fault is attempted exactly
//! once more on a fresh connection. A fault on a connection that was already
//! open fails the submission; the broken connection is discarded, so the next
//! submission connects afresh. A close frame from the collector (for example
//! `1008` for a bad token) is a rejection and is never retried.

use crate::collector::CHANNEL_PATH;
use crate::domain::error::SubmissionError;
use crate::domain::{Acknowledgment, Trace};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::{Map, Value};
use std::fmt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Result<T> = std::result::Result<T, SubmissionError>;

/// Submits traces over a long-lived WebSocket.
///
/// # Examples
///
/// ```no_run
/// use tracelog::TraceChannel;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut channel = TraceChannel::new("http://localhost:8000", "token");
///
/// let trace = channel.new_trace("compute_total", None);
/// let ack = channel.submit(&trace).await?;
/// assert!(ack.is_success());
///
/// channel.close().await;
/// # Ok(())
/// # }
/// ```
pub struct TraceChannel {
    /// Collector address with the scheme already rewritten to `ws`/`wss`.
    host_url: String,
    token: String,
    socket: Option<Socket>,
}

impl TraceChannel {
    /// Creates an unconnected channel. `http://` and `https://` addresses are
    /// rewritten to `ws://` and `wss://`; anything else is used as given.
    #[must_use]
    pub fn new(host_url: &str, token: impl Into<String>) -> Self {
        Self {
            host_url: channel_scheme(host_url.trim_end_matches('/')),
            token: token.into(),
            socket: None,
        }
    }

    /// Collector address as used for the channel (without credentials).
    #[must_use]
    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Starts a new trace; equivalent to [`Trace::with_args`].
    #[must_use]
    pub fn new_trace(&self, function_name: &str, function_args: Option<Map<String, Value>>) -> Trace {
        Trace::with_args(function_name, function_args.unwrap_or_default())
    }

    /// Opens the channel unless it is already open.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Protocol`] if the collector address is not a valid URL
    /// - [`SubmissionError::Transport`] if the connection or handshake fails
    pub async fn connect(&mut self) -> Result<()> {
        if self.socket.is_some() {
            return Ok(());
        }

        let url = self.channel_url()?;
        tracing::debug!(host_url = %self.host_url, "opening trace channel");

        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        self.socket = Some(socket);
        tracing::debug!("trace channel open");
        Ok(())
    }

    /// Sends `trace` and waits for its acknowledgment, connecting first if
    /// needed.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Transport`] if an already open channel fails, or if
    ///   a channel that had to be opened fails on both the attempt and its single retry
    /// - [`SubmissionError::Rejected`] if the collector closes the channel (close code as status)
    /// - [`SubmissionError::Protocol`] if the trace cannot be encoded or the reply is not an acknowledgment
    pub async fn submit(&mut self, trace: &Trace) -> Result<Acknowledgment> {
        let payload = trace
            .to_json()
            .map_err(|e| SubmissionError::Protocol(format!("failed to encode trace: {e}")))?;

        let was_connected = self.is_connected();
        match self.exchange(&payload).await {
            Err(SubmissionError::Transport(reason)) if !was_connected => {
                tracing::warn!(error = %reason, "trace channel failed, reconnecting once");
                self.exchange(&payload).await
            }
            outcome => outcome,
        }
    }

    /// Closes the channel if open. Failures while closing are logged and
    /// otherwise ignored; the channel is disconnected afterwards either way.
    pub async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = socket.close(None).await {
                tracing::debug!(error = %e, "error while closing trace channel");
            }
        }
    }

    async fn exchange(&mut self, payload: &str) -> Result<Acknowledgment> {
        self.connect().await?;

        let outcome = match self.socket.as_mut() {
            Some(socket) => request_reply(socket, payload).await,
            None => Err(SubmissionError::Transport("channel not connected".to_string())),
        };

        if matches!(
            outcome,
            Err(SubmissionError::Transport(_) | SubmissionError::Rejected { .. })
        ) {
            self.socket = None;
        }
        outcome
    }

    fn channel_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{CHANNEL_PATH}", self.host_url))
            .map_err(|e| SubmissionError::Protocol(format!("invalid collector URL {}: {e}", self.host_url)))?;
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }
}

impl fmt::Debug for TraceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceChannel")
            .field("host_url", &self.host_url)
            .field("token", &"<redacted>")
            .field("connected", &self.is_connected())
            .finish()
    }
}

async fn request_reply(socket: &mut Socket, payload: &str) -> Result<Acknowledgment> {
    socket
        .send(Message::Text(payload.to_string()))
        .await
        .map_err(|e| SubmissionError::Transport(e.to_string()))?;

    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => return parse_acknowledgment(&text),
            Some(Ok(Message::Binary(bytes))) => return parse_acknowledgment(&String::from_utf8_lossy(&bytes)),
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
            Some(Ok(Message::Close(Some(frame)))) => {
                return Err(SubmissionError::Rejected {
                    status: u16::from(frame.code),
                    body: frame.reason.into_owned(),
                });
            }
            Some(Ok(Message::Close(None))) | None => {
                return Err(SubmissionError::Transport("collector closed the channel".to_string()));
            }
            Some(Err(e)) => return Err(SubmissionError::Transport(e.to_string())),
        }
    }
}

fn parse_acknowledgment(reply: &str) -> Result<Acknowledgment> {
    serde_json::from_str(reply)
        .map_err(|e| SubmissionError::Protocol(format!("invalid acknowledgment {reply:?}: {e}")))
}

fn channel_scheme(host_url: &str) -> String {
    if let Some(rest) = host_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = host_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else {
        host_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_schemes_map_to_websocket_schemes() {
        assert_eq!(channel_scheme("http://collector:8000"), "ws://collector:8000");
        assert_eq!(channel_scheme("https://collector"), "wss://collector");
        assert_eq!(channel_scheme("ws://already"), "ws://already");
    }

    #[test]
    fn token_travels_as_query_parameter() {
        let channel = TraceChannel::new("http://localhost:8000/", "a b&c");
        let url = channel.channel_url().unwrap();

        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.path(), CHANNEL_PATH);
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, [("token".to_string(), "a b&c".to_string())]);
    }

    #[test]
    fn new_channel_is_disconnected_and_redacted() {
        let channel = TraceChannel::new("http://localhost:8000", "hidden");
        assert!(!channel.is_connected());
        assert!(!format!("{channel:?}").contains("hidden"));
    }

    #[test]
    fn unusable_address_is_not_a_transport_fault() {
        let channel = TraceChannel::new("not a url", "t");
        assert!(matches!(channel.channel_url(), Err(SubmissionError::Protocol(_))));
    }
}
