//! WebSocket liveness probe.
//!
//! The probe connects, waits a bounded time for a first message and closes.
//! It does not assert anything about message content: reaching the
//! connected state is the success signal.
//!
//! ```text
//! Idle -> Connecting -> Connected -> Closed
//!                   \-> Errored  -> Closed
//! ```

use futures_util::{Stream, StreamExt};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use super::console;
use crate::utils::Config;

/// Message reported when the socket opened but nothing arrived in time
pub const LIVENESS_PLACEHOLDER: &str = "WebSocket working";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Connecting,
    Connected,
    Errored(String),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Connected,
    Error,
}

/// Terminal result, serialized as `{"status": ..., "message": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub status: ProbeStatus,
    pub message: String,
}

pub struct WebSocketProbe {
    url: String,
    connect_timeout: Duration,
    message_wait: Duration,
    state: ProbeState,
}

impl WebSocketProbe {
    pub fn new(url: &str, connect_timeout: Duration, message_wait: Duration) -> Self {
        Self {
            url: url.to_string(),
            connect_timeout,
            message_wait,
            state: ProbeState::Idle,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.ws_url, config.ws_connect_timeout, config.ws_message_wait)
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    pub async fn run(&mut self) -> ProbeOutcome {
        self.transition(ProbeState::Connecting);

        let connect = timeout(
            self.connect_timeout,
            tokio_tungstenite::connect_async(self.url.as_str()),
        )
        .await;

        let mut ws = match connect {
            Ok(Ok((ws, _))) => ws,
            Ok(Err(e)) => return self.fail(e.to_string()),
            Err(_) => return self.fail("WebSocket connection timeout".to_string()),
        };

        console::ws_connected();
        self.transition(ProbeState::Connected);

        // Whichever comes first: a message or the end of the wait.
        let waited = timeout(self.message_wait, first_message(&mut ws)).await;

        // Closing an already closed socket only returns an error we ignore.
        if let Err(e) = ws.close(None).await {
            debug!("close: {}", e);
        }

        match waited {
            Ok(Ok(Some(message))) => {
                console::ws_received(&message);
                self.close(ProbeStatus::Connected, message)
            }
            Ok(Ok(None)) => {
                debug!("socket closed by peer before any message");
                self.close(ProbeStatus::Connected, LIVENESS_PLACEHOLDER.to_string())
            }
            Ok(Err(e)) => self.fail(e.to_string()),
            Err(_) => {
                debug!("no message within {:?}, closing", self.message_wait);
                self.close(ProbeStatus::Connected, LIVENESS_PLACEHOLDER.to_string())
            }
        }
    }

    fn transition(&mut self, next: ProbeState) {
        debug!("probe {}: {:?} -> {:?}", self.url, self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: String) -> ProbeOutcome {
        console::ws_error(&error);
        self.transition(ProbeState::Errored(error.clone()));
        self.close(ProbeStatus::Error, error)
    }

    fn close(&mut self, status: ProbeStatus, message: String) -> ProbeOutcome {
        self.transition(ProbeState::Closed);
        ProbeOutcome { status, message }
    }
}

/// First data frame as text. `None` when the peer closes first.
async fn first_message<S>(ws: &mut S) -> Result<Option<String>, WsError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(frame) = ws.next().await {
        match frame? {
            Message::Text(text) => return Ok(Some(text)),
            Message::Binary(bytes) => {
                return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Message::Close(_) => return Ok(None),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::SinkExt;
    use std::future::Future;
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::WebSocketStream;

    const SHORT: Duration = Duration::from_millis(300);

    async fn spawn_ws_server<F, Fut>(handler: F) -> String
    where
        F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                    handler(ws).await;
                }
            }
        });
        format!("ws://{}/live-updates", addr)
    }

    /// Holds the connection open until the client goes away
    async fn stay_silent(mut ws: WebSocketStream<TcpStream>) {
        while let Some(Ok(_)) = ws.next().await {}
    }

    #[tokio::test]
    async fn test_message_is_recorded() {
        let url = spawn_ws_server(|mut ws| async move {
            ws.send(Message::Text(r#"{"type":"metrics"}"#.to_string()))
                .await
                .unwrap();
            stay_silent(ws).await;
        })
        .await;

        let mut probe = WebSocketProbe::new(&url, SHORT, Duration::from_secs(5));
        let started = std::time::Instant::now();
        let outcome = probe.run().await;

        // The message ends the wait; the timer never fires
        assert!(started.elapsed() < Duration::from_secs(1), "{:?}", started.elapsed());
        assert_eq!(outcome.status, ProbeStatus::Connected);
        assert_eq!(outcome.message, r#"{"type":"metrics"}"#);
        assert_eq!(probe.state(), &ProbeState::Closed);
    }

    #[tokio::test]
    async fn test_silent_socket_reports_placeholder() {
        let url = spawn_ws_server(stay_silent).await;

        let mut probe = WebSocketProbe::new(&url, SHORT, SHORT);
        let started = std::time::Instant::now();
        let outcome = probe.run().await;

        assert!(started.elapsed() >= SHORT);
        assert_eq!(
            outcome,
            ProbeOutcome {
                status: ProbeStatus::Connected,
                message: LIVENESS_PLACEHOLDER.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_peer_close_before_message_is_still_live() {
        let url = spawn_ws_server(|mut ws| async move {
            let _ = ws.close(None).await;
        })
        .await;

        let mut probe = WebSocketProbe::new(&url, SHORT, Duration::from_secs(5));
        let outcome = probe.run().await;

        assert_eq!(outcome.status, ProbeStatus::Connected);
        assert_eq!(outcome.message, LIVENESS_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_refused_connection_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("ws://{}/live-updates", addr);
        let mut probe = WebSocketProbe::new(&url, SHORT, SHORT);
        let outcome = probe.run().await;

        assert_eq!(outcome.status, ProbeStatus::Error);
        assert!(!outcome.message.is_empty());
        assert_eq!(probe.state(), &ProbeState::Closed);
    }

    #[tokio::test]
    async fn test_stalled_handshake_times_out() {
        // Accepts TCP but never answers the upgrade request
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let url = format!("ws://{}/live-updates", addr);
        let mut probe = WebSocketProbe::new(&url, SHORT, SHORT);
        let outcome = probe.run().await;

        assert_eq!(
            outcome,
            ProbeOutcome {
                status: ProbeStatus::Error,
                message: "WebSocket connection timeout".to_string(),
            }
        );
    }

    #[test]
    fn test_status_is_connected_or_error() {
        let parse = |status: &str| {
            serde_json::from_value::<ProbeOutcome>(
                serde_json::json!({"status": status, "message": ""}),
            )
        };
        assert_eq!(parse("connected").unwrap().status, ProbeStatus::Connected);
        assert_eq!(parse("error").unwrap().status, ProbeStatus::Error);
        assert!(parse("failed").is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ProbeOutcome {
            status: ProbeStatus::Connected,
            message: LIVENESS_PLACEHOLDER.to_string(),
        };
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            serde_json::json!({"status": "connected", "message": "WebSocket working"})
        );
    }
}
