use std::time::Duration;

/// Harness configuration
///
/// The target addresses are starting values only; there is no flag or
/// environment surface for them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the HTTP API, without a trailing slash
    pub base_url: String,

    /// Address of the live-updates WebSocket
    pub ws_url: String,

    /// Total timeout for a single HTTP request
    pub request_timeout: Duration,

    /// TCP connect timeout for HTTP requests
    pub connect_timeout: Duration,

    /// Upper bound on the WebSocket handshake
    pub ws_connect_timeout: Duration,

    /// How long the probe waits for a first message before closing
    pub ws_message_wait: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            ws_url: "ws://localhost:5000/live-updates".to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            ws_connect_timeout: Duration::from_secs(5),
            ws_message_wait: Duration::from_secs(2),
        }
    }
}

impl Config {
    /// Joins an endpoint path onto the base address
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
