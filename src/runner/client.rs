//! Transport side of the harness: one method per API test case.
//!
//! Every method performs a single request/response cycle and returns the
//! decoded JSON body. Failures come back as [`CaseError`] so the harness can
//! record them without aborting the run.

use log::debug;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::console;
use super::probe::WebSocketProbe;
use crate::utils::Config;

/// Question sent by the chat message test
pub const SAMPLE_CHAT_MESSAGE: &str = "What are the symptoms of diabetes?";

/// Failure of a single test case
#[derive(Debug, Error)]
pub enum CaseError {
    /// A chat test ran before a session was created
    #[error("No session ID available. Run chat session test first.")]
    MissingSession,

    /// Connection failure or non-2xx status
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Body was not valid JSON
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fixed clinical values posted to the prediction endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BloodPanel {
    pub glucose: u32,
    pub hemoglobin: f64,
    pub platelets: u32,
    pub cholesterol: u32,
    pub wbc: u32,
    pub hematocrit: u32,
}

impl BloodPanel {
    pub fn sample() -> Self {
        Self {
            glucose: 120,
            hemoglobin: 14.5,
            platelets: 250_000,
            cholesterol: 180,
            wbc: 7000,
            hematocrit: 42,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessageRequest<'a> {
    session_id: &'a str,
    message: &'a str,
}

/// The test cases in run order. Chat session precedes the chat tests that
/// depend on its session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCase {
    HealthCheck,
    Prediction,
    LiveMetrics,
    RecentPredictions,
    DiseaseDistribution,
    Statistics,
    ChatSession,
    ChatMessage,
    ChatHistory,
    WebSocket,
}

impl ApiCase {
    pub const ALL: [ApiCase; 10] = [
        ApiCase::HealthCheck,
        ApiCase::Prediction,
        ApiCase::LiveMetrics,
        ApiCase::RecentPredictions,
        ApiCase::DiseaseDistribution,
        ApiCase::Statistics,
        ApiCase::ChatSession,
        ApiCase::ChatMessage,
        ApiCase::ChatHistory,
        ApiCase::WebSocket,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ApiCase::HealthCheck => "Health Check",
            ApiCase::Prediction => "Blood Disease Prediction",
            ApiCase::LiveMetrics => "Live Metrics",
            ApiCase::RecentPredictions => "Recent Predictions",
            ApiCase::DiseaseDistribution => "Disease Distribution",
            ApiCase::Statistics => "Statistics",
            ApiCase::ChatSession => "Chat Session Creation",
            ApiCase::ChatMessage => "Chat Message",
            ApiCase::ChatHistory => "Chat History",
            ApiCase::WebSocket => "WebSocket Connection",
        }
    }
}

/// HTTP client plus the session state shared by the chat tests
pub struct ApiClient {
    http: Client,
    config: Config,
    session_id: Option<String>,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self, CaseError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            session_id: None,
        })
    }

    /// Session id issued by the chat session test, if it has succeeded
    pub fn session_id(&self) -> Result<&str, CaseError> {
        self.session_id.as_deref().ok_or(CaseError::MissingSession)
    }

    pub async fn execute(&mut self, case: ApiCase) -> Result<Value, CaseError> {
        match case {
            ApiCase::HealthCheck => self.health_check().await,
            ApiCase::Prediction => self.prediction().await,
            ApiCase::LiveMetrics => self.live_metrics().await,
            ApiCase::RecentPredictions => self.recent_predictions().await,
            ApiCase::DiseaseDistribution => self.disease_distribution().await,
            ApiCase::Statistics => self.statistics().await,
            ApiCase::ChatSession => self.chat_session().await,
            ApiCase::ChatMessage => self.chat_message().await,
            ApiCase::ChatHistory => self.chat_history().await,
            ApiCase::WebSocket => self.websocket().await,
        }
    }

    pub async fn health_check(&self) -> Result<Value, CaseError> {
        self.get("/health", &[]).await
    }

    pub async fn prediction(&self) -> Result<Value, CaseError> {
        self.post("/predict", Some(&BloodPanel::sample())).await
    }

    pub async fn live_metrics(&self) -> Result<Value, CaseError> {
        self.get("/live-metrics", &[]).await
    }

    pub async fn recent_predictions(&self) -> Result<Value, CaseError> {
        self.get("/recent-predictions", &[("limit", "5")]).await
    }

    pub async fn disease_distribution(&self) -> Result<Value, CaseError> {
        self.get("/disease-distribution", &[]).await
    }

    pub async fn statistics(&self) -> Result<Value, CaseError> {
        self.get("/stats", &[]).await
    }

    /// Creates a chat session and keeps its id for the dependent chat tests.
    /// A body without `success: true` and a session id still passes but
    /// leaves the session unset.
    pub async fn chat_session(&mut self) -> Result<Value, CaseError> {
        let result = self.post::<()>("/chatbot/session", None).await?;

        if let Some(session_id) = extract_session_id(&result) {
            console::session_saved(&session_id);
            self.session_id = Some(session_id);
        }

        Ok(result)
    }

    pub async fn chat_message(&self) -> Result<Value, CaseError> {
        let request = ChatMessageRequest {
            session_id: self.session_id()?,
            message: SAMPLE_CHAT_MESSAGE,
        };
        self.post("/chatbot/message", Some(&request)).await
    }

    pub async fn chat_history(&self) -> Result<Value, CaseError> {
        let session_id = self.session_id()?;
        self.get("/chatbot/history", &[("sessionId", session_id)]).await
    }

    /// Liveness probe. Connection problems are reported inside the returned
    /// outcome, never as an error.
    pub async fn websocket(&self) -> Result<Value, CaseError> {
        let mut probe = WebSocketProbe::from_config(&self.config);
        let outcome = probe.run().await;
        Ok(serde_json::to_value(outcome)?)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, CaseError> {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        decode(request.send().await?).await
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> Result<Value, CaseError> {
        let url = self.config.endpoint(path);
        debug!("POST {}", url);

        let request = match body {
            Some(body) => self.http.post(&url).json(body),
            None => self
                .http
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json"),
        };
        decode(request.send().await?).await
    }
}

async fn decode(response: Response) -> Result<Value, CaseError> {
    debug!("{} {}", response.status(), response.url());
    let response = response.error_for_status()?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn extract_session_id(result: &Value) -> Option<String> {
    if result.get("success").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    result
        .pointer("/data/sessionId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
