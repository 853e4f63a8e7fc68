use crate::runner::state::{RunSummary, TestResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Results of one run, as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub run_id: String,
    pub results: Vec<TestResult>,
    pub summary: RunSummary,
    pub generated_at: String,
}

impl TestResults {
    pub fn new(results: &[TestResult], summary: &RunSummary) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            results: results.to_vec(),
            summary: *summary,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
