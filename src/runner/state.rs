use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single test case
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
        }
    }
}

/// Record of one `run_test` invocation. Never mutated once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl TestResult {
    pub fn passed(name: &str, payload: Value, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            status: TestStatus::Passed,
            payload: Some(payload),
            error: None,
            duration_ms,
        }
    }

    pub fn failed(name: &str, error: String, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            status: TestStatus::Failed,
            payload: None,
            error: Some(error),
            duration_ms,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Aggregate counts for a finished run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let (passed, failed) = results.iter().fold((0, 0), |(p, f), r| match r.status {
            TestStatus::Passed => (p + 1, f),
            TestStatus::Failed => (p, f + 1),
        });

        Self {
            total: results.len() as u32,
            passed,
            failed,
            total_duration_ms: results.iter().map(|r| r.duration_ms).sum(),
        }
    }

    /// Percentage of passed tests rounded to one decimal place.
    ///
    /// `None` for an empty run, where no rate is defined.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let rate = self.passed as f64 / self.total as f64 * 100.0;
        Some((rate * 10.0).round() / 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(passed: usize, failed: usize) -> Vec<TestResult> {
        let mut out = Vec::new();
        for i in 0..passed {
            out.push(TestResult::passed(&format!("ok-{}", i), json!({}), 10));
        }
        for i in 0..failed {
            out.push(TestResult::failed(&format!("bad-{}", i), "boom".into(), 5));
        }
        out
    }

    #[test]
    fn test_success_rate_mixed() {
        let summary = RunSummary::from_results(&results(7, 3));
        assert_eq!(summary.total, 10);
        assert_eq!(summary.passed, 7);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.success_rate(), Some(70.0));
        assert_eq!(summary.total_duration_ms, 85);
    }

    #[test]
    fn test_success_rate_rounds_to_one_decimal() {
        let summary = RunSummary::from_results(&results(2, 1));
        assert_eq!(summary.success_rate(), Some(66.7));

        let summary = RunSummary::from_results(&results(1, 2));
        assert_eq!(summary.success_rate(), Some(33.3));
    }

    #[test]
    fn test_success_rate_bounds() {
        assert_eq!(
            RunSummary::from_results(&results(4, 0)).success_rate(),
            Some(100.0)
        );
        assert_eq!(
            RunSummary::from_results(&results(0, 4)).success_rate(),
            Some(0.0)
        );
    }

    #[test]
    fn test_empty_run_has_no_rate() {
        let summary = RunSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.success_rate(), None);
    }

    #[test]
    fn test_result_serialization_omits_absent_fields() {
        let passed = TestResult::passed("Health Check", json!({"status": "ok"}), 3);
        let value = serde_json::to_value(&passed).unwrap();
        assert_eq!(value["status"], "PASSED");
        assert_eq!(value["payload"]["status"], "ok");
        assert!(value.get("error").is_none());

        let failed = TestResult::failed("Chat Message", "no session".into(), 0);
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["status"], "FAILED");
        assert!(value.get("payload").is_none());
        assert_eq!(value["durationMs"], 0);
    }
}
