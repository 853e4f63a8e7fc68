pub mod client;
pub mod console;
pub mod harness;
pub mod probe;
pub mod state;

use anyhow::Result;
use std::path::Path;

pub use client::{ApiCase, ApiClient, CaseError};
pub use harness::ApiTester;
pub use probe::{ProbeOutcome, ProbeState, ProbeStatus, WebSocketProbe};
pub use state::*;

use crate::utils::Config;

/// Run the full suite once and optionally write reports of the results
pub async fn run_all_tests(config: Config, report_dir: Option<&Path>) -> Result<RunSummary> {
    let mut tester = ApiTester::new(config)?;
    let summary = tester.run_all_tests().await;

    if let Some(dir) = report_dir {
        for path in crate::report::write_reports(dir, tester.results(), &summary)? {
            console::report_written(&path);
        }
    }

    Ok(summary)
}
