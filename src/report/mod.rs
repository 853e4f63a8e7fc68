pub mod json;
pub mod junit;
pub mod types;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::runner::state::{RunSummary, TestResult};

/// Write `results.json` and `junit.xml` into `dir`, creating it if needed.
/// Returns the written paths.
pub fn write_reports(
    dir: &Path,
    results: &[TestResult],
    summary: &RunSummary,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let report = types::TestResults::new(results, summary);

    let json_path = dir.join("results.json");
    json::write(&report, &json_path)?;

    let junit_path = dir.join("junit.xml");
    junit::write(&report, &junit_path)?;

    Ok(vec![json_path, junit_path])
}
