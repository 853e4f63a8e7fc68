use anyhow::Result;
use std::path::Path;
use super::types::TestResults;

/// Write the results as pretty-printed JSON
pub fn write(results: &TestResults, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    Ok(())
}
