//! Human-readable console output for a harness run.
//!
//! The layout is meant for people reading a terminal; it is not a stable
//! machine-readable format. Use the report writers for that.

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::Value;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::{RunSummary, TestResult};

const RULE_WIDTH: usize = 50;

pub fn suite_started() {
    println!("{}", banner("🚀 Starting API Test Suite"));
}

pub fn test_started(name: &str) {
    println!("\n🧪 Testing: {}", name.white().bold());
    println!("{}", "─".repeat(RULE_WIDTH));
}

pub fn test_passed(payload: &Value) {
    println!("{}", "✅ PASSED".green().bold());
    println!("Response: {}", pretty_json(payload));
}

pub fn test_failed(error: &str) {
    println!("{}", "❌ FAILED".red().bold());
    println!("Error: {}", error);
}

// The next four are printed while a request spinner may still be ticking.

pub fn session_saved(session_id: &str) {
    live_line(format!("📝 Session ID saved: {}", session_id.cyan()));
}

pub fn ws_connected() {
    live_line("🔌 WebSocket connection established".to_string());
}

pub fn ws_received(message: &str) {
    live_line(format!("📨 Received: {}", message));
}

pub fn ws_error(error: &str) {
    live_line(format!("{} WebSocket error: {}", "❌".red(), error));
}

/// Spinner shown while a request is in flight. Hidden when stdout is not a
/// terminal so piped output stays free of escape codes.
pub fn request_spinner(name: &str) -> ProgressBar {
    if !is_terminal() {
        return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
    }
    let pb = attach_spinner(live(), name);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Shared draw target for spinners and the lines printed above them
fn live() -> &'static MultiProgress {
    static LIVE: OnceLock<MultiProgress> = OnceLock::new();
    LIVE.get_or_init(|| {
        if is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    })
}

fn live_line(line: String) {
    print_above(live(), is_terminal(), &line);
}

fn attach_spinner(multi: &MultiProgress, name: &str) -> ProgressBar {
    let pb = multi.add(ProgressBar::new_spinner());
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("{}...", name).dimmed().to_string());
    pb
}

/// Prints `line` above any active spinner. A hidden target swallows
/// `println`, so fall back to stdout there.
fn print_above(multi: &MultiProgress, terminal: bool, line: &str) {
    if terminal && multi.println(line).is_ok() {
        return;
    }
    println!("{}", line);
}

pub fn summary(summary: &RunSummary, results: &[TestResult]) {
    println!("\n{}", banner("📊 Test Summary"));
    println!("✅ Passed: {}", summary.passed.to_string().green());
    println!("❌ Failed: {}", summary.failed.to_string().red());
    println!("📈 Success Rate: {}", format_success_rate(summary));

    if summary.failed > 0 {
        println!("\n{}", "❌ Failed Tests:".red().bold());
        for line in failure_lines(results) {
            println!("{}", line);
        }
    }
}

pub fn report_written(path: &Path) {
    println!("    Report saved to: {}", path.display());
}

pub fn interrupted() {
    println!("\n\n{}  Test interrupted by user", "⚠️".yellow());
}

pub fn suite_error(error: &anyhow::Error) {
    println!("\n{} Test suite error: {:#}", "❌".red(), error);
}

pub fn format_success_rate(summary: &RunSummary) -> String {
    match summary.success_rate() {
        Some(rate) => format!("{:.1}%", rate),
        None => "n/a (no tests run)".to_string(),
    }
}

fn failure_lines(results: &[TestResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| !r.is_passed())
        .map(|r| format!("  - {}: {}", r.name, r.error.as_deref().unwrap_or("")))
        .collect()
}

fn banner(title: &str) -> String {
    format!("{}\n{}", title, "=".repeat(RULE_WIDTH))
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
