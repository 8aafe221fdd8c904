//! End-of-run report

use colored::Colorize;
use serde::Serialize;

use super::state::{RunState, TestResult};

/// Serializable view of a finished run
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub skipped_steps: &'a [String],
    pub results: &'a [TestResult],
}

impl<'a> From<&'a RunState> for RunReport<'a> {
    fn from(state: &'a RunState) -> Self {
        Self {
            passed: state.passed,
            failed: state.failed,
            skipped: state.skipped.len(),
            skipped_steps: &state.skipped,
            results: &state.results,
        }
    }
}

/// Render the text summary: separator, counts, then every result line in order
pub fn render_text(state: &RunState) -> String {
    let separator = "-".repeat(40);
    let mut counts = format!("RESULTS: {} passed, {} failed", state.passed, state.failed);
    if !state.skipped.is_empty() {
        counts.push_str(&format!(", {} skipped", state.skipped.len()));
    }

    let mut out = format!("\n{}\n{}\n{}\n", separator, counts, separator);
    for result in &state.results {
        out.push_str(&result.summary_line());
        out.push('\n');
    }
    out
}

/// Print the text summary, coloring the counts line
pub fn print_text(state: &RunState) {
    let text = render_text(state);
    for line in text.lines() {
        if line.starts_with("RESULTS:") {
            if state.failed == 0 {
                println!("{}", line.green().bold());
            } else {
                println!("{}", line.red().bold());
            }
        } else {
            println!("{}", line);
        }
    }
}

/// Print the report as pretty JSON
pub fn print_json(state: &RunState) -> crate::common::Result<()> {
    let json = serde_json::to_string_pretty(&RunReport::from(state))?;
    println!("{}", json);
    Ok(())
}
