//! CLI command handling
//!
//! Wires configuration, the HTTP executor, the recorder and the scenario
//! together and prints the results.

use std::time::Duration;

use colored::Colorize;
use serde::Serialize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::http::HttpExecutor;
use crate::testing::{report, Account, Expect, Recorder, RunState, Scenario, Session, Slot, StepSpec};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            base_url,
            timeout,
            config,
            only,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            cfg.apply_overrides(base_url, timeout)?;
            run(&cfg, only.as_deref(), json).await
        }

        Commands::List { json } => list(json),
    }
}

/// Run the scenario once and report
///
/// Returns [`Error::ChecksFailed`] when any executed check failed so the
/// process exits non-zero.
pub async fn run(config: &Config, only: Option<&str>, json: bool) -> Result<()> {
    let executor = HttpExecutor::new(Duration::from_secs(config.timeouts.request_secs))?;
    let mut recorder = Recorder::new(executor, config.output.body_excerpt_chars);
    if json {
        recorder = recorder.quiet();
    }

    let mut scenario = Scenario::standard();
    if let Some(pattern) = only {
        scenario = scenario.filtered(pattern);
    }

    let session = Session {
        base_url: config.target.base_url.clone(),
        account: Account::generate(&config.account),
        upload: config.upload.clone(),
    };

    tracing::info!(
        base_url = %session.base_url,
        email = %session.account.email,
        steps = scenario.steps().len(),
        "starting run"
    );

    if !json {
        println!("{}\n", "=== PipeRAG E2E Tests ===".blue().bold());
    }

    let mut state = RunState::new();
    scenario.run(&recorder, &session, &mut state).await;

    if json {
        report::print_json(&state)?;
    } else {
        report::print_text(&state);
    }

    if state.failed > 0 {
        return Err(Error::ChecksFailed {
            failed: state.failed,
            total: state.executed(),
        });
    }
    Ok(())
}

/// One row of `list` output
#[derive(Debug, Serialize)]
struct StepView {
    name: &'static str,
    method: String,
    path: &'static str,
    auth: bool,
    expect: Expect,
    requires: Vec<Slot>,
    captures: Vec<Slot>,
}

impl From<&StepSpec> for StepView {
    fn from(step: &StepSpec) -> Self {
        Self {
            name: step.name,
            method: step.method.to_string(),
            path: step.path,
            auth: step.auth,
            expect: step.expect,
            requires: step.prerequisites(),
            captures: step.captures.iter().map(|c| c.slot).collect(),
        }
    }
}

fn list(json: bool) -> Result<()> {
    let scenario = Scenario::standard();
    let views: Vec<StepView> = scenario.steps().iter().map(StepView::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!(
        "{:>3}  {:<22} {:<6} {:<46} {:<12} {}",
        "#", "STEP", "METHOD", "PATH", "EXPECT", "NEEDS"
    );
    for (i, view) in views.iter().enumerate() {
        let needs = if view.requires.is_empty() {
            "-".to_string()
        } else {
            view.requires
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "{:>3}  {:<22} {:<6} {:<46} {:<12} {}",
            i + 1,
            view.name,
            view.method,
            view.path,
            view.expect.to_string(),
            needs.dimmed()
        );
        if !view.captures.is_empty() {
            let produces = view
                .captures
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("{:>5}{} {}", "", "produces:".cyan(), produces);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_view_includes_token_for_authed_steps() {
        let scenario = Scenario::standard();
        let step = scenario
            .steps()
            .iter()
            .find(|s| s.name == "Get project by ID")
            .unwrap();
        let view = StepView::from(step);
        assert_eq!(view.method, "GET");
        assert_eq!(view.requires, vec![Slot::AccessToken, Slot::ProjectId]);
        assert!(view.captures.is_empty());
    }

    #[test]
    fn test_step_view_serializes() {
        let scenario = Scenario::standard();
        let views: Vec<StepView> = scenario.steps().iter().map(StepView::from).collect();
        let value = serde_json::to_value(&views).unwrap();
        assert_eq!(value[1]["name"], "Register");
        assert_eq!(
            value[1]["captures"],
            serde_json::json!(["access_token", "refresh_token"])
        );
    }
}
