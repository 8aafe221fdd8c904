//! Assertion and recording of individual checks

use colored::Colorize;

use crate::common::excerpt;
use crate::http::{Request, Response, Transport};

use super::state::{Expect, RunState, TestResult};

/// Executes requests and records whether their status was acceptable
pub struct Recorder<T> {
    transport: T,
    excerpt_chars: usize,
    echo: bool,
}

impl<T: Transport> Recorder<T> {
    pub fn new(transport: T, excerpt_chars: usize) -> Self {
        Self {
            transport,
            excerpt_chars,
            echo: true,
        }
    }

    /// Suppress the per-check console lines (used for JSON output)
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Print an indented informational line under the last check
    pub fn note(&self, line: &str) {
        if self.echo {
            println!("   {}", line);
        }
    }

    /// Send `request`, check its status against `expect` and record the outcome
    ///
    /// The raw response is returned whatever the verdict, so the caller can
    /// still extract values from it.
    pub async fn run_case(
        &self,
        state: &mut RunState,
        name: &str,
        request: Request,
        expect: Expect,
    ) -> Response {
        let response = self.transport.execute(request).await;
        self.check(state, name, &response, expect);
        response
    }

    /// Judge an already obtained response and record it
    ///
    /// A transport failure never passes, even against a set that lists `0`.
    pub fn check(
        &self,
        state: &mut RunState,
        name: &str,
        response: &Response,
        expect: Expect,
    ) -> bool {
        let passed = !response.is_transport_failure() && expect.accepts(response.status);
        let body_excerpt = excerpt(&response.body, self.excerpt_chars);

        if self.echo {
            if passed {
                println!(
                    "✅ {}: {} (HTTP {})",
                    "PASS".green().bold(),
                    name,
                    response.status
                );
            } else {
                println!(
                    "❌ {}: {} (expected {}, got {})",
                    "FAIL".red().bold(),
                    name,
                    expect,
                    response.status
                );
                println!("   Body: {}", body_excerpt.dimmed());
            }
        }

        if !passed {
            tracing::debug!(step = name, status = response.status, "check failed");
        }

        state.record(TestResult {
            name: name.to_string(),
            passed,
            observed_status: response.status,
            expected: expect,
            body_excerpt,
        });

        passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::TRANSPORT_FAILURE;
    use async_trait::async_trait;
    use reqwest::Method;

    struct Fixed(Response);

    #[async_trait]
    impl Transport for Fixed {
        async fn execute(&self, _request: Request) -> Response {
            self.0.clone()
        }
    }

    fn recorder(status: u16, body: &str) -> Recorder<Fixed> {
        Recorder::new(
            Fixed(Response {
                status,
                body: body.to_string(),
            }),
            10,
        )
        .quiet()
    }

    fn request() -> Request {
        Request::new(Method::GET, "http://localhost:5000/health")
    }

    #[tokio::test]
    async fn test_match_counts_pass() {
        let rec = recorder(200, "Healthy");
        let mut state = RunState::new();

        let resp = rec.run_case(&mut state, "Health check", request(), Expect::OK).await;

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "Healthy");
        assert_eq!(state.passed, 1);
        assert_eq!(state.failed, 0);
        assert!(state.results[0].passed);
        assert_eq!(state.results[0].summary_line(), "✅ Health check");
    }

    #[tokio::test]
    async fn test_mismatch_counts_fail_with_excerpt() {
        let rec = recorder(500, "Internal server error: stack trace follows");
        let mut state = RunState::new();

        let resp = rec.run_case(&mut state, "Get models", request(), Expect::OK).await;

        assert_eq!(resp.status, 500);
        assert_eq!(state.passed, 0);
        assert_eq!(state.failed, 1);
        let result = &state.results[0];
        assert_eq!(result.observed_status, 500);
        assert_eq!(result.body_excerpt, "Internal s...");
        assert_eq!(
            result.summary_line(),
            "❌ Get models (expected 200, got 500)"
        );
    }

    #[tokio::test]
    async fn test_response_returned_unchanged_on_failure() {
        let rec = recorder(401, r#"{"error":"nope"}"#);
        let mut state = RunState::new();

        let resp = rec.run_case(&mut state, "Login", request(), Expect::OK).await;

        assert_eq!(resp.body, r#"{"error":"nope"}"#);
    }

    #[tokio::test]
    async fn test_transport_failure_always_fails() {
        let rec = recorder(TRANSPORT_FAILURE, "connection refused");
        let mut state = RunState::new();

        rec.run_case(&mut state, "Health check", request(), Expect::OK).await;
        rec.run_case(&mut state, "Odd", request(), Expect::any_of(&[0, 200]))
            .await;

        assert_eq!(state.passed, 0);
        assert_eq!(state.failed, 2);
    }

    #[tokio::test]
    async fn test_accepted_set() {
        let rec = recorder(201, "");
        let mut state = RunState::new();

        rec.run_case(&mut state, "Upload document", request(), Expect::OK_OR_CREATED)
            .await;

        assert_eq!(state.passed, 1);
    }
}
