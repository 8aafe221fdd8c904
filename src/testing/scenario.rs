//! The ordered user journey and the driver that walks it
//!
//! Each step is a declarative [`StepSpec`]: what to send, which carried values
//! it needs, which statuses pass, and which response fields to carry forward.
//! A step whose prerequisites are missing is skipped, not failed, so one
//! broken producer does not bury the report under follow-on failures.

use rand::Rng;
use reqwest::Method;
use serde_json::json;

use crate::common::config::{AccountConfig, UploadConfig};
use crate::common::{paths, Error, Result};
use crate::http::{multipart, Body, Request, Response, Transport};

use super::recorder::Recorder;
use super::state::{Carried, Expect, RunState, Slot};

/// Builds the request body for a step
pub type BodyFn = fn(&Session, &Carried) -> Result<Body>;

/// Copy a JSON field of a successful response into a slot
#[derive(Debug, Clone, Copy)]
pub struct Capture {
    pub field: &'static str,
    pub slot: Slot,
}

const TOKENS: &[Capture] = &[
    Capture {
        field: "accessToken",
        slot: Slot::AccessToken,
    },
    Capture {
        field: "refreshToken",
        slot: Slot::RefreshToken,
    },
];

const PROJECT_ID: &[Capture] = &[Capture {
    field: "id",
    slot: Slot::ProjectId,
}];

const PIPELINE_ID: &[Capture] = &[Capture {
    field: "id",
    slot: Slot::PipelineId,
}];

/// One entry of the scenario table
#[derive(Clone)]
pub struct StepSpec {
    pub name: &'static str,
    pub method: Method,
    /// Path below the base URL; `{project}` and `{pipeline}` are substituted
    pub path: &'static str,
    /// Send `Authorization: Bearer <access token>`; implies the token is required
    pub auth: bool,
    pub body: Option<BodyFn>,
    pub expect: Expect,
    /// Carried values that must exist before the step may run
    pub requires: &'static [Slot],
    pub captures: &'static [Capture],
    /// Statuses on which `captures` are attempted
    pub capture_on: Expect,
    /// Kept by `--only` filtering because later steps depend on it
    pub always_run: bool,
}

impl StepSpec {
    fn new(name: &'static str, method: Method, path: &'static str) -> Self {
        Self {
            name,
            method,
            path,
            auth: false,
            body: None,
            expect: Expect::OK,
            requires: &[],
            captures: &[],
            capture_on: Expect::OK,
            always_run: false,
        }
    }

    fn authed(mut self) -> Self {
        self.auth = true;
        self
    }

    fn body(mut self, body: BodyFn) -> Self {
        self.body = Some(body);
        self
    }

    fn expect(mut self, expect: Expect) -> Self {
        self.expect = expect;
        self
    }

    fn requires(mut self, slots: &'static [Slot]) -> Self {
        self.requires = slots;
        self
    }

    fn captures(mut self, captures: &'static [Capture], on: Expect) -> Self {
        self.captures = captures;
        self.capture_on = on;
        self.always_run = true;
        self
    }

    /// Every slot this step needs, including the token for authenticated steps
    pub fn prerequisites(&self) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(self.requires.len() + 1);
        if self.auth {
            slots.push(Slot::AccessToken);
        }
        slots.extend(self.requires.iter().copied().filter(|s| *s != Slot::AccessToken));
        slots
    }

    /// First prerequisite not yet established, if any
    pub fn missing(&self, carried: &Carried) -> Option<Slot> {
        self.prerequisites().into_iter().find(|slot| !carried.has(*slot))
    }

    /// Build the concrete request from the run's session and carried values
    pub fn request(&self, session: &Session, carried: &Carried) -> Result<Request> {
        let path = render_path(self.path, carried)?;
        let mut request = Request::new(self.method.clone(), format!("{}{}", session.base_url, path));

        if self.auth {
            let token = carried.get(Slot::AccessToken).ok_or_else(|| {
                Error::InvalidRequest(format!("'{}' needs an access token", self.name))
            })?;
            request = request.with_bearer(token);
        }

        if let Some(build) = self.body {
            request = request.with_body(build(session, carried)?);
        }

        Ok(request)
    }
}

/// Substitute `{project}` and `{pipeline}` from carried values
fn render_path(template: &str, carried: &Carried) -> Result<String> {
    let mut path = template.to_string();
    for (placeholder, slot) in [("{project}", Slot::ProjectId), ("{pipeline}", Slot::PipelineId)] {
        if path.contains(placeholder) {
            let value = carried.get(slot).ok_or_else(|| {
                Error::InvalidRequest(format!("path '{}' needs a {}", template, slot))
            })?;
            path = path.replace(placeholder, value);
        }
    }
    Ok(path)
}

/// Credentials for this run; the email is fresh every time
#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl Account {
    pub fn generate(config: &AccountConfig) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..6)
            .map(|_| char::from(rng.random_range(b'a'..=b'z')))
            .collect();
        Self {
            email: format!("e2e_{}@{}", suffix, config.email_domain),
            password: config.password.clone(),
            display_name: config.display_name.clone(),
        }
    }
}

/// Per-run inputs that request bodies draw on
#[derive(Debug, Clone)]
pub struct Session {
    pub base_url: String,
    pub account: Account,
    pub upload: UploadConfig,
}

fn register_body(session: &Session, _: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "email": session.account.email,
        "password": session.account.password,
        "displayName": session.account.display_name,
    })))
}

fn login_body(session: &Session, _: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "email": session.account.email,
        "password": session.account.password,
    })))
}

fn refresh_body(_: &Session, carried: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "refreshToken": carried.get(Slot::RefreshToken).unwrap_or_default(),
    })))
}

fn profile_update_body(session: &Session, _: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "displayName": session.account.display_name,
    })))
}

fn project_body(_: &Session, _: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "name": "E2E Test Project",
        "description": "Test",
    })))
}

fn pipeline_body(_: &Session, _: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "name": "Test Pipeline",
        "description": "E2E",
        "nodes": [],
        "edges": [],
    })))
}

/// Write the fixture to disk, read it back, and wrap it as multipart
fn upload_body(session: &Session, _: &Carried) -> Result<Body> {
    let upload = &session.upload;
    let path = paths::fixture_path(&upload.filename);

    paths::ensure_fixture_dir().map_err(|e| Error::fixture(&path, e))?;
    std::fs::write(&path, &upload.content).map_err(|e| Error::fixture(&path, e))?;
    let bytes = std::fs::read(&path).map_err(|e| Error::fixture(&path, e))?;

    Ok(multipart::encode(&upload.field, &upload.filename, &bytes).into_body())
}

fn chat_body(_: &Session, _: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "message": "Hello",
        "query": "Hello",
    })))
}

fn widget_body(_: &Session, _: &Carried) -> Result<Body> {
    Ok(Body::Json(json!({
        "title": "Test Widget",
        "primaryColor": "#3B82F6",
        "position": "bottom-right",
    })))
}

const PROJECT: &[Slot] = &[Slot::ProjectId];

/// The ordered journey through the API
#[derive(Clone)]
pub struct Scenario {
    steps: Vec<StepSpec>,
}

impl Scenario {
    pub fn standard() -> Self {
        let steps = vec![
            StepSpec::new("Health check", Method::GET, "/health"),
            StepSpec::new("Register", Method::POST, "/api/auth/register")
                .body(register_body)
                .captures(TOKENS, Expect::OK),
            StepSpec::new("Login", Method::POST, "/api/auth/login")
                .body(login_body)
                .captures(TOKENS, Expect::OK),
            StepSpec::new("Refresh token", Method::POST, "/api/auth/refresh")
                .body(refresh_body)
                .requires(&[Slot::RefreshToken])
                .captures(TOKENS, Expect::OK),
            StepSpec::new("Get user profile", Method::GET, "/api/users/me").authed(),
            StepSpec::new("Update user profile", Method::PUT, "/api/users/me")
                .authed()
                .body(profile_update_body),
            StepSpec::new("Create project", Method::POST, "/api/projects")
                .authed()
                .body(project_body)
                .captures(PROJECT_ID, Expect::OK),
            StepSpec::new("List projects", Method::GET, "/api/projects").authed(),
            StepSpec::new("Get project by ID", Method::GET, "/api/projects/{project}")
                .authed()
                .requires(PROJECT),
            // The API answers 201 Created here
            StepSpec::new(
                "Create pipeline",
                Method::POST,
                "/api/projects/{project}/pipelines",
            )
            .authed()
            .requires(PROJECT)
            .body(pipeline_body)
            .expect(Expect::OK_OR_CREATED)
            .captures(PIPELINE_ID, Expect::OK_OR_CREATED),
            StepSpec::new(
                "Get pipeline by ID",
                Method::GET,
                "/api/projects/{project}/pipelines/{pipeline}",
            )
            .authed()
            .requires(&[Slot::ProjectId, Slot::PipelineId]),
            StepSpec::new(
                "List pipelines",
                Method::GET,
                "/api/projects/{project}/pipelines",
            )
            .authed()
            .requires(PROJECT),
            StepSpec::new(
                "Upload document",
                Method::POST,
                "/api/projects/{project}/documents",
            )
            .authed()
            .requires(PROJECT)
            .body(upload_body)
            .expect(Expect::OK_OR_CREATED),
            StepSpec::new(
                "List documents",
                Method::GET,
                "/api/projects/{project}/documents",
            )
            .authed()
            .requires(PROJECT),
            StepSpec::new("Chat query", Method::POST, "/api/projects/{project}/chat")
                .authed()
                .requires(PROJECT)
                .body(chat_body),
            StepSpec::new(
                "List chat sessions",
                Method::GET,
                "/api/projects/{project}/chat/sessions",
            )
            .authed()
            .requires(PROJECT),
            StepSpec::new(
                "Get widget config",
                Method::GET,
                "/api/projects/{project}/widget",
            )
            .authed()
            .requires(PROJECT),
            StepSpec::new(
                "Update widget config",
                Method::PUT,
                "/api/projects/{project}/widget",
            )
            .authed()
            .requires(PROJECT)
            .body(widget_body),
            // 404 while the widget is inactive, which a fresh project's is
            StepSpec::new(
                "Public widget config",
                Method::GET,
                "/api/widget/{project}/config",
            )
            .requires(PROJECT)
            .expect(Expect::any_of(&[200, 404])),
            StepSpec::new("Widget embed.js", Method::GET, "/api/widget/embed.js"),
            StepSpec::new(
                "Billing subscription",
                Method::GET,
                "/api/billing/subscription",
            )
            .authed(),
            StepSpec::new("Billing usage", Method::GET, "/api/billing/usage").authed(),
            StepSpec::new("Get models", Method::GET, "/api/models").authed(),
        ];

        Self { steps }
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    /// Keep steps whose name contains `pattern` (case-insensitive), plus every
    /// step that produces a carried value
    pub fn filtered(mut self, pattern: &str) -> Self {
        let needle = pattern.to_lowercase();
        self.steps
            .retain(|step| step.always_run || step.name.to_lowercase().contains(&needle));
        self
    }

    /// Walk every step in order against the recorder's transport
    pub async fn run<T: Transport>(
        &self,
        recorder: &Recorder<T>,
        session: &Session,
        state: &mut RunState,
    ) {
        for step in &self.steps {
            if let Some(slot) = step.missing(&state.carried) {
                tracing::warn!(step = step.name, missing = %slot, "skipping step");
                state.skipped.push(step.name.to_string());
                continue;
            }

            let request = match step.request(session, &state.carried) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(step = step.name, error = %e, "could not build request");
                    recorder.check(state, step.name, &Response::transport_failure(e), step.expect);
                    continue;
                }
            };

            let response = recorder
                .run_case(state, step.name, request, step.expect)
                .await;

            if !step.captures.is_empty() && step.capture_on.accepts(response.status) {
                capture(step, &response, recorder, state);
            }
        }
    }
}

/// Extract the step's capture fields from a JSON response body
fn capture<T: Transport>(
    step: &StepSpec,
    response: &Response,
    recorder: &Recorder<T>,
    state: &mut RunState,
) {
    let value: serde_json::Value = match serde_json::from_str(&response.body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(step = step.name, error = %e, "response body is not JSON, nothing captured");
            return;
        }
    };

    for cap in step.captures {
        let extracted = match value.get(cap.field) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        if extracted.is_empty() {
            tracing::warn!(step = step.name, field = cap.field, "field missing or empty");
            continue;
        }

        if state.carried.store(cap.slot, extracted.clone()) {
            tracing::info!(step = step.name, slot = %cap.slot, "captured value");
            match cap.slot {
                Slot::ProjectId => recorder.note(&format!("Project ID: {}", extracted)),
                Slot::PipelineId => recorder.note(&format!("Pipeline ID: {}", extracted)),
                Slot::AccessToken | Slot::RefreshToken => {}
            }
        }
    }
}
