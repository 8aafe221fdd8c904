//! Run state carried from step to step
//!
//! One `RunState` lives for the duration of a run. The driver threads it by
//! mutable reference through every step; nothing else touches it.

use serde::Serialize;
use std::fmt;

/// Set of statuses a check accepts as passing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expect(&'static [u16]);

impl Expect {
    pub const OK: Expect = Expect(&[200]);
    pub const OK_OR_CREATED: Expect = Expect(&[200, 201]);

    pub const fn any_of(statuses: &'static [u16]) -> Self {
        Self(statuses)
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.0.contains(&status)
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        f.write_str(&joined)
    }
}

impl Serialize for Expect {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Outcome of one executed check
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub observed_status: u16,
    pub expected: Expect,
    pub body_excerpt: String,
}

impl TestResult {
    /// Line shown in the final itemized list
    pub fn summary_line(&self) -> String {
        if self.passed {
            format!("✅ {}", self.name)
        } else {
            format!(
                "❌ {} (expected {}, got {})",
                self.name, self.expected, self.observed_status
            )
        }
    }
}

/// Named value carried between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    AccessToken,
    RefreshToken,
    ProjectId,
    PipelineId,
}

impl Slot {
    /// Tokens follow the latest successful producer; identifiers keep the first
    fn overwrites(self) -> bool {
        matches!(self, Slot::AccessToken | Slot::RefreshToken)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::AccessToken => f.write_str("access token"),
            Slot::RefreshToken => f.write_str("refresh token"),
            Slot::ProjectId => f.write_str("project id"),
            Slot::PipelineId => f.write_str("pipeline id"),
        }
    }
}

/// Values extracted from earlier responses
#[derive(Debug, Default, Clone)]
pub struct Carried {
    access_token: Option<String>,
    refresh_token: Option<String>,
    project_id: Option<String>,
    pipeline_id: Option<String>,
}

impl Carried {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slot_ref(slot).as_deref()
    }

    pub fn has(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    /// Store a value, returning whether the slot changed
    ///
    /// Empty values are ignored. Identifier slots keep their first value.
    pub fn store(&mut self, slot: Slot, value: String) -> bool {
        if value.is_empty() {
            return false;
        }
        let overwrites = slot.overwrites();
        let current = self.slot_mut(slot);
        if current.is_some() && !overwrites {
            return false;
        }
        *current = Some(value);
        true
    }

    fn slot_ref(&self, slot: Slot) -> &Option<String> {
        match slot {
            Slot::AccessToken => &self.access_token,
            Slot::RefreshToken => &self.refresh_token,
            Slot::ProjectId => &self.project_id,
            Slot::PipelineId => &self.pipeline_id,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::AccessToken => &mut self.access_token,
            Slot::RefreshToken => &mut self.refresh_token,
            Slot::ProjectId => &mut self.project_id,
            Slot::PipelineId => &mut self.pipeline_id,
        }
    }
}

/// Process-scoped accumulator for one run
#[derive(Debug, Default)]
pub struct RunState {
    pub passed: usize,
    pub failed: usize,
    /// Steps not attempted because a prerequisite was missing
    pub skipped: Vec<String>,
    pub results: Vec<TestResult>,
    pub carried: Carried,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result and bump the matching counter
    pub fn record(&mut self, result: TestResult) {
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub fn executed(&self) -> usize {
        self.results.len()
    }
}
