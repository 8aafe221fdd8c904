//! E2E scenario execution
//!
//! Walks the ordered API journey, carrying tokens and identifiers forward,
//! recording one pass/fail result per executed step and reporting at the end.

pub mod recorder;
pub mod report;
pub mod scenario;
pub mod state;

pub use recorder::Recorder;
pub use scenario::{Account, Scenario, Session, StepSpec};
pub use state::{Carried, Expect, RunState, Slot, TestResult};
