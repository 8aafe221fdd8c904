//! PipeRAG E2E - end-to-end conformance harness for the PipeRAG HTTP API
//!
//! This library holds the request executor, the multipart encoder, the
//! pass/fail recorder and the scenario driver used by the `piperag-e2e` binary.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use http::{HttpExecutor, Request, Response, Transport};
pub use testing::{Recorder, RunState, Scenario, Session};
