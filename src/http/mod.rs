//! HTTP plumbing: the request executor and the multipart encoder

pub mod executor;
pub mod multipart;

pub use executor::{Body, HttpExecutor, Request, Response, Transport, TRANSPORT_FAILURE};
