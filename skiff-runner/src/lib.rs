//! Skiff Runner
//!
//! Lifecycle controller for one ephemeral remote build job.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Services: One per lifecycle stage (stacks, launch, log tailing, completion)
//! - Controller: Sequences the stages and guarantees teardown
//!
//! The controller renders the job template, provisions the job stacks,
//! launches the task, tails its log stream until the job's sentinel shows
//! up, reads the exit code and deletes everything it provisioned.

pub mod config;
pub mod controller;
pub mod decode;
pub mod error;
pub mod service;
pub mod sinks;
pub mod templates;

#[cfg(test)]
mod testing;

pub use config::RunnerConfig;
pub use controller::{Backends, JobController};
pub use error::JobFailure;
pub use sinks::{LogSink, StdoutLogSink, TracingLogSink};
pub use templates::Templates;
