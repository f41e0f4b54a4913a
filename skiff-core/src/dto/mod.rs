//! Data Transfer Objects for backend communication
//!
//! These are the narrow request/response contracts consumed from the stack
//! orchestrator, the task runner and the log stream.

pub mod stack;
pub mod stream;
pub mod task;
