//! Service layer
//!
//! One service per lifecycle stage. Services talk to infrastructure only
//! through the injected backend traits, so tests run them against in-memory
//! fakes.

mod cleanup;
mod completion;
mod launcher;
mod stack;
mod tailer;

pub use cleanup::Cleanup;
pub use completion::CompletionService;
pub use launcher::{PLATFORM_VERSION, TaskLauncher};
pub use stack::StackService;
pub use tailer::{LogTailer, TailOutcome};
