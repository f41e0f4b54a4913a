//! Core domain types
//!
//! This module contains the core domain structures used across Skiff crates.
//! They describe a single remote build job, from its identity and inputs to
//! the infrastructure resolved for it.

pub mod job;
pub mod log;
pub mod stack;
pub mod task;
pub mod variable;
