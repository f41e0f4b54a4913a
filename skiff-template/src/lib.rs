//! Skiff Template
//!
//! Parameterizes the job's infrastructure template with per-job environment
//! variables and secrets.
//!
//! This crate includes:
//! - Anchors marking where declarations are inserted
//! - A structured template document with explicit insertion points
//! - The parameterizer that renders a base template for one job
//! - Names of the parameters every job stack receives

pub mod anchor;
pub mod document;
pub mod error;
pub mod parameters;
pub mod render;

pub use anchor::Anchor;
pub use document::TemplateDocument;
pub use error::{Result, TemplateError};
pub use render::render;

pub use skiff_core::domain::variable::{EnvironmentVariable, Secret, sanitize_key};
