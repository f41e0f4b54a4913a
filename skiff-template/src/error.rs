//! Error types for template rendering

use thiserror::Error;

use crate::anchor::Anchor;

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors raised while parameterizing a template
///
/// All of them are detected before anything is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The base template lacks an anchor needed for an insertion
    #[error("template anchor {0} not found")]
    MissingAnchor(Anchor),

    /// A variable or secret name has no alphanumeric characters
    #[error("'{0}' does not contain any alphanumeric characters")]
    EmptyKey(String),

    /// Two inputs map to the same template parameter
    #[error("'{first}' and '{second}' both map to template parameter '{key}'")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    /// An input maps to a parameter the job stack already has
    #[error("'{name}' maps to reserved template parameter '{key}'")]
    ReservedKey { key: String, name: String },
}

impl TemplateError {
    /// Check if this error is caused by the base template itself
    pub fn is_template_defect(&self) -> bool {
        matches!(self, Self::MissingAnchor(_))
    }
}
