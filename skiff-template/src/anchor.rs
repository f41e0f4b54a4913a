//! Insertion anchors
//!
//! Anchors are literal markers in the base template. Declarations are
//! inserted on the line after the first occurrence of their anchor.

/// Insertion point of the base template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Anchor {
    /// Template parameter declarations
    Parameters,
    /// Secret resource declarations
    SecretResources,
    /// Secret bindings of the job container
    ContainerSecrets,
    /// Environment bindings of the job container
    ContainerEnvironment,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [
        Anchor::Parameters,
        Anchor::SecretResources,
        Anchor::ContainerSecrets,
        Anchor::ContainerEnvironment,
    ];

    /// Literal text searched for in the base template
    pub fn marker(&self) -> &'static str {
        match self {
            Anchor::Parameters => "p1 - input",
            Anchor::SecretResources => "p2 - secret",
            Anchor::ContainerSecrets => "Secrets:",
            Anchor::ContainerEnvironment => "Environment:",
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.marker())
    }
}
