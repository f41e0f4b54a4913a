//! Template parameterizer
//!
//! Renders the job's base template by declaring one parameter per
//! environment variable and secret, one secret resource per secret, and the
//! matching container bindings.

use std::collections::HashMap;

use skiff_core::domain::variable::{EnvironmentVariable, Secret, sanitize_key};

use crate::anchor::Anchor;
use crate::document::TemplateDocument;
use crate::error::{Result, TemplateError};
use crate::parameters;

/// Render a base template for one job
///
/// # Arguments
/// * `base` - The base template text
/// * `secrets` - Secrets to declare, unique by parameter key
/// * `environment` - Environment variables to declare, unique by name
///
/// # Returns
/// The rendered template text
///
/// # Errors
/// Returns an error if:
/// - An anchor needed for an insertion is missing from `base`
/// - A name sanitizes to an empty or reserved parameter key, or to one
///   `base` already declares
/// - Two inputs sanitize to the same parameter key
///
/// # Example
/// ```
/// use skiff_template::{render, EnvironmentVariable};
///
/// let base = "Parameters:\n  # p1 - input\nEnvironment:\n";
/// let rendered = render(base, &[], &[EnvironmentVariable::new("GIT_SHA", "abc")])?;
/// assert!(rendered.contains("  GITSHA:\n"));
/// assert!(rendered.contains("- Name: 'GIT_SHA'"));
/// # Ok::<(), skiff_template::TemplateError>(())
/// ```
pub fn render(
    base: &str,
    secrets: &[Secret],
    environment: &[EnvironmentVariable],
) -> Result<String> {
    let mut doc = TemplateDocument::parse(base);
    check_keys(&doc, secrets, environment)?;

    for secret in secrets {
        let key = secret.sanitized_key();
        doc.insert(Anchor::Parameters, parameter_block(&key))?;
        doc.insert(
            Anchor::SecretResources,
            secret_resource_block(&key, &secret.parameter_key),
        )?;
        doc.insert(
            Anchor::ContainerSecrets,
            container_secret_block(secret.container_name(), &key),
        )?;
    }

    for variable in environment {
        let key = variable.parameter_key();
        doc.insert(Anchor::Parameters, parameter_block(&key))?;
        doc.insert(
            Anchor::ContainerEnvironment,
            container_environment_block(&variable.name, &key),
        )?;
    }

    Ok(doc.render())
}

/// Ensures every input maps to its own non-empty, non-reserved parameter
///
/// Reserved keys are the ones every job stack is submitted with and the ones
/// the base template declares itself.
fn check_keys(
    doc: &TemplateDocument,
    secrets: &[Secret],
    environment: &[EnvironmentVariable],
) -> Result<()> {
    let names = secrets
        .iter()
        .map(|s| s.parameter_key.as_str())
        .chain(environment.iter().map(|v| v.name.as_str()));

    let mut seen: HashMap<String, &str> = HashMap::new();

    for name in names {
        let key = sanitize_key(name);

        if key.is_empty() {
            return Err(TemplateError::EmptyKey(name.to_string()));
        }

        if parameters::is_reserved(&key) || doc.declares(&key) {
            return Err(TemplateError::ReservedKey {
                key,
                name: name.to_string(),
            });
        }

        if let Some(first) = seen.get(&key) {
            return Err(TemplateError::DuplicateKey {
                key,
                first: first.to_string(),
                second: name.to_string(),
            });
        }

        seen.insert(key, name);
    }

    Ok(())
}

fn parameter_block(key: &str) -> String {
    format!(
        "
  {key}:
    Type: String
    Default: ''
"
    )
}

fn secret_resource_block(key: &str, name: &str) -> String {
    format!(
        "
  {key}Secret:
    Type: AWS::SecretsManager::Secret
    Properties:
      Name: !Join [ \"\", [ {name}, !Ref {build_id} ] ]
      SecretString: !Ref {key}
",
        name = quote(name),
        build_id = parameters::BUILD_ID,
    )
}

fn container_secret_block(env_name: &str, key: &str) -> String {
    format!(
        "
            - Name: {name}
              ValueFrom: !Ref {key}Secret
",
        name = quote(env_name),
    )
}

fn container_environment_block(env_name: &str, key: &str) -> String {
    format!(
        "
            - Name: {name}
              Value: !Ref {key}
",
        name = quote(env_name),
    )
}

/// Single-quoted YAML scalar
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
