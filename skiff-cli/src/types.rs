//! Argument types used across CLI modules

use skiff_core::domain::variable::{EnvironmentVariable, Secret};

/// Parses `KEY=VALUE` into an environment variable
///
/// The value may itself contain `=`.
pub fn parse_variable(input: &str) -> Result<EnvironmentVariable, String> {
    let (name, value) = split_assignment(input)?;
    Ok(EnvironmentVariable::new(name, value))
}

/// Parses `KEY=VALUE` or `KEY:ENV_NAME=VALUE` into a secret
///
/// `ENV_NAME` is the variable name the container sees; it defaults to `KEY`.
pub fn parse_secret(input: &str) -> Result<Secret, String> {
    let (key, value) = split_assignment(input)?;
    match key.split_once(':') {
        Some((key, env_name)) if !key.is_empty() && !env_name.is_empty() => {
            Ok(Secret::new(key, value).with_environment_variable(env_name))
        }
        Some(_) => Err(format!("invalid secret name '{}'", key)),
        None => Ok(Secret::new(key, value)),
    }
}

/// Checks a caller-chosen build id
///
/// It becomes part of stack names, which only allow letters, digits and `-`.
pub fn validate_build_id(build_id: &str) -> Result<(), String> {
    if build_id.is_empty() {
        return Err("build id cannot be empty".to_string());
    }
    if !build_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(format!(
            "build id '{}' may only contain ASCII letters, digits and '-'",
            build_id
        ));
    }
    Ok(())
}

fn split_assignment(input: &str) -> Result<(&str, &str), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(format!("expected KEY=VALUE, got '{}'", input)),
    }
}
