//! Role canonicalization and host reference checking.

use indexmap::IndexSet;
use prefab_value::{Map, Value};
use thiserror::Error;

/// Roles refer to host labels that are not defined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hosts referenced in config, but undefined: {}", missing.join(", "))]
pub struct MissingHostsError {
    /// Every undefined label, in order of first reference.
    pub missing: Vec<String>,
}

/// Bring one role into `{hosts, env}` form.
///
/// A bare list of labels becomes the `hosts` of a role with an empty `env`.
/// Other shapes are left for the final validation to judge.
pub fn normalize_role(role: &Value) -> Value {
    match role {
        Value::Sequence(_) => [
            (Value::from("hosts"), role.clone()),
            (Value::from("env"), Value::mapping()),
        ]
        .into_iter()
        .collect(),
        Value::Mapping(fields) if !fields.contains_key(&Value::from("env")) => {
            let mut fields = fields.clone();
            fields.insert(Value::from("env"), Value::mapping());
            Value::Mapping(fields)
        }
        other => other.clone(),
    }
}

/// Canonicalize every role and check that each referenced host exists in
/// the resolved `hosts`.
pub fn normalize_roles(roles: &Map, hosts: &Map) -> Result<Map, MissingHostsError> {
    let normalized: Map = roles
        .iter()
        .map(|(label, role)| (label.clone(), normalize_role(role)))
        .collect();

    let referenced: IndexSet<&str> = normalized
        .values()
        .filter_map(|role| role.get("hosts"))
        .filter_map(Value::as_sequence)
        .flatten()
        .filter_map(Value::as_str)
        .collect();

    let missing: Vec<String> = referenced
        .into_iter()
        .filter(|label| !hosts.contains_key(&Value::from(*label)))
        .map(str::to_string)
        .collect();

    if !missing.is_empty() {
        tracing::debug!(count = missing.len(), "Roles reference undefined hosts");
        return Err(MissingHostsError { missing });
    }
    Ok(normalized)
}
