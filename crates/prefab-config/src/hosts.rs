//! Host entry resolution.
//!
//! A host entry is either complete, or names a profile whose `connection`
//! template supplies the missing fields. Resolution yields complete entries
//! only; the `profile` reference does not survive it.

use crate::schemas;
use prefab_schema::{ValidationErrors, valid};
use prefab_value::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A host entry is malformed, or merging it with its profile did not
/// produce a complete entry.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("host '{label}': {reason}")]
pub struct HostEntryError {
    pub label: String,
    /// The value `error` refers to: the entry as given, the merged entry
    /// when the merge failed, or the profile definition when the profile
    /// itself is invalid.
    pub entry: Value,
    pub reason: String,
    /// Validation failures behind `reason`, when there are any.
    pub error: Option<ValidationErrors>,
}

/// An incomplete host entry refers to a profile that is not defined.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("host '{label}': profile '{profile}' not defined in config")]
pub struct HostEntryProfileMissing {
    pub label: String,
    pub entry: Value,
    pub profile: String,
}

/// Any failure to resolve a single host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error(transparent)]
    EntryInvalid(#[from] HostEntryError),
    #[error(transparent)]
    ProfileMissing(#[from] HostEntryProfileMissing),
}

impl HostError {
    pub fn label(&self) -> &str {
        match self {
            HostError::EntryInvalid(e) => &e.label,
            HostError::ProfileMissing(e) => &e.label,
        }
    }
}

/// Newline-separated list of host errors, used by `ConfigError`'s display.
pub(crate) struct HostErrorList<'a>(pub &'a [HostError]);

impl fmt::Display for HostErrorList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Resolve every host entry against `profiles`.
///
/// All hosts are processed; when any fail, every failure is returned in
/// input order.
pub fn normalize_hosts(profiles: &Map, hosts: &Map) -> Result<Map, Vec<HostError>> {
    let mut normalized = Map::with_capacity(hosts.len());
    let mut errors = Vec::new();

    for (label, entry) in hosts {
        match normalize_host(profiles, &label.to_plain_string(), entry) {
            Ok(resolved) => {
                normalized.insert(label.clone(), resolved);
            }
            Err(e) => {
                tracing::debug!(host = %e.label(), error = %e, "Host entry rejected");
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}

fn normalize_host(profiles: &Map, label: &str, entry: &Value) -> Result<Value, HostError> {
    let host = schemas::host();

    // Already complete.
    if let Ok(validated) = host.validate(entry) {
        tracing::trace!(host = label, "Host entry is complete");
        return Ok(without_profile(validated));
    }

    if !valid(&schemas::short_host(), entry) {
        let (reason, error) = if !entry.contains_key("address") {
            ("missing 'address' field".to_string(), None)
        } else if !entry.contains_key("profile") {
            (
                "missing 'profile' field. Incomplete entries must refer to a profile".to_string(),
                None,
            )
        } else {
            ("is incorrectly configured".to_string(), host.validate(entry).err())
        };
        return Err(HostEntryError {
            label: label.to_string(),
            entry: entry.clone(),
            reason,
            error,
        }
        .into());
    }

    let profile_name = entry
        .get("profile")
        .map(Value::to_plain_string)
        .unwrap_or_default();
    let profile = match profiles.get(&Value::from(profile_name.as_str())) {
        Some(profile) if !profile.is_null() => profile,
        _ => {
            return Err(HostEntryProfileMissing {
                label: label.to_string(),
                entry: entry.clone(),
                profile: profile_name,
            }
            .into());
        }
    };

    let profile = schemas::profile().validate(profile).map_err(|e| HostEntryError {
        label: label.to_string(),
        entry: profile.clone(),
        reason: format!("profile '{}' is invalid", profile_name),
        error: Some(e),
    })?;

    // Profile fields first; the entry's own fields win.
    let mut merged = profile
        .get("connection")
        .and_then(Value::as_mapping)
        .cloned()
        .unwrap_or_default();
    if let Some(fields) = entry.as_mapping() {
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged.shift_remove(&Value::from("profile"));
    let merged = Value::Mapping(merged);

    tracing::debug!(host = label, profile = %profile_name, "Merged host entry with profile");

    match host.validate(&merged) {
        Ok(validated) => Ok(without_profile(validated)),
        Err(e) => Err(HostEntryError {
            label: label.to_string(),
            entry: merged,
            reason: format!(
                "merging entry with profile '{}' does not produce a valid host entry",
                profile_name
            ),
            error: Some(e),
        }
        .into()),
    }
}

fn without_profile(mut entry: Value) -> Value {
    if let Some(fields) = entry.as_mapping_mut() {
        fields.shift_remove(&Value::from("profile"));
    }
    entry
}
