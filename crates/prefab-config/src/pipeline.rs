//! The normalization pipeline.
//!
//! Stages run in order, each consuming the previous stage's output:
//!
//! 1. top-level shape check (missing sections become empty mappings)
//! 2. variable expansion
//! 3. host resolution against profiles
//! 4. role canonicalization and host reference check
//! 5. validation of the assembled result
//!
//! The first failing stage ends the run.

use crate::error::ConfigError;
use crate::hosts::normalize_hosts;
use crate::model::CanonicalConfig;
use crate::roles::normalize_roles;
use crate::schemas;
use crate::vars::{VarEnv, expand_vars};
use prefab_schema::{ValidationError, ValidationErrors};
use prefab_value::{DEFAULT_MAX_DEPTH, Map, Value, Walker};

/// Default prefix of environment variables visible to the configuration.
pub const DEFAULT_PREFIX: &str = "__";

/// Settings of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Environment variables starting with this prefix are available for
    /// substitution.
    pub prefix: String,
    /// Deepest nesting the variable expansion walk accepts.
    pub max_depth: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the variable environment for this run.
    pub fn var_env<I, K, V>(&self, snapshot: I, cwd: impl Into<String>) -> VarEnv
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        VarEnv::new(snapshot, &self.prefix, cwd)
    }
}

/// Run every stage and return the validated configuration value.
pub fn normalize_value(
    raw: &Value,
    env: &VarEnv,
    options: &PipelineOptions,
) -> Result<Value, ConfigError> {
    tracing::debug!("Checking configuration structure");
    let shaped = schemas::raw_config()
        .validate(raw)
        .map_err(|errors| ConfigError::Shape {
            errors,
            data: raw.clone(),
        })?;

    tracing::debug!(variables = env.len(), "Expanding variables");
    let walker = Walker::new().with_max_depth(options.max_depth);
    let expanded = expand_vars(shaped, env, &walker)?;

    let empty = Map::new();
    let profiles = section(&expanded, "profiles", &empty);
    let raw_hosts = section(&expanded, "hosts", &empty);
    let raw_roles = section(&expanded, "roles", &empty);

    tracing::debug!(hosts = raw_hosts.len(), profiles = profiles.len(), "Resolving hosts");
    let hosts = normalize_hosts(profiles, raw_hosts).map_err(ConfigError::Hosts)?;

    tracing::debug!(roles = raw_roles.len(), "Resolving roles");
    let roles = normalize_roles(raw_roles, &hosts)?;

    let mut assembled = expanded.as_mapping().cloned().unwrap_or_default();
    assembled.insert(Value::from("hosts"), Value::Mapping(hosts));
    assembled.insert(Value::from("roles"), Value::Mapping(roles));

    tracing::debug!("Validating normalized configuration");
    let assembled = Value::Mapping(assembled);
    match schemas::config().validate(&assembled) {
        Ok(validated) => Ok(validated),
        Err(errors) => Err(ConfigError::Invalid {
            errors,
            data: assembled,
        }),
    }
}

fn section<'a>(config: &'a Value, name: &str, empty: &'a Map) -> &'a Map {
    config.get(name).and_then(Value::as_mapping).unwrap_or(empty)
}

/// Run the pipeline and return the typed configuration.
pub fn normalize(
    raw: &Value,
    env: &VarEnv,
    options: &PipelineOptions,
) -> Result<CanonicalConfig, ConfigError> {
    let value = normalize_value(raw, env, options)?;
    let config = match CanonicalConfig::from_value(&value) {
        Ok(config) => config,
        Err(e) => {
            return Err(ConfigError::Invalid {
                errors: ValidationErrors::from(ValidationError::constraint(e.to_string())),
                data: value,
            });
        }
    };
    tracing::debug!(
        profiles = config.profiles.len(),
        hosts = config.hosts.len(),
        roles = config.roles.len(),
        "Configuration normalized"
    );
    Ok(config)
}
