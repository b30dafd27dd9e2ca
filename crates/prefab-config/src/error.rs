//! Pipeline errors.

use crate::hosts::{HostError, HostErrorList};
use crate::roles::MissingHostsError;
use crate::vars::VarExpansionError;
use prefab_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use prefab_schema::ValidationErrors;
use prefab_value::{Value, WalkError};
use thiserror::Error;

/// Errors that stop a pipeline run.
///
/// Each variant belongs to one stage; the first failing stage's error is
/// returned and no partial configuration is produced.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The document is not a mapping of `profiles`, `hosts` and `roles`.
    #[error("configuration has an invalid structure:\n{errors}")]
    Shape {
        errors: ValidationErrors,
        /// The document as given.
        data: Value,
    },

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    VarExpansion(#[from] VarExpansionError),

    #[error("{}", HostErrorList(.0))]
    Hosts(Vec<HostError>),

    #[error(transparent)]
    MissingHosts(#[from] MissingHostsError),

    /// The normalized configuration failed the final check.
    #[error("configuration is invalid:\n{errors}")]
    Invalid {
        errors: ValidationErrors,
        /// The assembled configuration the errors refer to.
        data: Value,
    },
}

impl ConfigError {
    /// Error code from the catalog in `prefab-error-reporting`.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Shape { .. } | ConfigError::Invalid { .. } => "PF-5-1",
            ConfigError::Walk(WalkError::DepthExceeded { .. }) => "PF-2-2",
            ConfigError::Walk(WalkError::KeyCollision { .. }) => "PF-2-3",
            ConfigError::VarExpansion(_) => "PF-2-1",
            ConfigError::Hosts(errors) => {
                if errors.iter().all(|e| matches!(e, HostError::ProfileMissing(_))) {
                    "PF-3-2"
                } else {
                    "PF-3-1"
                }
            }
            ConfigError::MissingHosts(_) => "PF-4-1",
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let code = self.error_code();
        match self {
            ConfigError::Shape { errors, data } => {
                let mut diagnostic = errors.to_diagnostic("Invalid configuration", Some(data));
                diagnostic.code = Some(code.to_string());
                diagnostic.problem = Some(
                    "The configuration must be an object with `profiles`, `hosts` and `roles` mappings"
                        .to_string(),
                );
                diagnostic
            }
            ConfigError::Walk(e @ WalkError::DepthExceeded { .. }) => {
                DiagnosticMessageBuilder::error("Configuration nested too deeply")
                    .with_code(code)
                    .problem(e.to_string())
                    .build()
            }
            ConfigError::Walk(e @ WalkError::KeyCollision { .. }) => {
                DiagnosticMessageBuilder::error("Colliding keys")
                    .with_code(code)
                    .problem("Variable expansion would merge two entries of one mapping")
                    .add_detail(e.to_string())
                    .add_hint("Give the entries distinct names?")
                    .build()
            }
            ConfigError::VarExpansion(e) => {
                let mut builder = DiagnosticMessageBuilder::error("Unbound variable")
                    .with_code(code)
                    .problem(format!(
                        "The configuration refers to variable `{}`, which is not defined",
                        e.varname
                    ))
                    .add_detail(format!("while expanding {:?}", e.value));
                let names: Vec<&str> = e.env.names().collect();
                builder = builder.add_info(format!("defined variables: {}", names.join(", ")));
                if is_identifier(&e.varname) {
                    builder = builder.add_hint(format!(
                        "Set the environment variable `{}{}`?",
                        e.env.prefix(),
                        e.varname.to_uppercase()
                    ));
                } else {
                    builder = builder.add_hint("Write `{{` and `}}` for literal braces?");
                }
                builder.build()
            }
            ConfigError::Hosts(errors) => {
                let mut builder = DiagnosticMessageBuilder::error("Invalid host entries")
                    .with_code(code)
                    .problem(format!("{} host entries could not be resolved", errors.len()));
                for error in errors {
                    builder = builder.add_detail(host_detail(error));
                }
                builder.build()
            }
            ConfigError::MissingHosts(e) => {
                let mut builder = DiagnosticMessageBuilder::error("Undefined hosts")
                    .with_code(code)
                    .problem("Roles refer to hosts that are not defined under `hosts`");
                for label in &e.missing {
                    builder = builder.add_detail(format!("`{}` is referenced but undefined", label));
                }
                builder
                    .add_hint("Check the spelling of the host labels?")
                    .build()
            }
            ConfigError::Invalid { errors, data } => {
                let mut diagnostic = errors.to_diagnostic("Invalid configuration", Some(data));
                diagnostic.code = Some(code.to_string());
                diagnostic.problem =
                    Some("The normalized configuration does not have the expected shape".to_string());
                diagnostic
            }
        }
    }
}

fn host_detail(error: &HostError) -> String {
    match error {
        HostError::EntryInvalid(e) => match &e.error {
            Some(errors) => {
                let mut detail = e.to_string();
                for error in errors {
                    detail.push('\n');
                    detail.push_str(&error.describe(&e.entry));
                }
                detail
            }
            None => e.to_string(),
        },
        HostError::ProfileMissing(e) => e.to_string(),
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::{HostEntryError, HostEntryProfileMissing};
    use crate::vars::VarEnv;

    fn profile_missing(label: &str) -> HostError {
        HostEntryProfileMissing {
            label: label.to_string(),
            entry: Value::mapping(),
            profile: "web".to_string(),
        }
        .into()
    }

    #[test]
    fn test_var_expansion_diagnostic() {
        let env = VarEnv::new([("HOME", "/root")], "__", "/work");
        let err: ConfigError = env.expand_str("{key_dir}/id").unwrap_err().into();
        let diagnostic = err.to_diagnostic();

        assert_eq!(diagnostic.code.as_deref(), Some("PF-2-1"));
        let text = diagnostic.to_text();
        assert!(text.starts_with("Error [PF-2-1]: Unbound variable"));
        assert!(text.contains("✖ while expanding \"{key_dir}/id\""));
        assert!(text.contains("ℹ defined variables: cwd, home"));
        assert!(text.ends_with("? Set the environment variable `__KEY_DIR`?"));
    }

    #[test]
    fn test_hosts_code_depends_on_kinds() {
        let only_missing = ConfigError::Hosts(vec![profile_missing("a"), profile_missing("b")]);
        assert_eq!(only_missing.error_code(), "PF-3-2");
        assert_eq!(
            only_missing.to_string(),
            "host 'a': profile 'web' not defined in config\nhost 'b': profile 'web' not defined in config"
        );

        let mixed = ConfigError::Hosts(vec![
            profile_missing("a"),
            HostEntryError {
                label: "b".to_string(),
                entry: Value::mapping(),
                reason: "missing 'address' field".to_string(),
                error: None,
            }
            .into(),
        ]);
        assert_eq!(mixed.error_code(), "PF-3-1");
        assert_eq!(mixed.to_diagnostic().details.len(), 2);
    }

    #[test]
    fn test_missing_hosts_diagnostic() {
        let err = ConfigError::from(MissingHostsError {
            missing: vec!["vmX".to_string()],
        });
        let text = err.to_diagnostic().to_text();
        assert!(text.contains("✖ `vmX` is referenced but undefined"));
    }

    #[test]
    fn test_every_code_is_cataloged() {
        let errors = vec![
            ConfigError::Shape {
                errors: ValidationErrors::new(),
                data: Value::Null,
            },
            ConfigError::Walk(WalkError::DepthExceeded { max_depth: 1 }),
            ConfigError::Walk(WalkError::KeyCollision {
                key: Value::from("/srv"),
                first: Value::from("{cwd}"),
                second: Value::from("/srv"),
            }),
            ConfigError::Hosts(vec![profile_missing("a")]),
            ConfigError::MissingHosts(MissingHostsError { missing: vec![] }),
        ];
        for error in errors {
            assert!(
                prefab_error_reporting::get_error_info(error.error_code()).is_some(),
                "{} missing from catalog",
                error.error_code()
            );
        }
    }

    #[test]
    fn test_key_collision_diagnostic() {
        let err = ConfigError::Walk(WalkError::KeyCollision {
            key: Value::from("/srv"),
            first: Value::from("{cwd}"),
            second: Value::from("/srv"),
        });
        let text = err.to_diagnostic().to_text();
        assert!(text.starts_with("Error [PF-2-3]: Colliding keys"));
        assert!(text.contains("✖ mapping keys \"{cwd}\" and \"/srv\" both become \"/srv\""));
    }

    #[test]
    fn test_host_detail_shows_offending_values() {
        let entry = prefab_value::from_json_str(r#"{"address": "a", "method": "password", "port": "x"}"#)
            .unwrap();
        let errors = crate::schemas::host().validate(&entry).unwrap_err();
        let err = ConfigError::Hosts(vec![
            HostEntryError {
                label: "vm1".to_string(),
                entry,
                reason: "is incorrectly configured".to_string(),
                error: Some(errors),
            }
            .into(),
        ]);
        let text = err.to_diagnostic().to_text();
        assert!(text.contains("✖ host 'vm1': is incorrectly configured\n"), "{text}");
        assert!(text.contains("@ data['port']\n  got \"x\""), "{text}");
    }
}
