//! Queries over a normalized configuration.
//!
//! Host strings have the form `user@address:port`; IPv6 addresses are
//! written in brackets (`root@[::1]:22`).

use crate::model::{CanonicalConfig, Env, HostEntry, Login};
use crate::schemas::{DEFAULT_PORT, DEFAULT_USER};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("'{host_string}' is not a valid host string")]
    InvalidHostString { host_string: String },

    #[error("no host matches '{host_string}'")]
    NoMatch { host_string: String },

    #[error("host string '{host_string}' matches several hosts: {}", labels.join(", "))]
    Ambiguous {
        host_string: String,
        labels: Vec<String>,
    },
}

/// `user@address:port` for a host entry.
pub fn host_string(entry: &HostEntry) -> String {
    if entry.address.contains(':') {
        format!("{}@[{}]:{}", entry.user, entry.address, entry.port)
    } else {
        format!("{}@{}:{}", entry.user, entry.address, entry.port)
    }
}

pub fn host_entry<'a>(config: &'a CanonicalConfig, label: &str) -> Option<&'a HostEntry> {
    config.hosts.get(label)
}

/// Roles the host takes part in.
pub fn host_roles<'a>(config: &'a CanonicalConfig, label: &str) -> Vec<&'a str> {
    config
        .roles
        .iter()
        .filter(|(_, role)| role.hosts.iter().any(|h| h == label))
        .map(|(name, _)| name.as_str())
        .collect()
}

/// Split a host string into user, address and port, applying the defaults
/// for missing parts.
pub fn parse_host_string(host_string: &str) -> Result<(String, String, u16), LookupError> {
    let invalid = || LookupError::InvalidHostString {
        host_string: host_string.to_string(),
    };

    let (user, rest) = match host_string.rsplit_once('@') {
        Some((user, rest)) => (user, rest),
        None => (DEFAULT_USER, host_string),
    };

    let (address, port) = if let Some(bracketed) = rest.strip_prefix('[') {
        let (address, after) = bracketed.split_once(']').ok_or_else(invalid)?;
        match after {
            "" => (address, None),
            _ => (address, Some(after.strip_prefix(':').ok_or_else(invalid)?)),
        }
    } else if rest.matches(':').count() > 1 {
        // bare IPv6 address without a port
        (rest, None)
    } else {
        match rest.split_once(':') {
            Some((address, port)) => (address, Some(port)),
            None => (rest, None),
        }
    };

    let port = match port {
        Some(port) => port.parse::<u16>().map_err(|_| invalid())?,
        None => DEFAULT_PORT,
    };
    if user.is_empty() || address.is_empty() || port == 0 {
        return Err(invalid());
    }
    Ok((user.to_string(), address.to_string(), port))
}

/// The single host whose user, address and port match `host_string`.
pub fn host_label<'a>(config: &'a CanonicalConfig, host_string: &str) -> Result<&'a str, LookupError> {
    let (user, address, port) = parse_host_string(host_string)?;
    let labels: Vec<&str> = config
        .hosts
        .iter()
        .filter(|(_, h)| h.user == user && h.address == address && h.port == port)
        .map(|(label, _)| label.as_str())
        .collect();

    match labels.as_slice() {
        [label] => Ok(*label),
        [] => Err(LookupError::NoMatch {
            host_string: host_string.to_string(),
        }),
        _ => Err(LookupError::Ambiguous {
            host_string: host_string.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }),
    }
}

/// Host strings of a role's members. Unknown roles have none.
pub fn role_host_strings(config: &CanonicalConfig, role: &str) -> Vec<String> {
    config
        .roles
        .get(role)
        .map(|role| {
            role.hosts
                .iter()
                .filter_map(|label| config.hosts.get(label))
                .map(host_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Preset passwords, by host string.
pub fn passwords(config: &CanonicalConfig) -> IndexMap<String, String> {
    config
        .hosts
        .values()
        .filter_map(|entry| match &entry.login {
            Login::Password {
                password: Some(password),
            } if !password.is_empty() => Some((host_string(entry), password.clone())),
            _ => None,
        })
        .collect()
}

/// A role in connection terms: member host strings plus the role's env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDef {
    pub hosts: Vec<String>,
    #[serde(flatten)]
    pub env: Env,
}

pub fn roledefs(config: &CanonicalConfig) -> IndexMap<String, RoleDef> {
    config
        .roles
        .iter()
        .map(|(name, role)| {
            (
                name.clone(),
                RoleDef {
                    hosts: role_host_strings(config, name),
                    env: role.env.clone(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoleEntry;
    use prefab_value::Value;
    use std::path::PathBuf;

    fn host(address: &str, user: &str, port: u16, login: Login) -> HostEntry {
        HostEntry {
            address: address.to_string(),
            port,
            user: user.to_string(),
            login,
        }
    }

    fn password(p: Option<&str>) -> Login {
        Login::Password {
            password: p.map(str::to_string),
        }
    }

    fn config() -> CanonicalConfig {
        let mut config = CanonicalConfig::default();
        config.hosts.insert(
            "vm1".to_string(),
            host("10.0.0.1", "root", 22, Login::Key { keys: vec![PathBuf::from("/k")] }),
        );
        config
            .hosts
            .insert("vm2".to_string(), host("10.0.0.2", "deploy", 2222, password(Some("s3cret"))));
        config.hosts.insert("vm3".to_string(), host("::1", "root", 22, password(None)));
        config.roles.insert(
            "web".to_string(),
            RoleEntry {
                hosts: vec!["vm1".to_string(), "vm2".to_string()],
                env: [("stage".to_string(), Value::from("prod"))].into_iter().collect(),
            },
        );
        config.roles.insert(
            "db".to_string(),
            RoleEntry {
                hosts: vec!["vm2".to_string()],
                env: Env::new(),
            },
        );
        config
    }

    #[test]
    fn test_host_string() {
        let config = config();
        assert_eq!(host_string(&config.hosts["vm1"]), "root@10.0.0.1:22");
        assert_eq!(host_string(&config.hosts["vm3"]), "root@[::1]:22");
    }

    #[test]
    fn test_host_entry_and_roles() {
        let config = config();
        assert_eq!(host_entry(&config, "vm2").map(|h| h.port), Some(2222));
        assert!(host_entry(&config, "nope").is_none());
        assert_eq!(host_roles(&config, "vm2"), vec!["web", "db"]);
        assert!(host_roles(&config, "vm3").is_empty());
    }

    #[test]
    fn test_parse_host_string() {
        assert_eq!(
            parse_host_string("deploy@example.com:2222").unwrap(),
            ("deploy".to_string(), "example.com".to_string(), 2222)
        );
        assert_eq!(
            parse_host_string("example.com").unwrap(),
            ("root".to_string(), "example.com".to_string(), 22)
        );
        assert_eq!(
            parse_host_string("[::1]:2200").unwrap(),
            ("root".to_string(), "::1".to_string(), 2200)
        );
        assert_eq!(parse_host_string("fe80::1").unwrap().1, "fe80::1");
        assert!(parse_host_string("host:notaport").is_err());
        assert!(parse_host_string("@host").is_err());
        assert!(parse_host_string("[::1").is_err());
    }

    #[test]
    fn test_host_label() {
        let config = config();
        assert_eq!(host_label(&config, "10.0.0.1"), Ok("vm1"));
        assert_eq!(host_label(&config, "deploy@10.0.0.2:2222"), Ok("vm2"));
        assert_eq!(host_label(&config, "[::1]"), Ok("vm3"));
        assert!(matches!(
            host_label(&config, "10.0.0.2"),
            Err(LookupError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_host_label_ambiguous() {
        let mut config = config();
        let copy = config.hosts["vm1"].clone();
        config.hosts.insert("vm1-copy".to_string(), copy);
        let err = host_label(&config, "root@10.0.0.1:22").unwrap_err();
        assert_eq!(
            err.to_string(),
            "host string 'root@10.0.0.1:22' matches several hosts: vm1, vm1-copy"
        );
    }

    #[test]
    fn test_role_host_strings() {
        let config = config();
        assert_eq!(
            role_host_strings(&config, "web"),
            vec!["root@10.0.0.1:22", "deploy@10.0.0.2:2222"]
        );
        assert!(role_host_strings(&config, "nope").is_empty());
    }

    #[test]
    fn test_passwords() {
        let passwords = passwords(&config());
        assert_eq!(passwords.len(), 1);
        assert_eq!(passwords["deploy@10.0.0.2:2222"], "s3cret");
    }

    #[test]
    fn test_roledefs() {
        let defs = roledefs(&config());
        assert_eq!(defs["db"].hosts, vec!["deploy@10.0.0.2:2222"]);
        assert_eq!(
            serde_json::to_value(&defs["web"]).unwrap(),
            serde_json::json!({
                "hosts": ["root@10.0.0.1:22", "deploy@10.0.0.2:2222"],
                "stage": "prod"
            })
        );
    }
}
