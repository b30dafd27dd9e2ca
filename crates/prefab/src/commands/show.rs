//! Show command implementation

use super::label_width;
use crate::OutputFormat;
use anyhow::{Context, Result};
use prefab_config::{CanonicalConfig, Login, host_string};

pub fn execute(config: &CanonicalConfig, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(config),
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).context("Failed to render configuration as JSON")?
        }
    };
    println!("{}", rendered);
    Ok(())
}

/// Sectioned, human-readable listing of profiles, hosts and roles.
pub fn render_text(config: &CanonicalConfig) -> String {
    let mut lines = Vec::new();

    lines.push("profiles:".to_string());
    let width = label_width(config.profiles.keys());
    for (name, profile) in &config.profiles {
        let c = &profile.connection;
        lines.push(format!(
            "  {:width$}  {} login as {} on port {}",
            name, c.method, c.user, c.port
        ));
    }

    lines.push("hosts:".to_string());
    let width = label_width(config.hosts.keys());
    for (label, entry) in &config.hosts {
        let login = match &entry.login {
            Login::Key { keys } => {
                let keys: Vec<String> = keys.iter().map(|k| k.display().to_string()).collect();
                format!("key {}", keys.join(", "))
            }
            Login::Password { password: Some(_) } => "password (preset)".to_string(),
            Login::Password { password: None } => "password (prompt)".to_string(),
        };
        lines.push(format!("  {:width$}  {}  {}", label, host_string(entry), login));
    }

    lines.push("roles:".to_string());
    let width = label_width(config.roles.keys());
    for (name, role) in &config.roles {
        lines.push(format!("  {:width$}  {}", name, role.hosts.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefab_config::{Connection, Env, HostEntry, Method, Profile, RoleEntry};
    use std::path::PathBuf;

    #[test]
    fn test_render_text() {
        let mut config = CanonicalConfig::default();
        config.profiles.insert(
            "ssh".to_string(),
            Profile {
                connection: Connection {
                    method: Method::Key,
                    user: "root".to_string(),
                    port: 22,
                },
                env: Env::new(),
            },
        );
        config.hosts.insert(
            "vm1".to_string(),
            HostEntry {
                address: "10.0.0.1".to_string(),
                port: 22,
                user: "root".to_string(),
                login: Login::Key {
                    keys: vec![PathBuf::from("/keys/id")],
                },
            },
        );
        config.roles.insert(
            "web".to_string(),
            RoleEntry {
                hosts: vec!["vm1".to_string()],
                env: Env::new(),
            },
        );

        assert_eq!(
            render_text(&config),
            "profiles:\n  ssh  key login as root on port 22\n\
             hosts:\n  vm1  root@10.0.0.1:22  key /keys/id\n\
             roles:\n  web  vm1"
        );
    }
}
