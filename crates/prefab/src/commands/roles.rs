//! Roles command implementation

use super::label_width;
use anyhow::Result;
use prefab_config::{CanonicalConfig, roledefs};

pub fn execute(config: &CanonicalConfig) -> Result<()> {
    let listing = render(config);
    if !listing.is_empty() {
        println!("{}", listing);
    }
    Ok(())
}

/// One line per role: its host strings, then its env as `key=value`.
pub fn render(config: &CanonicalConfig) -> String {
    let width = label_width(config.roles.keys());
    roledefs(config)
        .iter()
        .map(|(name, def)| {
            let mut line = format!("{:width$}  {}", name, def.hosts.join(", "));
            if !def.env.is_empty() {
                let env: Vec<String> = def
                    .env
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v.to_plain_string()))
                    .collect();
                line.push_str(&format!("  [{}]", env.join(" ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
