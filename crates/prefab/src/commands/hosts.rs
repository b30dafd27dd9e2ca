//! Hosts command implementation

use super::label_width;
use anyhow::Result;
use prefab_config::{CanonicalConfig, host_string};

pub fn execute(config: &CanonicalConfig) -> Result<()> {
    let listing = render(config);
    if !listing.is_empty() {
        println!("{}", listing);
    }
    Ok(())
}

/// One `label  user@address:port` line per host.
pub fn render(config: &CanonicalConfig) -> String {
    let width = label_width(config.hosts.keys());
    config
        .hosts
        .iter()
        .map(|(label, entry)| format!("{:width$}  {}", label, host_string(entry)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefab_config::{HostEntry, Login};

    #[test]
    fn test_render_aligns_labels() {
        let mut config = CanonicalConfig::default();
        for (label, address) in [("vm1", "10.0.0.1"), ("database", "10.0.0.2")] {
            config.hosts.insert(
                label.to_string(),
                HostEntry {
                    address: address.to_string(),
                    port: 22,
                    user: "root".to_string(),
                    login: Login::Password { password: None },
                },
            );
        }
        assert_eq!(
            render(&config),
            "vm1       root@10.0.0.1:22\ndatabase  root@10.0.0.2:22"
        );
        assert_eq!(render(&CanonicalConfig::default()), "");
    }
}
