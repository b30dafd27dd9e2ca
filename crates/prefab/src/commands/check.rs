//! Check command implementation

use anyhow::Result;
use prefab_config::CanonicalConfig;
use std::path::Path;

pub fn execute(path: &Path, config: &CanonicalConfig) -> Result<()> {
    tracing::info!(path = %path.display(), "Configuration is valid");
    println!("{}", summary(path, config));
    Ok(())
}

pub fn summary(path: &Path, config: &CanonicalConfig) -> String {
    format!(
        "{}: {} profiles, {} hosts, {} roles",
        path.display(),
        config.profiles.len(),
        config.hosts.len(),
        config.roles.len()
    )
}
