//! Reading the configuration file and running the pipeline on it.

use prefab_config::{CanonicalConfig, ConfigError, PipelineOptions, normalize};
use prefab_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use prefab_value::from_json_str;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit code when the configuration file cannot be read.
pub const ERR_NO_CFG: i32 = -1;
/// Exit code when the configuration file is not valid.
pub const ERR_INVALID_CFG: i32 = -2;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read configuration file '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration file '{}' is not valid JSON: {}", path.display(), fmt_json_err(source))]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LoadError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Unreadable { .. } => ERR_NO_CFG,
            LoadError::Json { .. } | LoadError::Config(_) => ERR_INVALID_CFG,
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            LoadError::Unreadable { path, source } => {
                DiagnosticMessageBuilder::error("Configuration file unreadable")
                    .with_code("PF-6-1")
                    .problem(format!("Could not read `{}`", path.display()))
                    .add_detail(source.to_string())
                    .add_hint("Pass the file location with `--config-path`?")
                    .build()
            }
            LoadError::Json { path, source } => DiagnosticMessageBuilder::error("Invalid JSON")
                .with_code("PF-6-2")
                .problem(format!("`{}` is not a valid JSON document", path.display()))
                .add_detail(fmt_json_err(source))
                .build(),
            LoadError::Config(e) => e.to_diagnostic(),
        }
    }
}

/// `line L, column C: message` for a JSON decoding error.
pub fn fmt_json_err(err: &serde_json::Error) -> String {
    let full = err.to_string();
    let location = format!(" at line {} column {}", err.line(), err.column());
    let message = full.strip_suffix(&location).unwrap_or(&full);
    format!("line {}, column {}: {}", err.line(), err.column(), message)
}

/// Read, decode and normalize the configuration at `path`.
///
/// Variables come from the process environment; `cwd` is the current
/// directory.
pub fn load_config(path: &Path, options: &PipelineOptions) -> Result<CanonicalConfig, LoadError> {
    tracing::debug!(path = %path.display(), "Loading configuration");
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = from_json_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|_| ".".to_string());
    // Variables that are not valid unicode cannot be substituted anyway.
    let snapshot = std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)));
    let env = options.var_env(snapshot, cwd);
    for name in env.shadowed() {
        eprintln!("{}", shadowed_warning(env.prefix(), name).to_text());
    }

    Ok(normalize(&raw, &env, options)?)
}

/// Warning for a prefixed variable that lost to the implicit variable of
/// the same name.
pub fn shadowed_warning(prefix: &str, name: &str) -> DiagnosticMessage {
    let source = if name == "cwd" {
        "the current directory"
    } else {
        "the home directory"
    };
    DiagnosticMessageBuilder::warning("Variable ignored")
        .with_code("PF-2-4")
        .problem(format!(
            "`{}{}` is ignored: `{{{}}}` always refers to {}",
            prefix,
            name.to_uppercase(),
            name,
            source
        ))
        .add_hint("Unset the environment variable or rename it?")
        .build()
}
