//! Typed view of a normalized configuration.

use indexmap::IndexMap;
use prefab_value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment values shared with remote commands.
pub type Env = IndexMap<String, Value>;

/// How to log in to a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Login {
    Key {
        keys: Vec<PathBuf>,
    },
    Password {
        /// Prompted for at connection time when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Key,
    Password,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Key => write!(f, "key"),
            Method::Password => write!(f, "password"),
        }
    }
}

impl Login {
    pub fn method(&self) -> Method {
        match self {
            Login::Key { .. } => Method::Key,
            Login::Password { .. } => Method::Password,
        }
    }
}

/// A complete host entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub address: String,
    pub port: u16,
    pub user: String,
    #[serde(flatten)]
    pub login: Login,
}

/// Connection defaults of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub method: Method,
    pub user: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub connection: Connection,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: Env,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub hosts: Vec<String>,
    #[serde(default)]
    pub env: Env,
}

/// The result of a successful pipeline run.
///
/// Every role's hosts exist in `hosts`, and every host is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalConfig {
    #[serde(default)]
    pub profiles: IndexMap<String, Profile>,
    #[serde(default)]
    pub hosts: IndexMap<String, HostEntry>,
    #[serde(default)]
    pub roles: IndexMap<String, RoleEntry>,
}

impl CanonicalConfig {
    /// Build the typed view from a value that already passed
    /// [`crate::schemas::config`].
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_value(value)?;
        serde_json::from_value(json)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        Ok(Value::from(serde_json::to_value(self)?))
    }
}
