//! Configuration normalization for prefab.
//!
//! A prefab configuration describes remote hosts, connection profiles and
//! roles grouping hosts. Documents may be sparse: hosts can name a profile
//! instead of spelling out their connection settings, roles can be bare
//! lists of host labels, and strings can refer to environment variables.
//! [`normalize`] turns such a document into a [`CanonicalConfig`] in which
//! every host is complete and every reference is resolved.
//!
//! ```
//! use prefab_config::{PipelineOptions, normalize};
//! use prefab_value::from_json_str;
//!
//! let raw = from_json_str(r#"{
//!     "profiles": {"db": {"connection": {"method": "password", "user": "postgres"}}},
//!     "hosts": {"db1": {"address": "10.0.0.5", "profile": "db"}},
//!     "roles": {"database": ["db1"]}
//! }"#).unwrap();
//!
//! let options = PipelineOptions::default();
//! let env = options.var_env([("HOME", "/root")], "/srv");
//! let config = normalize(&raw, &env, &options).unwrap();
//!
//! assert_eq!(config.hosts["db1"].user, "postgres");
//! assert_eq!(config.hosts["db1"].port, 22);
//! assert_eq!(config.roles["database"].hosts, vec!["db1"]);
//! ```

pub mod error;
pub mod hosts;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod roles;
pub mod schemas;
pub mod vars;

pub use error::ConfigError;
pub use hosts::{HostEntryError, HostEntryProfileMissing, HostError, normalize_hosts};
pub use lookup::{
    LookupError, RoleDef, host_entry, host_label, host_roles, host_string, parse_host_string,
    passwords, role_host_strings, roledefs,
};
pub use model::{CanonicalConfig, Connection, Env, HostEntry, Login, Method, Profile, RoleEntry};
pub use pipeline::{DEFAULT_PREFIX, PipelineOptions, normalize, normalize_value};
pub use roles::{MissingHostsError, normalize_role, normalize_roles};
pub use vars::{VarEnv, VarExpansionError, expand_vars};
