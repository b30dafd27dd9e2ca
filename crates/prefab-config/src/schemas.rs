//! Schemas for the sections of a prefab configuration.
//!
//! Raw documents are checked against [`raw_config`] before anything else
//! happens; the pipeline result must satisfy [`config`].

use prefab_schema::{
    Field, Schema, all_of, any, any_of, dict_of, literal, mapping, non_empty, one_of_literals,
    pred, range, scalar, seq_of, string,
};
use prefab_value::Value;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_USER: &str = "root";

/// TCP port number.
pub fn port() -> Schema {
    range(1, 65535)
}

/// Environment shared with remote commands: string keys, scalar values.
pub fn env() -> Schema {
    dict_of(string(), scalar())
}

fn is_file(value: &Value) -> bool {
    value.as_str().is_some_and(|path| Path::new(path).is_file())
}

fn host_common() -> Schema {
    mapping(vec![
        Field::required("address", string()),
        Field::with_default("port", port(), DEFAULT_PORT),
        Field::with_default("user", string(), DEFAULT_USER),
        Field::optional("profile", string()),
    ])
}

fn key_login() -> Schema {
    mapping(vec![
        Field::required("method", literal("key")),
        Field::required(
            "keys",
            non_empty(seq_of(pred(is_file, Some("not an existing file")))),
        ),
    ])
}

fn password_login() -> Schema {
    mapping(vec![
        Field::required("method", literal("password")),
        // prompted for at connection time when omitted
        Field::optional("password", string()),
    ])
}

/// A complete host entry using exactly one login method.
pub fn host() -> Schema {
    all_of(vec![host_common(), any_of(vec![key_login(), password_login()])])
}

/// Host entry as it may appear in a document: complete, or an address
/// plus a profile to fill in the rest.
pub fn short_host() -> Schema {
    any_of(vec![
        host(),
        mapping(vec![
            Field::required("address", string()),
            Field::required("profile", string()),
        ]),
    ])
}

/// Connection template of a profile. Extra keys are merged into hosts.
pub fn connection() -> Schema {
    mapping(vec![
        Field::required("method", one_of_literals(["key", "password"])),
        Field::with_default("user", string(), DEFAULT_USER),
        Field::with_default("port", port(), DEFAULT_PORT),
    ])
}

pub fn profile() -> Schema {
    mapping(vec![
        Field::required("connection", connection()),
        Field::optional("env", env()),
    ])
}

pub fn role_entry() -> Schema {
    mapping(vec![
        Field::required("hosts", non_empty(seq_of(string()))),
        Field::with_default("env", env(), Value::mapping()),
    ])
}

/// Top-level shape of an input document. Every section is optional.
pub fn raw_config() -> Schema {
    mapping(vec![
        Field::with_default("profiles", dict_of(string(), any()), Value::mapping()),
        Field::with_default("hosts", dict_of(string(), any()), Value::mapping()),
        Field::with_default("roles", dict_of(string(), any()), Value::mapping()),
    ])
}

/// A fully normalized configuration.
pub fn config() -> Schema {
    mapping(vec![
        Field::required("profiles", dict_of(string(), profile())),
        Field::required("hosts", dict_of(string(), host())),
        Field::required("roles", dict_of(string(), role_entry())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefab_schema::{explain, valid};
    use prefab_value::from_json_str;
    use std::io::Write;

    fn json(text: &str) -> Value {
        from_json_str(text).unwrap()
    }

    #[test]
    fn test_port() {
        assert!(valid(&port(), &Value::from(22)));
        assert!(!valid(&port(), &Value::from(0)));
        assert!(!valid(&port(), &Value::from(65536)));
    }

    #[test]
    fn test_env_values_must_be_scalar() {
        assert!(valid(&env(), &json(r#"{"a": "x", "b": 1, "c": null, "d": true}"#)));
        assert!(!valid(&env(), &json(r#"{"a": [1]}"#)));
    }

    #[test]
    fn test_password_host_defaults() {
        let out = host()
            .validate(&json(r#"{"address": "10.0.0.1", "method": "password"}"#))
            .unwrap();
        assert_eq!(out.get("port"), Some(&Value::from(22)));
        assert_eq!(out.get("user"), Some(&Value::from("root")));
        assert!(!out.contains_key("password"));
    }

    #[test]
    fn test_key_host_requires_existing_files() {
        let mut key = tempfile::NamedTempFile::new().unwrap();
        writeln!(key, "not really a key").unwrap();
        let path = key.path().to_str().unwrap().to_string();

        let mut entry = json(r#"{"address": "a", "method": "key"}"#);
        entry
            .as_mapping_mut()
            .unwrap()
            .insert("keys".into(), Value::Sequence(vec![Value::from(path)]));
        assert!(valid(&host(), &entry));

        let missing = json(r#"{"address": "a", "method": "key", "keys": ["/nonexistent/id_rsa"]}"#);
        assert_eq!(
            explain(&host(), &missing).as_deref(),
            Some("not an existing file @ data['keys'][0]")
        );

        let empty = json(r#"{"address": "a", "method": "key", "keys": []}"#);
        assert!(!valid(&host(), &empty));
    }

    #[test]
    fn test_password_host_reports_password_error() {
        let entry = json(r#"{"address": "a", "method": "password", "password": 5}"#);
        assert_eq!(
            explain(&host(), &entry).as_deref(),
            Some("expected string, got integer @ data['password']")
        );
    }

    #[test]
    fn test_host_needs_a_method() {
        assert!(!valid(&host(), &json(r#"{"address": "a"}"#)));
        assert!(!valid(&host(), &json(r#"{"address": "a", "method": "token"}"#)));
    }

    #[test]
    fn test_short_host() {
        assert!(valid(&short_host(), &json(r#"{"address": "a", "profile": "p"}"#)));
        assert!(!valid(&short_host(), &json(r#"{"address": "a"}"#)));
        assert!(!valid(&short_host(), &json(r#"{"profile": "p"}"#)));
    }

    #[test]
    fn test_profile() {
        let out = profile()
            .validate(&json(r#"{"connection": {"method": "key", "keys": ["k"]}}"#))
            .unwrap();
        let connection = out.get("connection").unwrap();
        assert_eq!(connection.get("user"), Some(&Value::from("root")));
        assert_eq!(connection.get("port"), Some(&Value::from(22)));
        assert!(connection.contains_key("keys"));

        assert!(!valid(&profile(), &json(r#"{"connection": {"user": "x"}}"#)));
        assert!(!valid(&profile(), &json(r#"{"env": {}}"#)));
    }

    #[test]
    fn test_role_entry() {
        let out = role_entry().validate(&json(r#"{"hosts": ["vm1"]}"#)).unwrap();
        assert_eq!(out.get("env"), Some(&Value::mapping()));
        assert!(!valid(&role_entry(), &json(r#"{"hosts": []}"#)));
        assert!(!valid(&role_entry(), &json(r#"{"hosts": [1]}"#)));
    }

    #[test]
    fn test_raw_config_fills_sections() {
        let out = raw_config().validate(&json("{}")).unwrap();
        for section in ["profiles", "hosts", "roles"] {
            assert_eq!(out.get(section), Some(&Value::mapping()));
        }
        assert!(!valid(&raw_config(), &json("[]")));
        assert!(!valid(&raw_config(), &json(r#"{"hosts": []}"#)));
    }
}
