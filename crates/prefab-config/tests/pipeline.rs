//! End-to-end normalization tests.

use prefab_config::{
    CanonicalConfig, ConfigError, HostError, Login, PipelineOptions, VarEnv, host_label,
    normalize, normalize_value, passwords, role_host_strings, roledefs,
};
use prefab_value::{Value, from_json_str};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    key: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let key = dir.path().join("id_ed25519");
        std::fs::write(&key, "key material").unwrap();
        Self { _dir: dir, key }
    }

    /// Environment whose `__key_dir` points at the fixture directory.
    fn env(&self, options: &PipelineOptions) -> VarEnv {
        let key_dir = self.key.parent().unwrap_or(Path::new("/")).display().to_string();
        options.var_env(
            [("HOME", "/home/ops".to_string()), ("__KEY_DIR", key_dir)],
            "/srv/deploy",
        )
    }

    fn run(&self, document: &str) -> Result<CanonicalConfig, ConfigError> {
        let options = PipelineOptions::default();
        normalize(&from_json_str(document).unwrap(), &self.env(&options), &options)
    }
}

#[test]
fn test_profile_host_role_scenario() {
    let fixture = Fixture::new();
    let config = fixture
        .run(
            r#"{
                "profiles": {
                    "ssh": {"connection": {"method": "key", "port": 22, "keys": ["{key_dir}/id_ed25519"]}}
                },
                "hosts": {
                    "vm1": {"address": "192.168.1.10", "profile": "ssh"}
                },
                "roles": {
                    "web": ["vm1"]
                }
            }"#,
        )
        .unwrap();

    let vm1 = &config.hosts["vm1"];
    assert_eq!(vm1.address, "192.168.1.10");
    assert_eq!(vm1.port, 22);
    assert_eq!(vm1.user, "root");
    assert_eq!(
        vm1.login,
        Login::Key {
            keys: vec![fixture.key.clone()]
        }
    );

    let web = &config.roles["web"];
    assert_eq!(web.hosts, vec!["vm1"]);
    assert!(web.env.is_empty());
}

#[test]
fn test_normalized_value_has_no_profile_references() {
    let fixture = Fixture::new();
    let options = PipelineOptions::default();
    let raw = from_json_str(
        r#"{
            "profiles": {"pw": {"connection": {"method": "password", "user": "admin"}}},
            "hosts": {
                "a": {"address": "10.0.0.1", "profile": "pw", "password": "hunter2"},
                "b": {"address": "10.0.0.2", "method": "password", "profile": "pw"}
            },
            "roles": {"all": {"hosts": ["a", "b"], "env": {"stage": "prod"}}}
        }"#,
    )
    .unwrap();
    let value = normalize_value(&raw, &fixture.env(&options), &options).unwrap();

    for label in ["a", "b"] {
        let host = value.get("hosts").and_then(|h| h.get(label)).unwrap();
        assert!(!host.contains_key("profile"), "{label} kept its profile");
    }
    // `a` took the profile's user; `b` was complete and kept the default.
    assert_eq!(
        value.get("hosts").and_then(|h| h.get("a")).and_then(|a| a.get("user")),
        Some(&Value::from("admin"))
    );
    assert_eq!(
        value.get("hosts").and_then(|h| h.get("b")).and_then(|b| b.get("user")),
        Some(&Value::from("root"))
    );
}

#[test]
fn test_normalization_is_idempotent() {
    let fixture = Fixture::new();
    let options = PipelineOptions::default();
    let env = fixture.env(&options);
    let raw = from_json_str(
        r#"{
            "profiles": {"pw": {"connection": {"method": "password"}}},
            "hosts": {"a": {"address": "10.0.0.1", "profile": "pw"}},
            "roles": {"all": ["a"]}
        }"#,
    )
    .unwrap();

    let once = normalize_value(&raw, &env, &options).unwrap();
    let twice = normalize_value(&once, &env, &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_lookups_on_normalized_config() {
    let fixture = Fixture::new();
    let config = fixture
        .run(
            r#"{
                "hosts": {
                    "web1": {"address": "10.0.0.1", "user": "www", "method": "password", "password": "pw1"},
                    "web2": {"address": "10.0.0.2", "port": 2222, "method": "password"}
                },
                "roles": {"web": {"hosts": ["web1", "web2"], "env": {"workers": 4}}}
            }"#,
        )
        .unwrap();

    assert_eq!(
        role_host_strings(&config, "web"),
        vec!["www@10.0.0.1:22", "root@10.0.0.2:2222"]
    );
    assert_eq!(host_label(&config, "10.0.0.2:2222"), Ok("web2"));
    assert_eq!(passwords(&config)["www@10.0.0.1:22"], "pw1");
    assert_eq!(roledefs(&config)["web"].env["workers"], Value::from(4));
}

#[test]
fn test_all_host_errors_reported() {
    let fixture = Fixture::new();
    let err = fixture
        .run(
            r#"{
                "profiles": {"ssh": {"connection": {"method": "key", "keys": ["{key_dir}/missing"]}}},
                "hosts": {
                    "vm1": {"address": "a", "profile": "nope"},
                    "vm2": {"address": "b", "profile": "ssh"},
                    "vm3": {"user": "x"}
                }
            }"#,
        )
        .unwrap_err();

    let ConfigError::Hosts(errors) = &err else {
        panic!("unexpected error: {err:?}");
    };
    let labels: Vec<&str> = errors.iter().map(HostError::label).collect();
    assert_eq!(labels, vec!["vm1", "vm2", "vm3"]);
    assert!(matches!(errors[0], HostError::ProfileMissing(ref e) if e.profile == "nope"));
    assert!(matches!(errors[1], HostError::EntryInvalid(ref e) if e.error.is_some()));

    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("PF-3-1"));
    assert_eq!(diagnostic.details.len(), 3);
    assert!(diagnostic.to_text().contains("not an existing file @ data['keys'][0]"));
}

#[test]
fn test_unbound_variable() {
    let fixture = Fixture::new();
    let err = fixture
        .run(r#"{"hosts": {"vm1": {"address": "{region}.internal", "method": "password"}}}"#)
        .unwrap_err();
    match err {
        ConfigError::VarExpansion(e) => {
            assert_eq!(e.varname, "region");
            assert_eq!(e.value, "{region}.internal");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_hosts() {
    let fixture = Fixture::new();
    let err = fixture
        .run(
            r#"{
                "hosts": {"vm1": {"address": "a", "method": "password"}},
                "roles": {"web": ["vm1", "vmX"], "db": ["vmX", "vmY"]}
            }"#,
        )
        .unwrap_err();
    match err {
        ConfigError::MissingHosts(e) => assert_eq!(e.missing, vec!["vmX", "vmY"]),
        other => panic!("unexpected error: {other:?}"),
    }
}
