//! Open mapping schemas with required, optional and defaulted fields.

use crate::error::{PathSegment, ValidationError, ValidationErrorKind, ValidationErrors};
use crate::validator::Schema;
use prefab_value::Value;

#[derive(Debug, Clone)]
enum Presence {
    Required,
    Optional,
    Default(Value),
}

/// A named field of a [`mapping`] schema.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    schema: Schema,
    presence: Presence,
}

impl Field {
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            presence: Presence::Optional,
        }
    }

    /// Field that takes `default` when absent. The default is inserted as
    /// given, without validation.
    pub fn with_default(name: impl Into<String>, schema: Schema, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            schema,
            presence: Presence::Default(default.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

/// Mapping with the given fields.
///
/// Keys not listed in `fields` are tolerated and carried through to the
/// output unchanged. Defaults are appended after the existing keys.
pub fn mapping(fields: Vec<Field>) -> Schema {
    Schema::from_fn("mapping", move |value| {
        let Value::Mapping(entries) = value else {
            return Err(ValidationError::type_mismatch("mapping", value).into());
        };

        let mut errors = ValidationErrors::new();
        let mut out = entries.clone();
        for field in &fields {
            let key = Value::from(field.name.as_str());
            match entries.get(&key) {
                Some(present) => match field.schema.validate(present) {
                    Ok(validated) => {
                        out.insert(key, validated);
                    }
                    Err(e) => errors.extend(e.prefixed(PathSegment::Key(key))),
                },
                None => match &field.presence {
                    Presence::Required => errors.push(
                        ValidationError::new(ValidationErrorKind::MissingRequiredProperty {
                            property: field.name.clone(),
                        })
                        .prefixed(PathSegment::Key(key)),
                    ),
                    Presence::Default(default) => {
                        out.insert(key, default.clone());
                    }
                    Presence::Optional => {}
                },
            }
        }
        errors.into_result(Value::Mapping(out))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{integer, range, string};
    use crate::validator::explain;
    use prefab_value::from_json_str;

    fn host() -> Schema {
        mapping(vec![
            Field::required("address", string()),
            Field::with_default("port", range(1, 65535), 22),
            Field::with_default("user", string(), "root"),
            Field::optional("profile", string()),
        ])
    }

    #[test]
    fn test_defaults_filled_and_extras_kept() {
        let data = from_json_str(r#"{"address": "10.0.0.1", "color": "blue"}"#).unwrap();
        let out = host().validate(&data).unwrap();

        assert_eq!(out.get("port"), Some(&Value::from(22)));
        assert_eq!(out.get("user"), Some(&Value::from("root")));
        assert_eq!(out.get("color"), Some(&Value::from("blue")));
        assert!(!out.contains_key("profile"));

        let keys: Vec<String> = out
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.to_plain_string())
            .collect();
        assert_eq!(keys, vec!["address", "color", "port", "user"]);
    }

    #[test]
    fn test_present_value_wins_over_default() {
        let data = from_json_str(r#"{"address": "a", "port": 2222}"#).unwrap();
        let out = host().validate(&data).unwrap();
        assert_eq!(out.get("port"), Some(&Value::from(2222)));
    }

    #[test]
    fn test_missing_required() {
        let data = from_json_str(r#"{"port": 22}"#).unwrap();
        let errors = host().validate(&data).unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(
            error.kind,
            ValidationErrorKind::MissingRequiredProperty {
                property: "address".to_string()
            }
        );
        assert_eq!(error.to_string(), "required key 'address' not provided @ data['address']");
    }

    #[test]
    fn test_all_field_errors_aggregated() {
        let data = from_json_str(r#"{"address": 1, "port": 0, "user": "u"}"#).unwrap();
        assert_eq!(
            explain(&host(), &data).as_deref(),
            Some(
                "expected string, got integer @ data['address']\n\
                 value 0 must be between 1 and 65535 @ data['port']"
            )
        );
    }

    #[test]
    fn test_nested_paths() {
        let schema = mapping(vec![Field::required(
            "connection",
            mapping(vec![Field::required("port", integer())]),
        )]);
        let data = from_json_str(r#"{"connection": {"port": "x"}}"#).unwrap();
        let errors = schema.validate(&data).unwrap_err();
        assert_eq!(
            errors.first().unwrap().instance_path.to_string(),
            "['connection']['port']"
        );
    }

    #[test]
    fn test_rejects_non_mapping() {
        let errors = host().validate(&Value::from("x")).unwrap_err();
        assert_eq!(errors.first().unwrap().message(), "expected mapping, got string");
    }

    #[test]
    fn test_field_accessors() {
        let field = Field::required("address", string());
        assert_eq!(field.name(), "address");
        assert!(field.is_required());
        assert!(!Field::optional("profile", string()).is_required());
    }
}
