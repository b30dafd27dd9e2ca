//! Leaf validators.

use crate::error::ValidationError;
use crate::validator::Schema;
use prefab_value::Value;

/// Accepts any value unchanged.
pub fn any() -> Schema {
    Schema::from_fn("any", |value| Ok(value.clone()))
}

pub fn string() -> Schema {
    Schema::from_fn("string", |value| match value {
        Value::String(_) => Ok(value.clone()),
        other => Err(ValidationError::type_mismatch("string", other).into()),
    })
}

pub fn integer() -> Schema {
    Schema::from_fn("integer", |value| match value {
        Value::Integer(_) => Ok(value.clone()),
        other => Err(ValidationError::type_mismatch("integer", other).into()),
    })
}

pub fn boolean() -> Schema {
    Schema::from_fn("boolean", |value| match value {
        Value::Bool(_) => Ok(value.clone()),
        other => Err(ValidationError::type_mismatch("boolean", other).into()),
    })
}

/// Any non-container value, including null.
pub fn scalar() -> Schema {
    Schema::from_fn("scalar", |value| {
        if value.is_scalar() {
            Ok(value.clone())
        } else {
            Err(ValidationError::type_mismatch("scalar", value).into())
        }
    })
}

/// Exactly `expected`.
pub fn literal(expected: impl Into<Value>) -> Schema {
    let expected = expected.into();
    Schema::from_fn("literal", move |value| {
        if *value == expected {
            Ok(value.clone())
        } else {
            Err(ValidationError::constraint(format!("not a valid value, expected {}", expected)).into())
        }
    })
}

/// One of a fixed set of values.
pub fn one_of_literals<I, V>(allowed: I) -> Schema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    Schema::from_fn("one_of_literals", move |value| {
        if allowed.contains(value) {
            return Ok(value.clone());
        }
        let choices: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
        Err(ValidationError::constraint(format!(
            "value must be one of {}",
            choices.join(", ")
        ))
        .into())
    })
}

/// Integer in the inclusive range `min..=max`.
pub fn range(min: i64, max: i64) -> Schema {
    Schema::from_fn("range", move |value| match value.as_i64() {
        Some(n) if (min..=max).contains(&n) => Ok(value.clone()),
        Some(n) => Err(ValidationError::constraint(format!(
            "value {} must be between {} and {}",
            n, min, max
        ))
        .into()),
        None => Err(ValidationError::type_mismatch("integer", value).into()),
    })
}
