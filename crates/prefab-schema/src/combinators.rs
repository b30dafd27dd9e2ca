//! Schema combinators.
//!
//! Every combinator collects all independent failures in its scope instead
//! of stopping at the first, and adds path context while unwinding: element
//! indices for sequences, keys for mapping values. Key failures are kept
//! distinct from value failures via [`ValidationErrorKind::KeyInvalid`].

use crate::error::{PathSegment, ValidationError, ValidationErrorKind, ValidationErrors};
use crate::validator::Schema;
use prefab_value::{Map, Value};

/// Sequence whose every element satisfies `element`.
pub fn seq_of(element: Schema) -> Schema {
    Schema::from_fn("seq_of", move |value| {
        let Value::Sequence(items) = value else {
            return Err(ValidationError::type_mismatch("sequence", value).into());
        };

        let mut errors = ValidationErrors::new();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match element.validate(item) {
                Ok(validated) => out.push(validated),
                Err(e) => errors.extend(e.prefixed(PathSegment::Index(index))),
            }
        }
        errors.into_result(Value::Sequence(out))
    })
}

/// Mapping whose every key satisfies `key` and every value satisfies `value`.
pub fn dict_of(key: Schema, value: Schema) -> Schema {
    Schema::from_fn("dict_of", move |data| {
        let Value::Mapping(entries) = data else {
            return Err(ValidationError::type_mismatch("dict", data).into());
        };

        let mut errors = ValidationErrors::new();
        let mut out = Map::with_capacity(entries.len());
        for (k, v) in entries {
            let validated_key = match key.validate(k) {
                Ok(validated) => Some(validated),
                Err(key_errors) => {
                    for cause in key_errors {
                        errors.push(
                            ValidationError::new(ValidationErrorKind::KeyInvalid { key: k.clone() })
                                .with_cause(cause)
                                .prefixed(PathSegment::Key(k.clone())),
                        );
                    }
                    None
                }
            };
            match value.validate(v) {
                Ok(validated) => {
                    if let Some(validated_key) = validated_key {
                        out.insert(validated_key, validated);
                    }
                }
                Err(e) => errors.extend(e.prefixed(PathSegment::Key(k.clone()))),
            }
        }
        errors.into_result(Value::Mapping(out))
    })
}

/// Requires at least one element (or character) before applying `inner`.
pub fn non_empty(inner: Schema) -> Schema {
    Schema::from_fn("non_empty", move |value| {
        if value.len() == Some(0) {
            return Err(ValidationError::constraint("length of value must be at least 1").into());
        }
        inner.validate(value)
    })
}

/// Constraint given by a plain predicate.
///
/// Without an explicit message the failure reads
/// `predicate '<function name>' failed`.
pub fn pred<F>(f: F, message: Option<&str>) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    let message = match message {
        Some(m) => m.to_string(),
        None => format!("predicate '{}' failed", short_type_name::<F>()),
    };
    Schema::from_fn("pred", move |value| {
        if f(value) {
            Ok(value.clone())
        } else {
            Err(ValidationError::constraint(message.clone()).into())
        }
    })
}

/// The first alternative that accepts the value wins.
///
/// When all fail, the errors of the alternative that got furthest into the
/// value (deepest error path) are reported. At equal depth the alternative
/// with fewer errors is the closer match; remaining ties go to the earlier
/// one.
pub fn any_of(alternatives: Vec<Schema>) -> Schema {
    Schema::from_fn("any_of", move |value| {
        let mut best: Option<ValidationErrors> = None;
        for alternative in &alternatives {
            match alternative.validate(value) {
                Ok(validated) => return Ok(validated),
                Err(errors) => {
                    let closer = best.as_ref().is_none_or(|b| {
                        (errors.max_depth(), std::cmp::Reverse(errors.len()))
                            > (b.max_depth(), std::cmp::Reverse(b.len()))
                    });
                    if closer {
                        best = Some(errors);
                    }
                }
            }
        }
        Err(best.unwrap_or_else(|| {
            ValidationError::constraint("no alternative to validate against").into()
        }))
    })
}

/// Every member must accept the value; each one validates the output of
/// the previous.
pub fn all_of(members: Vec<Schema>) -> Schema {
    Schema::from_fn("all_of", move |value| {
        let mut current = value.clone();
        for member in &members {
            current = member.validate(&current)?;
        }
        Ok(current)
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Strip generic arguments before taking the last path component.
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
