// Validation engine

use crate::error::{InstancePath, PathSegment, ValidationResult};
use prefab_value::Value;
use std::fmt;
use std::sync::Arc;

/// Something that can check (and normalize) a [`Value`].
///
/// On success the validator returns the value it accepted, possibly
/// transformed: mapping validators fill in defaults, `all_of` chains the
/// outputs of its members. On failure it returns every independent problem
/// it found.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value) -> ValidationResult<Value>;
}

/// Shared handle to a validator.
///
/// Cloning is cheap, so schemas can be built once and embedded in any
/// number of combinators.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<dyn Validator>,
    name: &'static str,
}

impl Schema {
    pub fn new<V: Validator + 'static>(name: &'static str, validator: V) -> Self {
        Self {
            inner: Arc::new(validator),
            name,
        }
    }

    /// Build a schema from a closure.
    pub fn from_fn<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&Value) -> ValidationResult<Value> + Send + Sync + 'static,
    {
        Self::new(name, FnValidator(f))
    }

    pub fn validate(&self, value: &Value) -> ValidationResult<Value> {
        self.inner.validate(value)
    }

    /// Short description used in `Debug` output.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Validator for Schema {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        self.inner.validate(value)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Schema").field(&self.name).finish()
    }
}

struct FnValidator<F>(F);

impl<F> Validator for FnValidator<F>
where
    F: Fn(&Value) -> ValidationResult<Value> + Send + Sync,
{
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        (self.0)(value)
    }
}

/// Whether `data` satisfies `schema`.
pub fn valid(schema: &Schema, data: &Value) -> bool {
    schema.validate(data).is_ok()
}

/// Describe why `data` fails `schema`.
///
/// Returns `None` when the data is valid, otherwise one line per collected
/// error in the form `<message> @ data<path>`.
pub fn explain(schema: &Schema, data: &Value) -> Option<String> {
    match schema.validate(data) {
        Ok(_) => None,
        Err(errors) => Some(errors.to_string()),
    }
}

/// Follow an instance path through a value tree.
///
/// Used when reporting errors to show the offending value. With `return_key`
/// set, the last segment resolves to the mapping key itself rather than its
/// value.
pub fn navigate<'a>(
    path: &InstancePath,
    value: &'a Value,
    return_key: bool,
    path_index: usize,
) -> Option<&'a Value> {
    // Base case: we've reached the end of the path
    if path_index >= path.segments().len() {
        return Some(value);
    }

    let segment = &path.segments()[path_index];
    let last = path_index == path.segments().len() - 1;

    match (value, segment) {
        (Value::Mapping(entries), PathSegment::Key(search_key)) => {
            let (key, target) = entries.get_key_value(search_key)?;
            if return_key && last {
                Some(key)
            } else {
                navigate(path, target, return_key, path_index + 1)
            }
        }
        (Value::Sequence(items), PathSegment::Index(index)) => {
            navigate(path, items.get(*index)?, return_key, path_index + 1)
        }
        (Value::Set(items), PathSegment::Index(index)) => {
            navigate(path, items.get_index(*index)?, return_key, path_index + 1)
        }
        _ => None,
    }
}

/// Render the value found at `path` for an error report, truncated to
/// `max_len` characters. With `return_key` set, a path ending in a mapping
/// key renders the key instead of its value.
pub fn offending_value(
    path: &InstancePath,
    data: &Value,
    return_key: bool,
    max_len: usize,
) -> Option<String> {
    let found = navigate(path, data, return_key, 0)?;
    let rendered = found.to_string();
    if rendered.chars().count() <= max_len {
        return Some(rendered);
    }
    let truncated: String = rendered.chars().take(max_len).collect();
    Some(format!("{}...", truncated))
}
