// Error types for schema validation

use prefab_value::Value;
use std::fmt;

/// Result type for validation operations.
///
/// Validators return the validated value (with defaults filled in) or every
/// failure they found.
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// The value's shape differs from what the validator expects
    TypeMismatch { expected: String, got: String },

    /// The shape matched but a constraint (range, length, predicate, literal) failed
    ConstraintViolation { message: String },

    /// Missing required property
    MissingRequiredProperty { property: String },

    /// A mapping key failed validation.
    ///
    /// Kept apart from value failures so that callers can report a bad key
    /// differently from a bad value. The key's own failure is the error's
    /// `cause`.
    KeyInvalid { key: Value },
}

impl ValidationErrorKind {
    /// Get the error code for this error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationErrorKind::TypeMismatch { .. } => "PF-1-1",
            ValidationErrorKind::ConstraintViolation { .. } => "PF-1-2",
            ValidationErrorKind::MissingRequiredProperty { .. } => "PF-1-3",
            ValidationErrorKind::KeyInvalid { .. } => "PF-1-4",
        }
    }

    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            ValidationErrorKind::TypeMismatch { expected, got } => {
                format!("expected {}, got {}", expected, got)
            }
            ValidationErrorKind::ConstraintViolation { message } => message.clone(),
            ValidationErrorKind::MissingRequiredProperty { property } => {
                format!("required key '{}' not provided", property)
            }
            ValidationErrorKind::KeyInvalid { key } => format!("invalid key {}", key),
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Where in the validated data the error occurred (e.g. `['hosts']['vm1']`)
    pub instance_path: InstancePath,
    /// Underlying failure, if this error wraps another one
    pub cause: Option<Box<ValidationError>>,
}

impl ValidationError {
    /// Create a new validation error at the root of the validated value.
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            kind,
            instance_path: InstancePath::new(),
            cause: None,
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, got: &Value) -> Self {
        Self::new(ValidationErrorKind::TypeMismatch {
            expected: expected.into(),
            got: got.type_name().to_string(),
        })
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::ConstraintViolation {
            message: message.into(),
        })
    }

    pub fn with_path(mut self, instance_path: InstancePath) -> Self {
        self.instance_path = instance_path;
        self
    }

    pub fn with_cause(mut self, cause: ValidationError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Human-readable message, including the cause chain.
    pub fn message(&self) -> String {
        match &self.cause {
            Some(cause) => format!("{} ({})", self.kind.message(), cause.message()),
            None => self.kind.message(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn is_key_error(&self) -> bool {
        matches!(self.kind, ValidationErrorKind::KeyInvalid { .. })
    }

    /// Prepend a segment to this error's path (used while unwinding out of
    /// a container).
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.instance_path.prepend(segment);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ data{}", self.message(), self.instance_path)
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Aggregate of independent validation failures.
///
/// Combinators collect every failure in their scope into one of these rather
/// than stopping at the first. A validator never returns an empty aggregate
/// as an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Prepend `segment` to the path of every contained error.
    pub fn prefixed(self, segment: PathSegment) -> Self {
        Self {
            errors: self
                .errors
                .into_iter()
                .map(|e| e.prefixed(segment.clone()))
                .collect(),
        }
    }

    /// Length of the deepest error path, used to rank alternatives.
    pub fn max_depth(&self) -> usize {
        self.errors
            .iter()
            .map(|e| e.instance_path.len())
            .max()
            .unwrap_or(0)
    }

    /// `Ok(value)` if nothing was collected, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> ValidationResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Instance path (e.g., `['hosts']['vm1']['keys'][0]`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push_key(&mut self, key: impl Into<Value>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl FromIterator<PathSegment> for InstancePath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key (any value; configuration keys are usually strings)
    Key(Value),
    /// Sequence index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(Value::String(key)) => write!(f, "['{}']", key),
            PathSegment::Key(key) => write!(f, "[{}]", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}
