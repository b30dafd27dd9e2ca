//! Schema validation for prefab configuration values.
//!
//! Schemas are values of type [`Schema`], built from primitives
//! ([`string`], [`range`], ...) and combinators ([`seq_of`], [`dict_of`],
//! [`mapping`], ...). Validation returns the accepted value with defaults
//! filled in, or a [`ValidationErrors`] aggregate with one entry per
//! independent failure.
//!
//! ```
//! use prefab_schema::{Field, explain, integer, mapping, string};
//! use prefab_value::from_json_str;
//!
//! let schema = mapping(vec![
//!     Field::required("address", string()),
//!     Field::with_default("port", integer(), 22),
//! ]);
//! let data = from_json_str(r#"{"port": "x"}"#).unwrap();
//!
//! let report = explain(&schema, &data).unwrap();
//! assert_eq!(report.lines().count(), 2);
//! ```

pub mod combinators;
mod diagnostic;
pub mod error;
pub mod mapping;
pub mod primitives;
pub mod validator;

pub use combinators::{all_of, any_of, dict_of, non_empty, pred, seq_of};
pub use error::{
    InstancePath, PathSegment, ValidationError, ValidationErrorKind, ValidationErrors,
    ValidationResult,
};
pub use mapping::{Field, mapping};
pub use primitives::{any, boolean, integer, literal, one_of_literals, range, scalar, string};
pub use validator::{Schema, Validator, explain, navigate, offending_value, valid};
