//! Untyped configuration values for prefab.
//!
//! Configuration documents are decoded into a [`Value`] tree before anything
//! is known about their structure. This crate provides that tree, its serde
//! integration, and a generic walker used to transform every node of a tree
//! (see [`walk`]).

mod convert;
mod value;
pub mod walk;

pub use convert::from_json_str;
pub use value::{Map, Set, Value};
pub use walk::{
    DEFAULT_MAX_DEPTH, ShapeDispatch, StrictKeysDispatch, WalkDispatch, WalkError, Walker,
    postwalk, prewalk,
};
