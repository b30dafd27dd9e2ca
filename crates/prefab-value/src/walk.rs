//! Generic traversal of [`Value`] trees.
//!
//! Two traversal orders are offered:
//!
//! - [`Walker::prewalk`] applies the transform to a node *before* descending
//!   into the (transformed) node's children.
//! - [`Walker::postwalk`] descends first, rebuilds the node from its
//!   transformed children and applies the transform last.
//!
//! How a node is taken apart and rebuilt is decided by a [`WalkDispatch`]
//! implementation. [`ShapeDispatch`] handles the built-in shapes (sequence,
//! set, mapping, leaf); callers that need different recombination rules pass
//! their own dispatcher through [`Walker::with_dispatch`].
//! [`StrictKeysDispatch`] is the variant for transforms that must not merge
//! mapping entries.
//!
//! Recursion depth equals tree depth. Walkers carry a maximum depth and fail
//! with [`WalkError::DepthExceeded`] instead of exhausting the stack.

use crate::value::{Map, Set, Value};
use thiserror::Error;

/// Default maximum nesting depth accepted by a [`Walker`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Errors raised by the walker itself (as opposed to the transform).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("value nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    /// Two keys of one mapping were rewritten to the same key.
    #[error("mapping keys {first} and {second} both become {key}")]
    KeyCollision {
        key: Value,
        first: Value,
        second: Value,
    },
}

/// Decides how a node is split into children and put back together.
///
/// `walk` receives a node whose own transform (if any) has already been
/// handled by the walker and must return the node rebuilt from
/// `inner(child)` for each child. Leaves are returned as-is.
pub trait WalkDispatch {
    fn walk<E: From<WalkError>>(
        &self,
        node: Value,
        inner: &mut dyn FnMut(Value) -> Result<Value, E>,
    ) -> Result<Value, E>;
}

/// Default dispatcher over the built-in value shapes.
///
/// Mapping keys are walked as well as values. Sets are rebuilt from the
/// transformed elements, so elements that become equal collapse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeDispatch;

impl WalkDispatch for ShapeDispatch {
    fn walk<E: From<WalkError>>(
        &self,
        node: Value,
        inner: &mut dyn FnMut(Value) -> Result<Value, E>,
    ) -> Result<Value, E> {
        match node {
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| inner(item))
                .collect::<Result<Vec<_>, E>>()
                .map(Value::Sequence),
            Value::Set(items) => items
                .into_iter()
                .map(|item| inner(item))
                .collect::<Result<Set, E>>()
                .map(Value::Set),
            Value::Mapping(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((inner(k)?, inner(v)?)))
                .collect::<Result<Map, E>>()
                .map(Value::Mapping),
            leaf => Ok(leaf),
        }
    }
}

/// Like [`ShapeDispatch`], but a mapping whose rebuilt keys collide fails
/// with [`WalkError::KeyCollision`] instead of keeping the last entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictKeysDispatch;

impl WalkDispatch for StrictKeysDispatch {
    fn walk<E: From<WalkError>>(
        &self,
        node: Value,
        inner: &mut dyn FnMut(Value) -> Result<Value, E>,
    ) -> Result<Value, E> {
        let Value::Mapping(entries) = node else {
            return ShapeDispatch.walk(node, inner);
        };

        let mut rebuilt = Map::with_capacity(entries.len());
        // Original key of each rebuilt entry, by position.
        let mut sources: Vec<Value> = Vec::with_capacity(entries.len());
        for (k, v) in entries {
            let key = inner(k.clone())?;
            if let Some(index) = rebuilt.get_index_of(&key) {
                return Err(WalkError::KeyCollision {
                    key,
                    first: sources.swap_remove(index),
                    second: k,
                }
                .into());
            }
            let value = inner(v)?;
            rebuilt.insert(key, value);
            sources.push(k);
        }
        Ok(Value::Mapping(rebuilt))
    }
}

/// Configurable tree walker.
#[derive(Debug, Clone)]
pub struct Walker<D = ShapeDispatch> {
    dispatch: D,
    max_depth: usize,
}

impl Walker<ShapeDispatch> {
    pub fn new() -> Self {
        Walker {
            dispatch: ShapeDispatch,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for Walker<ShapeDispatch> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: WalkDispatch> Walker<D> {
    /// Replace the dispatcher, keeping the depth limit.
    pub fn with_dispatch<D2: WalkDispatch>(self, dispatch: D2) -> Walker<D2> {
        Walker {
            dispatch,
            max_depth: self.max_depth,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Pre-order walk with an infallible transform.
    pub fn prewalk<F>(&self, mut f: F, node: Value) -> Result<Value, WalkError>
    where
        F: FnMut(Value) -> Value,
    {
        self.try_prewalk(|v| Ok::<_, WalkError>(f(v)), node)
    }

    /// Post-order walk with an infallible transform.
    pub fn postwalk<F>(&self, mut f: F, node: Value) -> Result<Value, WalkError>
    where
        F: FnMut(Value) -> Value,
    {
        self.try_postwalk(|v| Ok::<_, WalkError>(f(v)), node)
    }

    /// Pre-order walk with a fallible transform.
    ///
    /// The first error returned by `f` aborts the walk.
    pub fn try_prewalk<F, E>(&self, mut f: F, node: Value) -> Result<Value, E>
    where
        F: FnMut(Value) -> Result<Value, E>,
        E: From<WalkError>,
    {
        self.pre(&mut f, node, 0)
    }

    /// Post-order walk with a fallible transform.
    pub fn try_postwalk<F, E>(&self, mut f: F, node: Value) -> Result<Value, E>
    where
        F: FnMut(Value) -> Result<Value, E>,
        E: From<WalkError>,
    {
        self.post(&mut f, node, 0)
    }

    fn pre<F, E>(&self, f: &mut F, node: Value, depth: usize) -> Result<Value, E>
    where
        F: FnMut(Value) -> Result<Value, E>,
        E: From<WalkError>,
    {
        self.check_depth(depth)?;
        let node = f(node)?;
        self.dispatch
            .walk(node, &mut |child| self.pre(f, child, depth + 1))
    }

    fn post<F, E>(&self, f: &mut F, node: Value, depth: usize) -> Result<Value, E>
    where
        F: FnMut(Value) -> Result<Value, E>,
        E: From<WalkError>,
    {
        self.check_depth(depth)?;
        let node = self
            .dispatch
            .walk(node, &mut |child| self.post(f, child, depth + 1))?;
        f(node)
    }

    fn check_depth(&self, depth: usize) -> Result<(), WalkError> {
        if depth > self.max_depth {
            return Err(WalkError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }
}

/// Pre-order walk using the default walker.
pub fn prewalk<F>(f: F, node: Value) -> Result<Value, WalkError>
where
    F: FnMut(Value) -> Value,
{
    Walker::new().prewalk(f, node)
}

/// Post-order walk using the default walker.
pub fn postwalk<F>(f: F, node: Value) -> Result<Value, WalkError>
where
    F: FnMut(Value) -> Value,
{
    Walker::new().postwalk(f, node)
}
