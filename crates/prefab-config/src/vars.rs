//! Variable environment and placeholder expansion.
//!
//! String values in the configuration may contain `{name}` placeholders.
//! Names resolve against a [`VarEnv`] built from the process environment:
//! every variable starting with the configured prefix contributes an entry
//! (prefix stripped, lower-cased), plus the implicit `cwd` and `home`.
//! `{{` and `}}` stand for literal braces.

use crate::error::ConfigError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use prefab_value::{StrictKeysDispatch, Value, Walker};
use regex::Regex;
use thiserror::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").expect("placeholder pattern is valid")
});

/// Substitution variables for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarEnv {
    prefix: String,
    vars: IndexMap<String, String>,
    /// Derived names of prefixed variables replaced by `cwd` or `home`.
    shadowed: Vec<String>,
}

impl VarEnv {
    /// Build the environment from a snapshot of `(name, value)` pairs.
    ///
    /// `home` is taken from `HOME`, falling back to `USERPROFILE`; it stays
    /// undefined when neither is present. The implicit `cwd` and `home`
    /// replace any prefixed variable of the same derived name.
    pub fn new<I, K, V>(snapshot: I, prefix: &str, cwd: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut vars = IndexMap::new();
        let mut home = None;
        let mut user_profile = None;

        for (name, value) in snapshot {
            let name = name.as_ref();
            let value: String = value.into();
            match name {
                "HOME" => home = Some(value.clone()),
                "USERPROFILE" => user_profile = Some(value.clone()),
                _ => {}
            }
            if let Some(stripped) = name.strip_prefix(prefix) {
                vars.insert(stripped.to_lowercase(), value);
            }
        }

        let mut shadowed = Vec::new();
        let mut implicit = vec![("cwd", cwd.into())];
        if let Some(home) = home.or(user_profile) {
            implicit.push(("home", home));
        }
        for (name, value) in implicit {
            if vars.insert(name.to_string(), value).is_some() {
                shadowed.push(name.to_string());
            }
        }

        Self {
            prefix: prefix.to_string(),
            vars,
            shadowed,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Prefixed variables that were ignored because an implicit variable
    /// has the same name.
    pub fn shadowed(&self) -> impl Iterator<Item = &str> {
        self.shadowed.iter().map(String::as_str)
    }

    /// Substitute every placeholder in `text`.
    pub fn expand_str(&self, text: &str) -> Result<String, VarExpansionError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            self.check_literal(text, last, whole.start())?;
            out.push_str(&text[last..whole.start()]);

            match caps.get(1) {
                // `{{` or `}}`
                None => out.push_str(&whole.as_str()[..1]),
                Some(name) => match self.vars.get(name.as_str()) {
                    Some(value) => out.push_str(value),
                    None => return Err(self.unbound(name.as_str(), text)),
                },
            }
            last = whole.end();
        }

        self.check_literal(text, last, text.len())?;
        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Literal stretches between placeholders must not contain a brace.
    fn check_literal(&self, text: &str, start: usize, end: usize) -> Result<(), VarExpansionError> {
        match text[start..end].find(['{', '}']) {
            Some(offset) => Err(self.unbound(&text[start + offset..], text)),
            None => Ok(()),
        }
    }

    fn unbound(&self, varname: &str, text: &str) -> VarExpansionError {
        VarExpansionError {
            varname: varname.to_string(),
            value: text.to_string(),
            env: self.clone(),
        }
    }
}

/// A string referenced a variable that is not defined, or contained a
/// placeholder that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("configuration refers to unbound variable '{varname}'")]
pub struct VarExpansionError {
    /// The placeholder name (or unparseable placeholder text).
    pub varname: String,
    /// The original string containing the placeholder.
    pub value: String,
    /// The environment the expansion ran against.
    pub env: VarEnv,
}

/// Expand placeholders in every string of `conf`, mapping keys included.
///
/// The first unbound variable stops the walk. Two keys of one mapping that
/// expand to the same string fail with
/// [`WalkError::KeyCollision`](prefab_value::WalkError::KeyCollision) rather
/// than dropping an entry.
pub fn expand_vars(conf: Value, env: &VarEnv, walker: &Walker) -> Result<Value, ConfigError> {
    walker.clone().with_dispatch(StrictKeysDispatch).try_prewalk(
        |node| match node {
            Value::String(text) => Ok(Value::String(env.expand_str(&text)?)),
            other => Ok(other),
        },
        conf,
    )
}
