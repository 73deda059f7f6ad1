//! Leaf rules.
//!
//! Every constructor here returns a [`Predicate`]: a named, immutable check
//! over a single value. Failure messages are stable and part of the public
//! contract.

use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::outcome::{Outcome, ViolationKind};
use crate::rule::{Depth, Rule};

type CheckFn = dyn Fn(&Value) -> Outcome + Send + Sync;

/// A leaf rule wrapping a total function `&Value -> Outcome`.
pub struct Predicate {
    name: String,
    check: Box<CheckFn>,
}

impl Predicate {
    /// Wrap a custom check. The closure must be side-effect free.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> Outcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Rule for Predicate {
    fn check(&self, value: &Value, _depth: Depth) -> Outcome {
        (self.check)(value)
    }
}

fn shape(message: &str) -> Outcome {
    Outcome::violation(ViolationKind::ShapeMismatch, message)
}

fn bound(message: String) -> Outcome {
    Outcome::violation(ViolationKind::Bound, message)
}

/// Accepts every value.
pub fn always() -> Predicate {
    Predicate::new("always", |_| Outcome::ok())
}

pub fn is_string() -> Predicate {
    Predicate::new("is_string", |value| match value {
        Value::String(_) => Outcome::ok(),
        _ => shape("Not a string"),
    })
}

pub fn is_integer() -> Predicate {
    Predicate::new("is_integer", |value| match as_integer(value) {
        Some(_) => Outcome::ok(),
        None => shape("Not an integer"),
    })
}

pub fn is_boolean() -> Predicate {
    Predicate::new("is_boolean", |value| match value {
        Value::Bool(_) => Outcome::ok(),
        _ => shape("Not a boolean"),
    })
}

pub fn is_array() -> Predicate {
    Predicate::new("is_array", |value| match value {
        Value::Array(_) => Outcome::ok(),
        _ => shape("Not an array"),
    })
}

pub fn is_object() -> Predicate {
    Predicate::new("is_object", |value| match value {
        Value::Object(_) => Outcome::ok(),
        _ => shape("Not an object"),
    })
}

pub fn non_empty_string() -> Predicate {
    Predicate::new("non_empty_string", |value| match value {
        Value::String(s) if s.is_empty() => bound("Empty string".to_string()),
        Value::String(_) => Outcome::ok(),
        _ => shape("Not a string"),
    })
}

/// Minimum length of a string (in UTF-8 bytes) or an array (in elements).
pub fn min_length(min: usize) -> Predicate {
    Predicate::new(format!("min_length({min})"), move |value| match value {
        Value::String(s) if s.len() < min => bound(format!("String length < {min}")),
        Value::Array(items) if items.len() < min => bound(format!("Array size < {min}")),
        Value::String(_) | Value::Array(_) => Outcome::ok(),
        _ => shape("Value has no length"),
    })
}

/// Maximum length of a string (in UTF-8 bytes) or an array (in elements).
pub fn max_length(max: usize) -> Predicate {
    Predicate::new(format!("max_length({max})"), move |value| match value {
        Value::String(s) if s.len() > max => bound(format!("String length > {max}")),
        Value::Array(items) if items.len() > max => bound(format!("Array size > {max}")),
        Value::String(_) | Value::Array(_) => Outcome::ok(),
        _ => shape("Value has no length"),
    })
}

pub fn min_integer(min: i64) -> Predicate {
    Predicate::new(format!("min_integer({min})"), move |value| {
        match as_integer(value) {
            None => shape("Not an integer"),
            Some(n) if n < i128::from(min) => bound(format!("Integer < {min}")),
            Some(_) => Outcome::ok(),
        }
    })
}

pub fn max_integer(max: i64) -> Predicate {
    Predicate::new(format!("max_integer({max})"), move |value| {
        match as_integer(value) {
            None => shape("Not an integer"),
            Some(n) if n > i128::from(max) => bound(format!("Integer > {max}")),
            Some(_) => Outcome::ok(),
        }
    })
}

/// Whole-string match against `pattern`.
///
/// The pattern is compiled once, anchored at both ends. A pattern that does
/// not compile yields a rule that fails every string with `Invalid regex`.
pub fn matches_regex(pattern: &str) -> Predicate {
    let compiled = Regex::new(&format!("^(?:{pattern})$")).map_err(|err| err.to_string());
    let pattern = pattern.to_string();
    Predicate::new(format!("matches_regex({pattern})"), move |value| {
        let Value::String(s) = value else {
            return shape("Not a string for regex");
        };
        match &compiled {
            Err(err) => Outcome::violation(ViolationKind::Pattern, format!("Invalid regex: {err}")),
            Ok(re) if re.is_match(s) => Outcome::ok(),
            Ok(_) => Outcome::violation(
                ViolationKind::Pattern,
                format!("Does not match regex: {pattern}"),
            ),
        }
    })
}

/// JSON integers, signed or unsigned. Floats never qualify.
fn as_integer(value: &Value) -> Option<i128> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}
