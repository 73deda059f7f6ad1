use std::fmt;

use serde_json::Value;

use crate::outcome::{Outcome, ViolationKind};

/// Default number of container levels a validation may descend through.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Owned, type-erased rule. Rule trees are built from these.
pub type BoxedRule = Box<dyn Rule>;

/// Remaining nesting budget for a single evaluation.
///
/// Containers call [`Depth::descend`] before evaluating their children, so
/// recursion depth is bounded by the budget rather than by the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    level: usize,
    limit: usize,
}

impl Depth {
    /// A fresh budget allowing `limit` container levels.
    pub fn new(limit: usize) -> Self {
        Self { level: 0, limit }
    }

    pub fn level(self) -> usize {
        self.level
    }

    pub fn limit(self) -> usize {
        self.limit
    }

    /// The budget one level down, or `None` once it is spent.
    pub fn descend(self) -> Option<Self> {
        if self.level >= self.limit {
            return None;
        }
        Some(Self {
            level: self.level + 1,
            limit: self.limit,
        })
    }

    pub(crate) fn exceeded(self) -> Outcome {
        tracing::trace!(limit = self.limit, "validation depth budget exhausted");
        Outcome::violation(
            ViolationKind::DepthExceeded,
            format!("Maximum nesting depth of {} exceeded", self.limit),
        )
    }
}

impl Default for Depth {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// A unit of validation.
///
/// Implementations must be deterministic and side-effect free: the same value
/// and rule tree always produce the same [`Outcome`]. Violations are returned,
/// never raised. Rules are immutable once built and may be evaluated from many
/// threads at once.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Evaluate `value` within the given nesting budget.
    fn check(&self, value: &Value, depth: Depth) -> Outcome;

    /// Evaluate `value` with the default nesting budget.
    fn evaluate(&self, value: &Value) -> Outcome {
        self.check(value, Depth::default())
    }

    fn boxed(self) -> BoxedRule
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descend_stops_at_limit() {
        let depth = Depth::new(2);
        let one = depth.descend().unwrap();
        let two = one.descend().unwrap();
        assert_eq!(two.level(), 2);
        assert!(two.descend().is_none());
    }

    #[test]
    fn zero_limit_never_descends() {
        assert!(Depth::new(0).descend().is_none());
    }

    #[test]
    fn exceeded_names_the_limit() {
        let outcome = Depth::new(7).exceeded();
        assert_eq!(outcome.kind(), Some(ViolationKind::DepthExceeded));
        assert_eq!(outcome.message(), "Maximum nesting depth of 7 exceeded");
    }
}
