use serde_json::Value;

use crate::outcome::{Outcome, ViolationKind};
use crate::rule::{BoxedRule, Depth, Rule};

/// Logical AND over an ordered list of rules.
///
/// Children run in declaration order and the first failure is returned as-is.
/// Path prefixing is left to the container that owns the field name.
#[derive(Debug)]
pub struct Conjunction {
    rules: Vec<BoxedRule>,
}

impl Conjunction {
    pub fn new(rules: Vec<BoxedRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[BoxedRule] {
        &self.rules
    }
}

impl Rule for Conjunction {
    fn check(&self, value: &Value, depth: Depth) -> Outcome {
        for rule in &self.rules {
            let outcome = rule.check(value, depth);
            if outcome.is_failure() {
                return outcome;
            }
        }
        Outcome::ok()
    }
}

/// Logical OR over an ordered list of rules.
///
/// Stops at the first child that succeeds. When every child fails, the result
/// is one aggregate failure whose message lists each child message in order;
/// the individual failures stay reachable through [`Outcome::causes`].
#[derive(Debug)]
pub struct Disjunction {
    rules: Vec<BoxedRule>,
}

impl Disjunction {
    pub fn new(rules: Vec<BoxedRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[BoxedRule] {
        &self.rules
    }
}

impl Rule for Disjunction {
    fn check(&self, value: &Value, depth: Depth) -> Outcome {
        let mut failures = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let outcome = rule.check(value, depth);
            if outcome.is_success() {
                return outcome;
            }
            failures.push(outcome);
        }

        let messages: Vec<&str> = failures.iter().map(Outcome::message).collect();
        let message = format!("None matched. Errors: {}", messages.join("; "));
        Outcome::violation(ViolationKind::Aggregate, message).with_causes(failures)
    }
}
