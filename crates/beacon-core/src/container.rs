use std::collections::BTreeMap;

use serde_json::Value;

use crate::outcome::{index_segment, Outcome, ViolationKind};
use crate::rule::{BoxedRule, Depth, Rule};

/// Validates an object against a nested set of field rules.
///
/// Required names are checked first, in declaration order. Field rules then
/// run in lexicographic order of field name; absent fields are skipped.
#[derive(Debug)]
pub struct ObjectRule {
    fields: BTreeMap<String, BoxedRule>,
    required: Vec<String>,
}

impl ObjectRule {
    pub fn new<I, K>(fields: I, required: Vec<String>) -> Self
    where
        I: IntoIterator<Item = (K, BoxedRule)>,
        K: Into<String>,
    {
        let mut seen = Vec::with_capacity(required.len());
        for name in required {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        Self {
            fields: fields
                .into_iter()
                .map(|(name, rule)| (name.into(), rule))
                .collect(),
            required: seen,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &BoxedRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }
}

impl Rule for ObjectRule {
    fn check(&self, value: &Value, depth: Depth) -> Outcome {
        let Value::Object(map) = value else {
            return Outcome::violation(ViolationKind::ShapeMismatch, "Not an object");
        };

        for name in &self.required {
            if !map.contains_key(name) {
                return Outcome::violation(ViolationKind::Presence, "Required field not found");
            }
        }

        if self.fields.is_empty() {
            return Outcome::ok();
        }
        let Some(inner) = depth.descend() else {
            return depth.exceeded();
        };

        for (name, rule) in &self.fields {
            let Some(field) = map.get(name) else {
                continue;
            };
            let outcome = rule.check(field, inner);
            if outcome.is_failure() {
                return outcome.with_prefix(name);
            }
        }
        Outcome::ok()
    }
}

/// Validates every element of an array against one rule, with optional
/// inclusive bounds on the element count.
#[derive(Debug)]
pub struct ArrayRule {
    element: BoxedRule,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl ArrayRule {
    pub fn new(element: BoxedRule) -> Self {
        Self {
            element,
            min_items: None,
            max_items: None,
        }
    }

    pub fn with_bounds(element: BoxedRule, min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            element,
            min_items: min,
            max_items: max,
        }
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn element(&self) -> &BoxedRule {
        &self.element
    }

    pub fn bounds(&self) -> (Option<usize>, Option<usize>) {
        (self.min_items, self.max_items)
    }
}

impl Rule for ArrayRule {
    fn check(&self, value: &Value, depth: Depth) -> Outcome {
        let Value::Array(items) = value else {
            return Outcome::violation(ViolationKind::ShapeMismatch, "Not an array");
        };

        let size = items.len();
        if let Some(min) = self.min_items {
            if size < min {
                return Outcome::violation(ViolationKind::Bound, format!("Array size < {min}"));
            }
        }
        if let Some(max) = self.max_items {
            if size > max {
                return Outcome::violation(ViolationKind::Bound, format!("Array size > {max}"));
            }
        }

        if items.is_empty() {
            return Outcome::ok();
        }
        let Some(inner) = depth.descend() else {
            return depth.exceeded();
        };

        for (index, item) in items.iter().enumerate() {
            let outcome = self.element.check(item, inner);
            if outcome.is_failure() {
                return outcome.with_prefix(&index_segment(index));
            }
        }
        Outcome::ok()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::combinator::Conjunction;
    use crate::predicate::{is_integer, is_string, min_integer, non_empty_string};

    fn user_rule() -> ObjectRule {
        ObjectRule::new(
            [
                ("name", non_empty_string().boxed()),
                ("age", min_integer(0).boxed()),
            ],
            vec!["name".to_string()],
        )
    }

    #[test]
    fn object_rejects_non_objects() {
        let outcome = user_rule().evaluate(&json!([1]));
        assert_eq!(outcome.message(), "Not an object");
        assert_eq!(outcome.kind(), Some(ViolationKind::ShapeMismatch));
    }

    #[test]
    fn object_checks_required_before_field_rules() {
        // "age" is invalid too, but the missing required field wins.
        let outcome = user_rule().evaluate(&json!({"age": -1}));
        assert_eq!(outcome.message(), "Required field not found");
        assert_eq!(outcome.kind(), Some(ViolationKind::Presence));
        assert_eq!(outcome.path(), "");
    }

    #[test]
    fn object_skips_absent_optional_fields() {
        assert!(user_rule().evaluate(&json!({"name": "ada"})).is_success());
    }

    #[test]
    fn object_prefixes_field_failures() {
        let outcome = user_rule().evaluate(&json!({"name": "ada", "age": -3}));
        assert_eq!(outcome.path(), "age");
        assert_eq!(outcome.message(), "Integer < 0");
    }

    #[test]
    fn object_ignores_unknown_fields() {
        let outcome = user_rule().evaluate(&json!({"name": "ada", "extra": [1, 2]}));
        assert!(outcome.is_success());
    }

    #[test]
    fn object_dedupes_required_names() {
        let rule = ObjectRule::new(Vec::<(String, BoxedRule)>::new(), vec!["a".into(), "a".into()]);
        assert_eq!(rule.required(), ["a".to_string()]);
    }

    #[test]
    fn array_rejects_non_arrays() {
        let rule = ArrayRule::new(is_integer().boxed());
        assert_eq!(rule.evaluate(&json!({})).message(), "Not an array");
    }

    #[test]
    fn array_reports_failing_index() {
        let rule = ArrayRule::new(
            Conjunction::new(vec![is_integer().boxed(), min_integer(0).boxed()]).boxed(),
        );
        let outcome = rule.evaluate(&json!([1, 2, -1]));
        assert_eq!(outcome.path(), "[2]");
        assert_eq!(outcome.message(), "Integer < 0");
    }

    #[test]
    fn array_enforces_bounds_before_elements() {
        let rule = ArrayRule::new(is_string().boxed()).min_items(2).max_items(3);
        assert_eq!(rule.evaluate(&json!([1])).message(), "Array size < 2");
        assert_eq!(
            rule.evaluate(&json!(["a", "b", "c", "d"])).message(),
            "Array size > 3"
        );
        assert!(rule.evaluate(&json!(["a", "b"])).is_success());
        assert_eq!(rule.bounds(), (Some(2), Some(3)));
    }

    #[test]
    fn nested_paths_compose() {
        let address = ObjectRule::new([("city", is_string().boxed())], Vec::new());
        let user = ObjectRule::new(
            [("addresses", ArrayRule::new(address.boxed()).boxed())],
            Vec::new(),
        );
        let outcome = user.evaluate(&json!({
            "addresses": [{"city": "Lisbon"}, {"city": 7}]
        }));
        assert_eq!(outcome.path(), "addresses[1].city");
    }

    #[test]
    fn depth_budget_is_enforced() {
        let inner = ArrayRule::new(is_integer().boxed()).boxed();
        let rule = ArrayRule::new(ArrayRule::new(inner).boxed());
        let value = json!([[[1]]]);
        assert!(rule.check(&value, Depth::new(3)).is_success());

        let outcome = rule.check(&value, Depth::new(2));
        assert_eq!(outcome.kind(), Some(ViolationKind::DepthExceeded));
        assert_eq!(outcome.path(), "[0][0]");
    }
}
