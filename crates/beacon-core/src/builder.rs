use crate::combinator::{Conjunction, Disjunction};
use crate::container::{ArrayRule, ObjectRule};
use crate::predicate;
use crate::rule::{BoxedRule, Rule};
use crate::schema::{Requirement, Schema};

/// Accumulates the rules of one field.
///
/// The builder owns the schema it was started from and hands it back from
/// [`FieldBuilder::done`], so fields chain without borrowing:
///
/// ```
/// use beacon_core::Schema;
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .field("id").is_integer().min_integer(1).done()
///     .field("tag").optional().is_string().done();
///
/// assert!(schema.validate(&json!({"id": 7})).is_success());
/// ```
#[must_use = "a field is only added to the schema by calling `done()`"]
pub struct FieldBuilder {
    schema: Schema,
    name: String,
    requirement: Requirement,
    rules: Vec<BoxedRule>,
}

impl FieldBuilder {
    pub(crate) fn new(schema: Schema, name: String, requirement: Requirement) -> Self {
        Self {
            schema,
            name,
            requirement,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    /// Attach an arbitrary rule.
    pub fn rule(mut self, rule: BoxedRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn is_string(self) -> Self {
        self.rule(predicate::is_string().boxed())
    }

    pub fn non_empty_string(self) -> Self {
        self.rule(predicate::non_empty_string().boxed())
    }

    pub fn is_integer(self) -> Self {
        self.rule(predicate::is_integer().boxed())
    }

    pub fn is_boolean(self) -> Self {
        self.rule(predicate::is_boolean().boxed())
    }

    pub fn is_array(self) -> Self {
        self.rule(predicate::is_array().boxed())
    }

    pub fn is_object(self) -> Self {
        self.rule(predicate::is_object().boxed())
    }

    pub fn min_length(self, min: usize) -> Self {
        self.rule(predicate::min_length(min).boxed())
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(predicate::max_length(max).boxed())
    }

    pub fn min_integer(self, min: i64) -> Self {
        self.rule(predicate::min_integer(min).boxed())
    }

    pub fn max_integer(self, max: i64) -> Self {
        self.rule(predicate::max_integer(max).boxed())
    }

    pub fn matches_regex(self, pattern: &str) -> Self {
        self.rule(predicate::matches_regex(pattern).boxed())
    }

    /// Passes when any of `rules` passes.
    pub fn any_of(self, rules: Vec<BoxedRule>) -> Self {
        self.rule(Disjunction::new(rules).boxed())
    }

    /// Passes when all of `rules` pass.
    pub fn all_of(self, rules: Vec<BoxedRule>) -> Self {
        self.rule(Conjunction::new(rules).boxed())
    }

    /// Nested object with its own field rules and required names.
    pub fn object<I, K>(self, fields: I, required: Vec<String>) -> Self
    where
        I: IntoIterator<Item = (K, BoxedRule)>,
        K: Into<String>,
    {
        self.rule(ObjectRule::new(fields, required).boxed())
    }

    /// Array whose elements all satisfy `element`.
    pub fn array_of(self, element: BoxedRule, min: Option<usize>, max: Option<usize>) -> Self {
        self.rule(ArrayRule::with_bounds(element, min, max).boxed())
    }

    /// Finish the field and return the schema.
    ///
    /// No rules installs an always-passing rule, one rule is installed as-is,
    /// and several are combined with AND in declaration order.
    pub fn done(self) -> Schema {
        let FieldBuilder {
            mut schema,
            name,
            requirement,
            mut rules,
        } = self;

        let rule = match rules.len() {
            0 => predicate::always().boxed(),
            1 => rules.remove(0),
            _ => Conjunction::new(rules).boxed(),
        };
        schema.insert(name, rule, requirement);
        schema
    }
}
