use std::collections::BTreeMap;

use serde_json::Value;

use crate::builder::FieldBuilder;
use crate::outcome::{Outcome, ViolationKind};
use crate::rule::{BoxedRule, Depth, DEFAULT_MAX_DEPTH};

/// Presence policy of a top-level field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    #[default]
    Required,
    Optional,
}

impl Requirement {
    pub fn is_required(self) -> bool {
        self == Requirement::Required
    }
}

/// Controls schema evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Maximum number of container levels a document may nest.
    pub max_depth: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A field's finished rule and its presence policy.
#[derive(Debug)]
pub struct FieldEntry {
    rule: BoxedRule,
    requirement: Requirement,
}

impl FieldEntry {
    pub fn rule(&self) -> &BoxedRule {
        &self.rule
    }

    pub fn requirement(&self) -> Requirement {
        self.requirement
    }
}

/// Named collection of field rules, validated against whole documents.
///
/// Built field by field through [`Schema::field`]; immutable once handed out.
/// Fields are visited in lexicographic order, so when several fields are
/// invalid the reported one is stable across runs.
#[derive(Debug, Default)]
pub struct Schema {
    fields: BTreeMap<String, FieldEntry>,
    config: SchemaConfig,
}

impl Schema {
    /// Create an empty schema with default config.
    pub fn new() -> Self {
        Self::with_config(SchemaConfig::default())
    }

    /// Create an empty schema with explicit config.
    pub fn with_config(config: SchemaConfig) -> Self {
        Self {
            fields: BTreeMap::new(),
            config,
        }
    }

    /// Start declaring a required field.
    pub fn field(self, name: impl Into<String>) -> FieldBuilder {
        self.field_with(name, Requirement::default())
    }

    /// Start declaring a field with an explicit presence policy.
    pub fn field_with(self, name: impl Into<String>, requirement: Requirement) -> FieldBuilder {
        FieldBuilder::new(self, name.into(), requirement)
    }

    /// Install a finished rule for `name`, replacing any earlier declaration.
    pub fn insert(&mut self, name: impl Into<String>, rule: BoxedRule, requirement: Requirement) {
        self.fields
            .insert(name.into(), FieldEntry { rule, requirement });
    }

    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.fields.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Validate a document, reporting the first violation found.
    pub fn validate(&self, document: &Value) -> Outcome {
        let Value::Object(map) = document else {
            return Outcome::violation(ViolationKind::RootShape, "Root is not an object");
        };

        let root = Depth::new(self.config.max_depth);
        let Some(depth) = root.descend() else {
            return root.exceeded();
        };

        for (name, entry) in &self.fields {
            match map.get(name) {
                Some(value) => {
                    let outcome = entry.rule.check(value, depth);
                    if outcome.is_failure() {
                        let outcome = outcome.with_prefix(name);
                        tracing::trace!(
                            path = outcome.path(),
                            message = outcome.message(),
                            "document rejected"
                        );
                        return outcome;
                    }
                }
                None if entry.requirement.is_required() => {
                    tracing::trace!(field = %name, "required field missing");
                    return Outcome::violation(
                        ViolationKind::Presence,
                        format!("Missing required field '{name}'"),
                    );
                }
                None => {}
            }
        }
        Outcome::ok()
    }
}
