use std::collections::BTreeMap;
use std::sync::OnceLock;

use beacon_core::predicate;
use beacon_core::{
    ArrayRule, BoxedRule, Conjunction, Disjunction, ObjectRule, Requirement, Rule, Schema,
    SchemaConfig,
};
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// Meta-schema every definition document must satisfy.
pub const DEFINITION_META_SCHEMA: &str = include_str!("definition.schema.json");

/// A persisted schema: name, version and per-field rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    pub version: u32,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
}

/// Rules and presence policy of one top-level field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleDefinition>,
}

impl Default for FieldDefinition {
    fn default() -> Self {
        Self {
            required: true,
            rules: Vec::new(),
        }
    }
}

fn default_required() -> bool {
    true
}

/// Serialized form of a rule, tagged by `"rule"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleDefinition {
    Always,
    IsString,
    IsInteger,
    IsBoolean,
    IsArray,
    IsObject,
    NonEmptyString,
    MinLength {
        value: usize,
    },
    MaxLength {
        value: usize,
    },
    MinInteger {
        value: i64,
    },
    MaxInteger {
        value: i64,
    },
    MatchesRegex {
        pattern: String,
    },
    AnyOf {
        rules: Vec<RuleDefinition>,
    },
    AllOf {
        rules: Vec<RuleDefinition>,
    },
    Object {
        #[serde(default)]
        fields: BTreeMap<String, RuleDefinition>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
    },
    Array {
        items: Box<RuleDefinition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
}

impl RuleDefinition {
    /// Container levels a conforming value descends through.
    ///
    /// Matches the runtime budget: arrays and objects with field rules spend
    /// a level, combinators and leaves do not.
    pub fn depth(&self) -> usize {
        match self {
            RuleDefinition::AnyOf { rules } | RuleDefinition::AllOf { rules } => {
                rules.iter().map(RuleDefinition::depth).max().unwrap_or(0)
            }
            RuleDefinition::Object { fields, .. } if fields.is_empty() => 0,
            RuleDefinition::Object { fields, .. } => {
                fields.values().map(RuleDefinition::depth).max().unwrap_or(0) + 1
            }
            RuleDefinition::Array { items, .. } => items.depth() + 1,
            _ => 0,
        }
    }

    /// Build the rule tree this definition describes.
    pub fn build(&self) -> BoxedRule {
        match self {
            RuleDefinition::Always => predicate::always().boxed(),
            RuleDefinition::IsString => predicate::is_string().boxed(),
            RuleDefinition::IsInteger => predicate::is_integer().boxed(),
            RuleDefinition::IsBoolean => predicate::is_boolean().boxed(),
            RuleDefinition::IsArray => predicate::is_array().boxed(),
            RuleDefinition::IsObject => predicate::is_object().boxed(),
            RuleDefinition::NonEmptyString => predicate::non_empty_string().boxed(),
            RuleDefinition::MinLength { value } => predicate::min_length(*value).boxed(),
            RuleDefinition::MaxLength { value } => predicate::max_length(*value).boxed(),
            RuleDefinition::MinInteger { value } => predicate::min_integer(*value).boxed(),
            RuleDefinition::MaxInteger { value } => predicate::max_integer(*value).boxed(),
            RuleDefinition::MatchesRegex { pattern } => predicate::matches_regex(pattern).boxed(),
            RuleDefinition::AnyOf { rules } => {
                Disjunction::new(rules.iter().map(RuleDefinition::build).collect()).boxed()
            }
            RuleDefinition::AllOf { rules } => {
                Conjunction::new(rules.iter().map(RuleDefinition::build).collect()).boxed()
            }
            RuleDefinition::Object { fields, required } => ObjectRule::new(
                fields.iter().map(|(name, rule)| (name.clone(), rule.build())),
                required.clone(),
            )
            .boxed(),
            RuleDefinition::Array {
                items,
                min_items,
                max_items,
            } => ArrayRule::with_bounds(items.build(), *min_items, *max_items).boxed(),
        }
    }
}

impl SchemaDefinition {
    /// Parse a definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse a definition from a JSON value, checking it against
    /// [`DEFINITION_META_SCHEMA`] first.
    pub fn from_value(value: &Value) -> Result<Self> {
        let validator = meta_validator()?;
        let mut errors = validator.iter_errors(value);
        if let Some(first) = errors.next() {
            let mut message = first.to_string();
            for err in errors.take(3) {
                message.push_str("; ");
                message.push_str(&err.to_string());
            }
            return Err(SchemaError::InvalidDefinition(message));
        }

        Self::deserialize(value).map_err(|err| SchemaError::InvalidDefinition(err.to_string()))
    }

    /// Serialize back to the stored JSON form.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Deepest container nesting across all fields, not counting the
    /// document root.
    pub fn depth(&self) -> usize {
        self.fields
            .values()
            .flat_map(|field| field.rules.iter())
            .map(RuleDefinition::depth)
            .max()
            .unwrap_or(0)
    }

    /// Compile into an executable schema.
    ///
    /// The document root spends one level of `max_depth`, so a definition
    /// compiles only when every conforming document fits the budget.
    pub fn compile(&self, config: SchemaConfig) -> Result<Schema> {
        if self.depth().saturating_add(1) > config.max_depth {
            return Err(SchemaError::DefinitionTooDeep {
                limit: config.max_depth,
            });
        }

        let mut schema = Schema::with_config(config);
        for (name, field) in &self.fields {
            let requirement = if field.required {
                Requirement::Required
            } else {
                Requirement::Optional
            };
            let mut builder = schema.field_with(name.clone(), requirement);
            for rule in &field.rules {
                builder = builder.rule(rule.build());
            }
            schema = builder.done();
        }
        Ok(schema)
    }
}

fn meta_validator() -> Result<&'static Validator> {
    static META: OnceLock<std::result::Result<Validator, String>> = OnceLock::new();
    let compiled = META.get_or_init(|| {
        let meta: Value =
            serde_json::from_str(DEFINITION_META_SCHEMA).map_err(|err| err.to_string())?;
        jsonschema::validator_for(&meta).map_err(|err| err.to_string())
    });
    compiled
        .as_ref()
        .map_err(|err| SchemaError::CompileFailed(err.clone()))
}

#[cfg(test)]
mod tests {
    use beacon_core::ViolationKind;
    use serde_json::json;

    use super::*;

    const USER_DEFINITION: &str = r#"{
        "name": "user",
        "version": 2,
        "fields": {
            "id": { "rules": [{ "rule": "is_integer" }, { "rule": "min_integer", "value": 1 }] },
            "email": { "rules": [{ "rule": "matches_regex", "pattern": "[^@]+@[^@]+" }] },
            "nickname": { "required": false },
            "profile": {
                "rules": [{
                    "rule": "object",
                    "fields": {
                        "tags": {
                            "rule": "array",
                            "items": { "rule": "non_empty_string" },
                            "max_items": 2
                        }
                    },
                    "required": ["tags"]
                }]
            }
        }
    }"#;

    #[test]
    fn parses_definition() {
        let def = SchemaDefinition::from_json(USER_DEFINITION).unwrap();
        assert_eq!(def.name, "user");
        assert_eq!(def.version, 2);
        assert_eq!(def.fields.len(), 4);
        assert!(def.fields["id"].required);
        assert!(!def.fields["nickname"].required);
        assert!(def.fields["nickname"].rules.is_empty());
        assert_eq!(def.depth(), 2);
    }

    #[test]
    fn compiled_schema_validates_documents() {
        let schema = SchemaDefinition::from_json(USER_DEFINITION)
            .unwrap()
            .compile(SchemaConfig::default())
            .unwrap();

        let ok = json!({"id": 3, "email": "a@b", "profile": {"tags": ["x"]}});
        assert!(schema.validate(&ok).is_success());

        let bad_tag = json!({"id": 3, "email": "a@b", "profile": {"tags": ["x", ""]}});
        let outcome = schema.validate(&bad_tag);
        assert_eq!(outcome.path(), "profile.tags[1]");
        assert_eq!(outcome.message(), "Empty string");

        let bad_id = json!({"id": 0, "email": "a@b", "profile": {"tags": []}});
        assert_eq!(schema.validate(&bad_id).message(), "Integer < 1");

        let missing = json!({"id": 3, "profile": {"tags": []}});
        assert_eq!(
            schema.validate(&missing).message(),
            "Missing required field 'email'"
        );
    }

    #[test]
    fn any_of_definition_aggregates() {
        let def = SchemaDefinition::from_value(&json!({
            "name": "ref",
            "version": 1,
            "fields": {
                "ref": { "rules": [{ "rule": "any_of", "rules": [
                    { "rule": "is_string" },
                    { "rule": "is_integer" }
                ]}]}
            }
        }))
        .unwrap();
        let schema = def.compile(SchemaConfig::default()).unwrap();
        let outcome = schema.validate(&json!({"ref": false}));
        assert_eq!(outcome.kind(), Some(ViolationKind::Aggregate));
        assert_eq!(outcome.path(), "ref");
    }

    #[test]
    fn meta_schema_rejects_unknown_rule() {
        let result = SchemaDefinition::from_value(&json!({
            "name": "x",
            "version": 1,
            "fields": { "a": { "rules": [{ "rule": "is_float" }] } }
        }));
        assert!(matches!(result, Err(SchemaError::InvalidDefinition(_))));
    }

    #[test]
    fn meta_schema_requires_rule_parameters() {
        let result = SchemaDefinition::from_value(&json!({
            "name": "x",
            "version": 1,
            "fields": { "a": { "rules": [{ "rule": "min_length" }] } }
        }));
        assert!(matches!(result, Err(SchemaError::InvalidDefinition(_))));

        let result = SchemaDefinition::from_value(&json!({
            "name": "x",
            "version": 1,
            "fields": { "a": { "rules": [{ "rule": "max_length", "value": -1 }] } }
        }));
        assert!(matches!(result, Err(SchemaError::InvalidDefinition(_))));
    }

    #[test]
    fn meta_schema_requires_name_and_version() {
        let result = SchemaDefinition::from_value(&json!({ "fields": {} }));
        assert!(matches!(result, Err(SchemaError::InvalidDefinition(_))));
    }

    #[test]
    fn unknown_field_keys_are_rejected() {
        let result = SchemaDefinition::from_value(&json!({
            "name": "x",
            "version": 1,
            "fields": { "a": { "optional": true } }
        }));
        assert!(matches!(result, Err(SchemaError::InvalidDefinition(_))));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            SchemaDefinition::from_json("{not json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn invalid_regex_compiles_into_failing_rule() {
        let schema = SchemaDefinition::from_value(&json!({
            "name": "x",
            "version": 1,
            "fields": { "a": { "rules": [{ "rule": "matches_regex", "pattern": "(" }] } }
        }))
        .unwrap()
        .compile(SchemaConfig::default())
        .unwrap();
        let outcome = schema.validate(&json!({"a": "s"}));
        assert!(outcome.message().starts_with("Invalid regex: "));
        assert_eq!(outcome.path(), "a");
    }

    fn nested_arrays(levels: usize) -> SchemaDefinition {
        let mut rule = json!({ "rule": "is_integer" });
        for _ in 0..levels {
            rule = json!({ "rule": "array", "items": rule });
        }
        SchemaDefinition::from_value(&json!({
            "name": "deep",
            "version": 1,
            "fields": { "a": { "rules": [rule] } }
        }))
        .unwrap()
    }

    #[test]
    fn overly_deep_definition_is_refused() {
        let def = nested_arrays(5);
        assert_eq!(def.depth(), 5);
        assert!(matches!(
            def.compile(SchemaConfig { max_depth: 5 }),
            Err(SchemaError::DefinitionTooDeep { limit: 5 })
        ));
        assert!(def.compile(SchemaConfig { max_depth: 6 }).is_ok());
    }

    #[test]
    fn definition_at_depth_limit_accepts_conforming_documents() {
        let schema = nested_arrays(4)
            .compile(SchemaConfig { max_depth: 5 })
            .unwrap();
        let outcome = schema.validate(&json!({"a": [[[[1]]]]}));
        assert!(outcome.is_success(), "{outcome}");

        let schema = nested_arrays(5)
            .compile(SchemaConfig { max_depth: 6 })
            .unwrap();
        assert!(schema.validate(&json!({"a": [[[[[1]]]]]})).is_success());
    }

    #[test]
    fn combinators_and_empty_objects_spend_no_depth() {
        let def = SchemaDefinition::from_value(&json!({
            "name": "mixed",
            "version": 1,
            "fields": {
                "a": { "rules": [{
                    "rule": "any_of",
                    "rules": [
                        {
                            "rule": "all_of",
                            "rules": [{ "rule": "array", "items": { "rule": "is_integer" } }]
                        },
                        { "rule": "object" }
                    ]
                }] }
            }
        }))
        .unwrap();
        assert_eq!(def.depth(), 1);

        let schema = def.compile(SchemaConfig { max_depth: 2 }).unwrap();
        assert!(schema.validate(&json!({"a": [1, 2]})).is_success());
        assert!(schema.validate(&json!({"a": {"k": 1}})).is_success());
    }

    #[test]
    fn serializes_back_to_definition_form() {
        let def = SchemaDefinition::from_json(USER_DEFINITION).unwrap();
        let reparsed = SchemaDefinition::from_value(&def.to_value()).unwrap();
        assert_eq!(reparsed, def);
    }
}
