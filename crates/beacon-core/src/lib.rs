//! Composable rule engine for validating JSON-like documents.
//!
//! A [`Schema`] is a set of named fields, each carrying one [`Rule`] and a
//! presence [`Requirement`]. Rules compose: leaf predicates, AND/OR
//! combinators, and object/array containers that recurse into nested values.
//! Validation stops at the first violation and reports it as an [`Outcome`]
//! with a path such as `user.addresses[1].city`.
//!
//! Schemas are immutable once built and can be shared across threads.

pub mod builder;
pub mod combinator;
pub mod container;
pub mod outcome;
pub mod predicate;
pub mod rule;
pub mod schema;

pub use builder::FieldBuilder;
pub use combinator::{Conjunction, Disjunction};
pub use container::{ArrayRule, ObjectRule};
pub use outcome::{Outcome, ViolationKind};
pub use predicate::Predicate;
pub use rule::{BoxedRule, Depth, Rule, DEFAULT_MAX_DEPTH};
pub use schema::{FieldEntry, Requirement, Schema, SchemaConfig};
