//! Declarative, composable validation for JSON-like documents.
//!
//! beacon checks documents against schemas built from small rules, and reports
//! the first violation with a path such as `order.items[2].sku`.
//!
//! # Crate Structure
//!
//! - [`engine`]: Rules, combinators, containers and the schema builder
//! - [`schema`]: JSON schema definitions and a versioned registry (behind `schema` feature)
//! - [`store`]: Schema/event persistence boundary and validated ingestion (behind `store` feature)
//!
//! ```
//! use beacon::engine::{predicate, Rule, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("user")
//!     .object([("name", predicate::non_empty_string().boxed())], Vec::new())
//!     .done();
//!
//! let outcome = schema.validate(&json!({"user": {"name": ""}}));
//! assert_eq!(outcome.path(), "user.name");
//! ```

/// Re-export core engine types.
pub mod engine {
    pub use beacon_core::*;
}

/// Re-export schema definition types (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use beacon_schema::*;
}

/// Re-export persistence types (requires `store` feature).
#[cfg(feature = "store")]
pub mod store {
    pub use beacon_store::*;
}
