//! Composable runtime schema validation for untyped JSON values.
//!
//! Build a schema tree once, then validate any number of
//! [`serde_json::Value`]s against it:
//!
//! - [`StringSchema`], [`NumberSchema`], [`BooleanSchema`], [`AnySchema`]:
//!   leaf schemas with length, range, pattern and format constraints.
//! - [`ObjectSchema`], [`ArraySchema`], [`UnionSchema`], [`LiteralSchema`]:
//!   composite schemas that delegate to child schemas.
//! - [`Schema`]: the shared contract of `parse`/`safe_parse`, the
//!   optional/nullable/default gate and refinements.
//!
//! Every builder method returns a new schema, so schemas can be shared freely
//! across derived schemas and threads.
//!
//! Parsing returns a [`ValidationResult`]. Object fields and array elements
//! accumulate all their errors; leaf constraints, array lengths and
//! refinements stop at the first failure.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use valguard_core::*;
//!
//! let person = object()
//!     .field("name", string().min(2).max(50))
//!     .field("age", number().int().min(0.0).max(120.0))
//!     .field("email", email().opt());
//!
//! let parsed = person.parse(&json!({"name": "Jo", "age": 31}));
//! assert!(parsed.is_success());
//!
//! let failed = person.parse(&json!({"name": 1, "age": "x"}));
//! assert_eq!(failed.errors().len(), 2);
//! assert_eq!(failed.errors()[0].code, ErrorCode::InvalidType);
//! ```

pub mod checks;
mod complex;
mod context;
mod error;
mod factory;
mod primitives;
mod schema;

pub use complex::{
    ArraySchema, LiteralSchema, LiteralValue, ObjectSchema, SharedSchema, UnionSchema,
};
pub use context::{ValidationContext, split_dotted_path};
pub use error::{
    ErrorCode, ParseError, PathSegment, ValidationError, ValidationResult, display_path,
};
pub use factory::*;
pub use primitives::{AnySchema, BooleanSchema, NumberSchema, StringFormat, StringSchema};
pub use schema::{
    DynSchema, Gate, IntoJson, IntoSchemaRef, Parsed, Refinement, Schema, SchemaBase, SchemaRef,
    Verdict,
};
