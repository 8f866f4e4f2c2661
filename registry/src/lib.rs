//! Declarative schema definitions and named validation.
//!
//! This crate compiles YAML or JSON schema descriptions into
//! [`valguard_core`] schemas, keeps them by name in a [`SchemaRegistry`], and
//! validates documents against them one at a time or in parallel batches.
//!
//! # Quick start
//!
//! ```
//! use serde_json::json;
//! use valguard_registry::SchemaRegistry;
//!
//! let registry = SchemaRegistry::from_str_yaml(r#"
//! version: "1.0"
//! schemas:
//!   - name: address
//!     schema:
//!       type: object
//!       shape:
//!         street: { type: string, min: 1 }
//!         zip: { type: string, pattern: "^[0-9]{5}$" }
//!   - name: user
//!     schema:
//!       type: object
//!       shape:
//!         email: { type: string, format: email }
//!         home: { type: ref, name: address, optional: true }
//! "#).unwrap();
//!
//! let outcome = registry.validate("user", &json!({"email": "a@b.com"}), "").unwrap();
//! assert!(outcome.is_valid);
//!
//! let outcome = registry
//!     .validate("user", &json!({"email": "a@b.com", "home": {"street": "", "zip": "1"}}), "")
//!     .unwrap();
//! assert_eq!(outcome.errors.map(|e| e.len()), Some(2));
//! ```

mod config;
mod definition;
mod error;
mod registry;

pub use config::{NamedDefinition, RegistryFile};
pub use definition::{DefinitionKind, SchemaDefinition};
pub use error::{RegistryError, Result};
pub use registry::{RegistryBuilder, RegistrySource, SchemaRegistry, ValidationOutcome};
