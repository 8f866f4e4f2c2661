//! Declarative schema definitions.
//!
//! A [`SchemaDefinition`] is the serializable description of a schema tree.
//! It is tagged by `type` and carries the common `optional`, `nullable` and
//! `default` modifiers alongside the kind-specific constraints:
//!
//! ```yaml
//! type: object
//! strict: true
//! shape:
//!   id: { type: string, format: uuid }
//!   qty: { type: number, int: true, positive: true }
//!   note: { type: string, max: 200, optional: true }
//! ```
//!
//! [`compile`](SchemaDefinition::compile) turns a definition into a shared
//! [`SchemaRef`], resolving `ref` kinds against already compiled schemas.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use valguard_core::{
    AnySchema, ArraySchema, BooleanSchema, LiteralSchema, LiteralValue, NumberSchema,
    ObjectSchema, Schema, SchemaRef, SharedSchema, StringFormat, StringSchema, UnionSchema,
};

use crate::error::{RegistryError, Result};

/// A serializable schema description.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use serde_json::json;
/// use valguard_registry::SchemaDefinition;
///
/// let def: SchemaDefinition = serde_yaml::from_str("type: string\nformat: email\n").unwrap();
/// let schema = def.compile(&HashMap::new()).unwrap();
/// assert!(schema.validate(Some(&json!("a@b.com")), Vec::new()).is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDefinition")]
pub struct SchemaDefinition {
    /// Kind and kind-specific constraints.
    #[serde(flatten)]
    pub kind: DefinitionKind,
    /// Accept a missing value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Accept null.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    /// Value produced for a missing input when `optional` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Keys the kind does not recognize. Compiling rejects a definition
    /// that has any.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Wire form of [`SchemaDefinition`] before unrecognized keys are sorted out.
#[derive(Deserialize)]
struct RawDefinition {
    #[serde(flatten)]
    kind: DefinitionKind,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    default: Option<Value>,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

impl From<RawDefinition> for SchemaDefinition {
    fn from(raw: RawDefinition) -> Self {
        let fields = raw.kind.field_names();
        let unknown = raw
            .rest
            .into_iter()
            .filter(|(key, _)| key != "type" && !fields.contains(&key.as_str()))
            .collect();
        Self {
            kind: raw.kind,
            optional: raw.optional,
            nullable: raw.nullable,
            default: raw.default,
            unknown,
        }
    }
}

/// Kind-specific part of a [`SchemaDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DefinitionKind {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<StringFormat>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "is_false")]
        int: bool,
        #[serde(default, skip_serializing_if = "is_false")]
        positive: bool,
        #[serde(default, skip_serializing_if = "is_false")]
        negative: bool,
    },
    Boolean,
    Any,
    Object {
        #[serde(default)]
        shape: BTreeMap<String, SchemaDefinition>,
        #[serde(default, skip_serializing_if = "is_false")]
        strict: bool,
        #[serde(default, skip_serializing_if = "is_false")]
        passthrough: bool,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Box<SchemaDefinition>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        nonempty: bool,
    },
    Union {
        members: Vec<SchemaDefinition>,
    },
    Literal {
        value: LiteralValue,
    },
    Enum {
        values: Vec<LiteralValue>,
    },
    /// A schema defined earlier under `name`.
    Ref {
        name: String,
    },
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl DefinitionKind {
    fn field_names(&self) -> &'static [&'static str] {
        match self {
            DefinitionKind::String { .. } => &["min", "max", "length", "pattern", "format"],
            DefinitionKind::Number { .. } => &["min", "max", "int", "positive", "negative"],
            DefinitionKind::Boolean | DefinitionKind::Any => &[],
            DefinitionKind::Object { .. } => &["shape", "strict", "passthrough"],
            DefinitionKind::Array { .. } => &["items", "min", "max", "length", "nonempty"],
            DefinitionKind::Union { .. } => &["members"],
            DefinitionKind::Literal { .. } => &["value"],
            DefinitionKind::Enum { .. } => &["values"],
            DefinitionKind::Ref { .. } => &["name"],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DefinitionKind::String { .. } => "string",
            DefinitionKind::Number { .. } => "number",
            DefinitionKind::Boolean => "boolean",
            DefinitionKind::Any => "any",
            DefinitionKind::Object { .. } => "object",
            DefinitionKind::Array { .. } => "array",
            DefinitionKind::Union { .. } => "union",
            DefinitionKind::Literal { .. } => "literal",
            DefinitionKind::Enum { .. } => "enum",
            DefinitionKind::Ref { .. } => "ref",
        }
    }
}

impl SchemaDefinition {
    /// A definition of `kind` with no modifiers.
    pub fn new(kind: DefinitionKind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            default: None,
            unknown: BTreeMap::new(),
        }
    }

    /// Compiles into a schema, resolving `ref`s against `known`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPattern`] for an uncompilable pattern,
    /// [`RegistryError::InvalidDefault`] for a default of the wrong JSON type,
    /// [`RegistryError::UnknownReference`] for a `ref` to an unknown name,
    /// and [`RegistryError::UnknownField`] for a key the kind does not take.
    pub fn compile(&self, known: &HashMap<String, SchemaRef>) -> Result<SchemaRef> {
        if let Some(field) = self.unknown.keys().next() {
            return Err(RegistryError::UnknownField {
                kind: self.kind.name(),
                field: field.clone(),
            });
        }
        match &self.kind {
            DefinitionKind::String {
                min,
                max,
                length,
                pattern,
                format,
            } => {
                let mut schema = StringSchema::new();
                if let Some(length) = length {
                    schema = schema.length(*length);
                }
                if let Some(min) = min {
                    schema = schema.min(*min);
                }
                if let Some(max) = max {
                    schema = schema.max(*max);
                }
                if let Some(pattern) = pattern {
                    let regex = Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    })?;
                    schema = schema.regex(regex);
                }
                if let Some(format) = format {
                    schema = schema.format(*format);
                }
                self.finish(schema, |v| v.as_str().map(String::from))
            }
            DefinitionKind::Number {
                min,
                max,
                int,
                positive,
                negative,
            } => {
                let mut schema = NumberSchema::new();
                if let Some(min) = min {
                    schema = schema.min(*min);
                }
                if let Some(max) = max {
                    schema = schema.max(*max);
                }
                if *int {
                    schema = schema.int();
                }
                if *positive {
                    schema = schema.positive();
                }
                if *negative {
                    schema = schema.negative();
                }
                self.finish(schema, Value::as_f64)
            }
            DefinitionKind::Boolean => self.finish(BooleanSchema::new(), Value::as_bool),
            DefinitionKind::Any => self.finish(AnySchema::new(), |v| Some(v.clone())),
            DefinitionKind::Object {
                shape,
                strict,
                passthrough,
            } => {
                let mut fields = Vec::with_capacity(shape.len());
                for (key, definition) in shape {
                    fields.push((key.clone(), definition.compile(known)?));
                }
                let mut schema = ObjectSchema::from_shape(fields);
                if *strict {
                    schema = schema.strict();
                }
                if *passthrough {
                    schema = schema.passthrough();
                }
                self.finish(schema, |v| v.as_object().cloned())
            }
            DefinitionKind::Array {
                items,
                min,
                max,
                length,
                nonempty,
            } => {
                let mut schema = match items {
                    Some(items) => ArraySchema::of(items.compile(known)?),
                    None => ArraySchema::new(),
                };
                if let Some(min) = min {
                    schema = schema.min(*min);
                }
                if let Some(max) = max {
                    schema = schema.max(*max);
                }
                if let Some(length) = length {
                    schema = schema.length(*length);
                }
                if *nonempty {
                    schema = schema.nonempty();
                }
                self.finish(schema, |v| v.as_array().cloned())
            }
            DefinitionKind::Union { members } => {
                let members = members
                    .iter()
                    .map(|member| member.compile(known))
                    .collect::<Result<Vec<_>>>()?;
                self.finish(UnionSchema::new(members), |v| Some(v.clone()))
            }
            DefinitionKind::Literal { value } => {
                self.finish(LiteralSchema::new(value.clone()), |v| Some(v.clone()))
            }
            DefinitionKind::Enum { values } => {
                let members = values
                    .iter()
                    .map(|value| LiteralSchema::new(value.clone()).boxed())
                    .collect();
                self.finish(UnionSchema::new(members), |v| Some(v.clone()))
            }
            DefinitionKind::Ref { name } => {
                let inner = known
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RegistryError::UnknownReference(name.clone()))?;
                if !self.has_modifiers() {
                    return Ok(inner);
                }
                self.finish(SharedSchema::new(inner), |v| Some(v.clone()))
            }
        }
    }

    fn has_modifiers(&self) -> bool {
        self.optional || self.nullable || self.default.is_some()
    }

    fn finish<S, F>(&self, schema: S, convert_default: F) -> Result<SchemaRef>
    where
        S: Schema,
        F: Fn(&Value) -> Option<S::Output>,
    {
        let mut schema = schema;
        if self.optional {
            schema = schema.opt();
        }
        if self.nullable {
            schema = schema.null();
        }
        if let Some(value) = &self.default {
            let converted = convert_default(value).ok_or_else(|| RegistryError::InvalidDefault {
                kind: self.kind.name(),
                value: value.clone(),
            })?;
            schema = schema.default(converted);
        }
        Ok(schema.boxed())
    }
}
