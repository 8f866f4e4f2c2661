//! Composite schemas: object, array, union and literal.
//!
//! Object fields and array elements accumulate every child error. Array
//! length checks short-circuit before elements are visited. A union reports
//! a single `union_mismatch` when no member matches.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::ValidationContext;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::schema::{IntoSchemaRef, Schema, SchemaBase, SchemaRef, invalid_type};

/// Validates objects against a keyed shape.
///
/// Fields are validated in declaration order. Keys not in the shape are
/// dropped from the output unless [`passthrough`](ObjectSchema::passthrough)
/// is set, and reported as `unknown_key` when [`strict`](ObjectSchema::strict)
/// is set. With both set, unknown keys are errors.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valguard_core::{ErrorCode, Schema, number, object, string};
///
/// let user = object()
///     .field("a", string())
///     .field("b", number());
/// let result = user.parse(&json!({"a": 1, "b": "x"}));
/// let paths: Vec<String> = result.errors().iter().map(|e| e.path[0].to_string()).collect();
/// assert_eq!(paths, ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    base: SchemaBase<Map<String, Value>>,
    shape: Vec<(String, SchemaRef)>,
    strict: bool,
    passthrough: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an object schema from `(key, schema)` pairs. Later duplicates win.
    pub fn from_shape<K, I>(shape: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaRef)>,
    {
        let mut schema = Self::new();
        for (key, child) in shape {
            insert_field(&mut schema.shape, key.into(), child);
        }
        schema
    }

    /// Returns a copy with one more field (replacing a field of the same name).
    pub fn field(&self, key: impl Into<String>, schema: impl IntoSchemaRef) -> Self {
        let mut next = self.clone();
        insert_field(&mut next.shape, key.into(), schema.into_schema_ref());
        next
    }

    /// Rejects keys outside the shape.
    pub fn strict(&self) -> Self {
        let mut next = self.clone();
        next.strict = true;
        next
    }

    /// Copies keys outside the shape into the output.
    pub fn passthrough(&self) -> Self {
        let mut next = self.clone();
        next.passthrough = true;
        next
    }

    /// New object schema over the listed keys only. Unknown keys are ignored.
    ///
    /// The result starts with default flags and no refinements.
    pub fn pick(&self, keys: &[&str]) -> Self {
        Self::from_shape(
            self.shape
                .iter()
                .filter(|(key, _)| keys.contains(&key.as_str()))
                .map(|(key, child)| (key.clone(), SchemaRef::clone(child))),
        )
    }

    /// New object schema without the listed keys.
    ///
    /// The result starts with default flags and no refinements.
    pub fn omit(&self, keys: &[&str]) -> Self {
        Self::from_shape(
            self.shape
                .iter()
                .filter(|(key, _)| !keys.contains(&key.as_str()))
                .map(|(key, child)| (key.clone(), SchemaRef::clone(child))),
        )
    }

    /// New object schema with `fields` added; added fields win on collision.
    ///
    /// The result starts with default flags and no refinements.
    pub fn extend<K, I>(&self, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaRef)>,
    {
        let mut shape = self.shape.clone();
        for (key, child) in fields {
            insert_field(&mut shape, key.into(), child);
        }
        Self::from_shape(shape)
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shape.iter().map(|(key, _)| key.as_str())
    }

    /// Schema declared for `key`.
    pub fn get(&self, key: &str) -> Option<&SchemaRef> {
        self.shape
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, child)| child)
    }

    fn declares(&self, key: &str) -> bool {
        self.shape.iter().any(|(candidate, _)| candidate == key)
    }
}

fn insert_field(shape: &mut Vec<(String, SchemaRef)>, key: String, schema: SchemaRef) {
    match shape.iter_mut().find(|(candidate, _)| *candidate == key) {
        Some(slot) => slot.1 = schema,
        None => shape.push((key, schema)),
    }
}

impl Schema for ObjectSchema {
    type Output = Map<String, Value>;

    fn base(&self) -> &SchemaBase<Map<String, Value>> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<Map<String, Value>> {
        &mut self.base
    }

    fn check<'a>(
        &self,
        value: &'a Value,
        ctx: &ValidationContext<'a>,
    ) -> ValidationResult<Map<String, Value>> {
        let Some(input) = value.as_object() else {
            return ValidationResult::fail(invalid_type("object", value, ctx));
        };

        let mut errors = Vec::new();
        let mut output = if self.passthrough {
            input.clone()
        } else {
            Map::new()
        };

        for (key, child) in &self.shape {
            let field = input.get(key);
            let field_ctx = ctx.child(key.as_str(), field);
            match child.parse_dyn(field, &field_ctx) {
                ValidationResult::Success(Some(parsed)) => {
                    output.insert(key.clone(), parsed);
                }
                ValidationResult::Success(None) => {}
                ValidationResult::Failure(field_errors) => errors.extend(field_errors),
            }
        }

        if self.strict {
            for (key, extra) in input.iter().filter(|(key, _)| !self.declares(key)) {
                errors.push(
                    ValidationError::new(
                        ErrorCode::UnknownKey,
                        format!("Unknown key: {key}"),
                        &ctx.child(key.as_str(), Some(extra)).path,
                    )
                    .with_received(extra.clone()),
                );
            }
        }

        if errors.is_empty() {
            ValidationResult::Success(output)
        } else {
            ValidationResult::Failure(errors)
        }
    }
}

/// Validates arrays, optionally element by element.
#[derive(Debug, Clone, Default)]
pub struct ArraySchema {
    base: SchemaBase<Vec<Value>>,
    element: Option<SchemaRef>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    exact_length: Option<usize>,
}

impl ArraySchema {
    /// An array of anything; elements pass through unchanged.
    pub fn new() -> Self {
        Default::default()
    }

    /// An array whose every element must satisfy `element`.
    pub fn of(element: impl IntoSchemaRef) -> Self {
        Self {
            element: Some(element.into_schema_ref()),
            ..Default::default()
        }
    }

    pub fn min(&self, length: usize) -> Self {
        let mut next = self.clone();
        next.min_length = Some(length);
        next
    }

    pub fn max(&self, length: usize) -> Self {
        let mut next = self.clone();
        next.max_length = Some(length);
        next
    }

    /// Requires exactly `length` elements.
    pub fn length(&self, length: usize) -> Self {
        let mut next = self.clone();
        next.exact_length = Some(length);
        next
    }

    /// Same as `min(1)`.
    pub fn nonempty(&self) -> Self {
        self.min(1)
    }

    pub fn element(&self) -> Option<&SchemaRef> {
        self.element.as_ref()
    }

    fn check_length(&self, len: usize, ctx: &ValidationContext<'_>) -> Option<ValidationError> {
        let (code, message) = match (self.min_length, self.max_length, self.exact_length) {
            (Some(min), _, _) if len < min => (
                ErrorCode::ArrayTooSmall,
                format!("Array must have at least {min} elements"),
            ),
            (_, Some(max), _) if len > max => (
                ErrorCode::ArrayTooLarge,
                format!("Array must have at most {max} elements"),
            ),
            (_, _, Some(exact)) if len != exact => (
                ErrorCode::ArrayWrongLength,
                format!("Array must have exactly {exact} elements"),
            ),
            _ => return None,
        };
        Some(ValidationError::new(code, message, &ctx.path).with_received(len))
    }
}

impl Schema for ArraySchema {
    type Output = Vec<Value>;

    fn base(&self) -> &SchemaBase<Vec<Value>> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<Vec<Value>> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, ctx: &ValidationContext<'a>) -> ValidationResult<Vec<Value>> {
        let Some(items) = value.as_array() else {
            return ValidationResult::fail(invalid_type("array", value, ctx));
        };

        if let Some(error) = self.check_length(items.len(), ctx) {
            return ValidationResult::fail(error);
        }

        let Some(element) = &self.element else {
            return ValidationResult::Success(items.clone());
        };

        let mut errors = Vec::new();
        let mut output = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_ctx = ctx.child(index, Some(item));
            match element.parse_dyn(Some(item), &item_ctx) {
                ValidationResult::Success(parsed) => output.push(parsed.unwrap_or(Value::Null)),
                ValidationResult::Failure(item_errors) => errors.extend(item_errors),
            }
        }

        if errors.is_empty() {
            ValidationResult::Success(output)
        } else {
            ValidationResult::Failure(errors)
        }
    }
}

/// Accepts the first member schema that matches.
///
/// Members are tried in declaration order; the first one that succeeds with
/// a present value wins. When none match, the member errors are not reported
/// (they are kept in [`ValidationError::suppressed`]) and a single
/// `union_mismatch` error is returned at the union's path.
#[derive(Debug, Clone, Default)]
pub struct UnionSchema {
    base: SchemaBase<Value>,
    members: Vec<SchemaRef>,
}

impl UnionSchema {
    pub fn new(members: Vec<SchemaRef>) -> Self {
        Self {
            members,
            ..Default::default()
        }
    }

    /// Returns a copy with one more member tried last.
    pub fn or(&self, member: impl IntoSchemaRef) -> Self {
        let mut next = self.clone();
        next.members.push(member.into_schema_ref());
        next
    }

    pub fn members(&self) -> &[SchemaRef] {
        &self.members
    }
}

impl Schema for UnionSchema {
    type Output = Value;

    fn base(&self) -> &SchemaBase<Value> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<Value> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, ctx: &ValidationContext<'a>) -> ValidationResult<Value> {
        let mut suppressed = Vec::new();
        for member in &self.members {
            match member.parse_dyn(Some(value), ctx) {
                ValidationResult::Success(Some(parsed)) => return ValidationResult::Success(parsed),
                ValidationResult::Success(None) => {}
                ValidationResult::Failure(errors) => suppressed.extend(errors),
            }
        }

        tracing::debug!(
            path = ?ctx.path,
            members = self.members.len(),
            suppressed = suppressed.len(),
            "no union member matched"
        );
        ValidationResult::fail(
            ValidationError::new(
                ErrorCode::UnionMismatch,
                "Value does not match any of the union types",
                &ctx.path,
            )
            .with_received(value.clone())
            .with_suppressed(suppressed),
        )
    }
}

/// Wraps a shared erased schema so it can take its own modifiers.
///
/// The wrapper's gate runs first; a present, non-null value is then handed
/// to the inner schema unchanged.
#[derive(Debug, Clone)]
pub struct SharedSchema {
    base: SchemaBase<Value>,
    inner: SchemaRef,
}

impl SharedSchema {
    pub fn new(inner: SchemaRef) -> Self {
        Self {
            base: SchemaBase::default(),
            inner,
        }
    }

    pub fn inner(&self) -> &SchemaRef {
        &self.inner
    }
}

impl Schema for SharedSchema {
    type Output = Value;

    fn base(&self) -> &SchemaBase<Value> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<Value> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, ctx: &ValidationContext<'a>) -> ValidationResult<Value> {
        self.inner
            .parse_dyn(Some(value), ctx)
            .map(|parsed| parsed.unwrap_or(Value::Null))
    }
}

/// A fixed primitive accepted by [`LiteralSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl LiteralValue {
    /// Strict equality against a JSON value. Numbers compare by value.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (LiteralValue::Bool(expected), Value::Bool(actual)) => expected == actual,
            (LiteralValue::Number(expected), Value::Number(actual)) => {
                actual.as_f64() == Some(*expected)
            }
            (LiteralValue::String(expected), Value::String(actual)) => expected == actual,
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            LiteralValue::Bool(flag) => Value::Bool(*flag),
            LiteralValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            LiteralValue::String(text) => Value::String(text.clone()),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(text) => write!(f, "{text:?}"),
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(text: &str) -> Self {
        LiteralValue::String(text.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(text: String) -> Self {
        LiteralValue::String(text)
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl From<i64> for LiteralValue {
    fn from(n: i64) -> Self {
        LiteralValue::Number(n as f64)
    }
}

impl From<i32> for LiteralValue {
    fn from(n: i32) -> Self {
        LiteralValue::Number(f64::from(n))
    }
}

impl From<bool> for LiteralValue {
    fn from(flag: bool) -> Self {
        LiteralValue::Bool(flag)
    }
}

/// Accepts exactly one primitive value.
#[derive(Debug, Clone)]
pub struct LiteralSchema {
    base: SchemaBase<Value>,
    literal: LiteralValue,
}

impl LiteralSchema {
    pub fn new(literal: impl Into<LiteralValue>) -> Self {
        Self {
            base: SchemaBase::default(),
            literal: literal.into(),
        }
    }

    pub fn literal(&self) -> &LiteralValue {
        &self.literal
    }
}

impl Schema for LiteralSchema {
    type Output = Value;

    fn base(&self) -> &SchemaBase<Value> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<Value> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, ctx: &ValidationContext<'a>) -> ValidationResult<Value> {
        if self.literal.matches(value) {
            return ValidationResult::Success(value.clone());
        }
        ValidationResult::fail(
            ValidationError::new(
                ErrorCode::LiteralMismatch,
                format!("Expected literal value {}", self.literal),
                &ctx.path,
            )
            .with_received(value.clone())
            .with_expected(self.literal.to_string()),
        )
    }
}
