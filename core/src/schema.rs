//! The contract every schema implements.
//!
//! A schema is an immutable configuration value. Every fluent modifier on
//! [`Schema`] clones the receiver, changes one thing on the clone and returns
//! it, so a schema can be shared by any number of derived schemas and
//! concurrent parse calls.
//!
//! Validation of a node always runs in three stages:
//!
//! 1. the optional/nullable gate ([`SchemaBase`]), shared by every schema;
//! 2. the schema's own structural check ([`Schema::check`]);
//! 3. the refinement chain, in attachment order, stopping at the first
//!    rejection.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::checks;
use crate::context::ValidationContext;
use crate::error::{ErrorCode, ParseError, PathSegment, ValidationError, ValidationResult};

/// Decision returned by a custom validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The value is accepted.
    Valid,
    /// The value is rejected.
    Invalid,
    /// The validator could not decide synchronously.
    ///
    /// Asynchronous validation is unsupported; a pending verdict is reported
    /// as a `custom_validation_failed` error.
    Pending,
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        if valid { Verdict::Valid } else { Verdict::Invalid }
    }
}

/// Conversion of a schema's output into JSON, used when outputs are erased.
pub trait IntoJson: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    fn into_json(self) -> Value;
}

impl IntoJson for Value {
    fn into_json(self) -> Value {
        self
    }
}

impl IntoJson for String {
    fn into_json(self) -> Value {
        Value::String(self)
    }
}

impl IntoJson for bool {
    fn into_json(self) -> Value {
        Value::Bool(self)
    }
}

/// Whole numbers in `i64` range come back as JSON integers.
impl IntoJson for f64 {
    fn into_json(self) -> Value {
        if checks::is_whole(self) && self >= i64::MIN as f64 && self < i64::MAX as f64 {
            Value::from(self as i64)
        } else {
            serde_json::Number::from_f64(self).map_or(Value::Null, Value::Number)
        }
    }
}

impl IntoJson for Map<String, Value> {
    fn into_json(self) -> Value {
        Value::Object(self)
    }
}

impl IntoJson for Vec<Value> {
    fn into_json(self) -> Value {
        Value::Array(self)
    }
}

type CheckFn<T> = Arc<dyn Fn(&T) -> Verdict + Send + Sync>;
type MessageFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

enum RefinementMessage<T> {
    Fixed(String),
    Computed(MessageFn<T>),
}

impl<T> Clone for RefinementMessage<T> {
    fn clone(&self) -> Self {
        match self {
            RefinementMessage::Fixed(message) => RefinementMessage::Fixed(message.clone()),
            RefinementMessage::Computed(f) => RefinementMessage::Computed(Arc::clone(f)),
        }
    }
}

/// A user predicate plus the message reported when it rejects a value.
pub struct Refinement<T> {
    check: CheckFn<T>,
    message: RefinementMessage<T>,
}

impl<T> Clone for Refinement<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
            message: self.message.clone(),
        }
    }
}

impl<T> Refinement<T> {
    /// Creates a refinement with a fixed message.
    pub fn new<F>(check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&T) -> Verdict + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            message: RefinementMessage::Fixed(message.into()),
        }
    }

    /// Creates a refinement whose message is computed from the rejected value.
    pub fn with_message_fn<F, M>(check: F, message: M) -> Self
    where
        F: Fn(&T) -> Verdict + Send + Sync + 'static,
        M: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            message: RefinementMessage::Computed(Arc::new(message)),
        }
    }

    fn apply(&self, value: &T, ctx: &ValidationContext<'_>) -> Result<(), ValidationError>
    where
        T: IntoJson,
    {
        let message = match (self.check)(value) {
            Verdict::Valid => return Ok(()),
            Verdict::Invalid => match &self.message {
                RefinementMessage::Fixed(message) => message.clone(),
                RefinementMessage::Computed(f) => f(value),
            },
            Verdict::Pending => "Asynchronous validation is not supported".to_string(),
        };
        Err(
            ValidationError::new(ErrorCode::CustomValidationFailed, message, &ctx.path)
                .with_received(value.clone().into_json()),
        )
    }
}

/// Result data of a node-level parse.
///
/// Encodes the three ways a node can succeed: absent (optional without a
/// default), null (nullable), or a validated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// The input was missing and the schema is optional with no default.
    Missing,
    /// The input was null and the schema is nullable.
    Null,
    /// A validated (or defaulted) value.
    Value(T),
}

impl<T> Parsed<T> {
    /// Returns the validated value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Parsed::Value(value) => Some(value),
            Parsed::Missing | Parsed::Null => None,
        }
    }

    /// Consumes into the validated value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Parsed::Value(value) => Some(value),
            Parsed::Missing | Parsed::Null => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Parsed::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Parsed::Null)
    }
}

impl<T: IntoJson> Parsed<T> {
    /// Erases into JSON. `Missing` becomes `None`.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Parsed::Missing => None,
            Parsed::Null => Some(Value::Null),
            Parsed::Value(value) => Some(value.into_json()),
        }
    }
}

/// JSON kind name used in `invalid_type` messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builds the `invalid_type` error for a value of the wrong kind.
pub(crate) fn invalid_type(expected: &str, value: &Value, ctx: &ValidationContext<'_>) -> ValidationError {
    ValidationError::new(
        ErrorCode::InvalidType,
        format!("Expected {expected}, received {}", kind_name(value)),
        &ctx.path,
    )
    .with_received(value.clone())
    .with_expected(expected)
}

/// Outcome of the optional/nullable gate.
pub enum Gate<'a, T> {
    /// The gate decided the result on its own.
    Settled(ValidationResult<Parsed<T>>),
    /// The value is present and non-null; structural checks follow.
    Present(&'a Value),
}

/// Configuration shared by every schema: flags, default and refinements.
pub struct SchemaBase<T> {
    optional: bool,
    nullable: bool,
    default: Option<T>,
    refinements: Vec<Refinement<T>>,
}

impl<T> Default for SchemaBase<T> {
    fn default() -> Self {
        Self {
            optional: false,
            nullable: false,
            default: None,
            refinements: Vec::new(),
        }
    }
}

impl<T: Clone> Clone for SchemaBase<T> {
    fn clone(&self) -> Self {
        Self {
            optional: self.optional,
            nullable: self.nullable,
            default: self.default.clone(),
            refinements: self.refinements.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SchemaBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBase")
            .field("optional", &self.optional)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

impl<T: IntoJson> SchemaBase<T> {
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    /// Number of attached refinements.
    pub fn refinement_count(&self) -> usize {
        self.refinements.len()
    }

    /// Applies the missing/null rules.
    pub fn gate<'a>(&self, value: Option<&'a Value>, ctx: &ValidationContext<'_>) -> Gate<'a, T> {
        match value {
            None if self.optional => Gate::Settled(ValidationResult::Success(
                self.default.clone().map_or(Parsed::Missing, Parsed::Value),
            )),
            None => Gate::Settled(ValidationResult::fail(ValidationError::new(
                ErrorCode::Required,
                "Required field is missing",
                &ctx.path,
            ))),
            Some(Value::Null) if self.nullable => {
                Gate::Settled(ValidationResult::Success(Parsed::Null))
            }
            Some(Value::Null) => Gate::Settled(ValidationResult::fail(
                ValidationError::new(ErrorCode::NotNullable, "Field cannot be null", &ctx.path)
                    .with_received(Value::Null),
            )),
            Some(value) => Gate::Present(value),
        }
    }

    /// Runs the refinement chain; the first rejection is the whole result.
    pub fn run_refinements(&self, value: T, ctx: &ValidationContext<'_>) -> ValidationResult<T> {
        for refinement in &self.refinements {
            if let Err(error) = refinement.apply(&value, ctx) {
                tracing::trace!(path = ?ctx.path, message = %error.message, "refinement rejected value");
                return ValidationResult::fail(error);
            }
        }
        ValidationResult::Success(value)
    }
}

/// A composable, immutable validator for untyped values.
///
/// Implementors provide storage for a [`SchemaBase`] and a structural
/// [`check`](Schema::check); everything else is supplied.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valguard_core::{Parsed, Schema, ValidationResult};
///
/// let name = valguard_core::string().min(2).max(50);
/// assert_eq!(
///     name.parse(&json!("Jo")),
///     ValidationResult::Success(Parsed::Value("Jo".to_string()))
/// );
/// assert!(name.parse(&json!("J")).is_failure());
/// ```
pub trait Schema: Clone + fmt::Debug + Send + Sync + 'static {
    /// Data produced by a successful structural check.
    type Output: IntoJson;

    fn base(&self) -> &SchemaBase<Self::Output>;

    fn base_mut(&mut self) -> &mut SchemaBase<Self::Output>;

    /// Structural check for a present, non-null value.
    fn check<'a>(
        &self,
        value: &'a Value,
        ctx: &ValidationContext<'a>,
    ) -> ValidationResult<Self::Output>;

    /// JSON form of a validated `output` produced from `input`.
    fn output_json(&self, _input: &Value, output: Self::Output) -> Value {
        output.into_json()
    }

    /// Node-level parse: gate, structural check, then refinements.
    fn parse_node<'a>(
        &self,
        value: Option<&'a Value>,
        ctx: &ValidationContext<'a>,
    ) -> ValidationResult<Parsed<Self::Output>> {
        let value = match self.base().gate(value, ctx) {
            Gate::Settled(result) => return result,
            Gate::Present(value) => value,
        };
        self.check(value, ctx)
            .and_then(|data| self.base().run_refinements(data, ctx))
            .map(Parsed::Value)
    }

    /// Validates `value` from the root path.
    fn parse(&self, value: &Value) -> ValidationResult<Parsed<Self::Output>> {
        self.parse_input(Some(value), Vec::new())
    }

    /// Validates `value`, prefixing every error path with `path`.
    fn parse_at(
        &self,
        value: &Value,
        path: Vec<PathSegment>,
    ) -> ValidationResult<Parsed<Self::Output>> {
        self.parse_input(Some(value), path)
    }

    /// Validates a possibly missing value.
    fn parse_input(
        &self,
        value: Option<&Value>,
        path: Vec<PathSegment>,
    ) -> ValidationResult<Parsed<Self::Output>> {
        let ctx = ValidationContext::new(path, value);
        self.parse_node(value, &ctx)
    }

    /// Validates `value`, converting a failure into a [`ParseError`].
    fn safe_parse(&self, value: &Value) -> Result<Parsed<Self::Output>, ParseError> {
        self.parse(value).into_result()
    }

    /// [`safe_parse`](Schema::safe_parse) with a starting path.
    fn safe_parse_at(
        &self,
        value: &Value,
        path: Vec<PathSegment>,
    ) -> Result<Parsed<Self::Output>, ParseError> {
        self.parse_at(value, path).into_result()
    }

    /// Returns a copy that accepts a missing value.
    fn opt(&self) -> Self {
        let mut next = self.clone();
        next.base_mut().optional = true;
        next
    }

    /// Returns a copy that accepts null.
    fn null(&self) -> Self {
        let mut next = self.clone();
        next.base_mut().nullable = true;
        next
    }

    /// Returns a copy that yields `value` when an optional input is missing.
    fn default(&self, value: impl Into<Self::Output>) -> Self {
        let mut next = self.clone();
        next.base_mut().default = Some(value.into());
        next
    }

    /// Returns a copy with `predicate` appended to the refinement chain.
    fn refine<F>(&self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        self.with_refinement(Refinement::new(
            move |value| Verdict::from(predicate(value)),
            message,
        ))
    }

    /// Like [`refine`](Schema::refine), with a message built from the rejected value.
    fn refine_with<F, M>(&self, predicate: F, message: M) -> Self
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
        M: Fn(&Self::Output) -> String + Send + Sync + 'static,
    {
        self.with_refinement(Refinement::with_message_fn(
            move |value| Verdict::from(predicate(value)),
            message,
        ))
    }

    /// Appends a validator that may answer [`Verdict::Pending`].
    fn refine_verdict<F>(&self, check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Self::Output) -> Verdict + Send + Sync + 'static,
    {
        self.with_refinement(Refinement::new(check, message))
    }

    /// Returns a copy with `refinement` appended.
    fn with_refinement(&self, refinement: Refinement<Self::Output>) -> Self {
        let mut next = self.clone();
        next.base_mut().refinements.push(refinement);
        next
    }

    /// Erases the output type for composition.
    fn boxed(self) -> SchemaRef {
        Arc::new(self)
    }
}

/// Object-safe view of a [`Schema`] with its output erased to JSON.
pub trait DynSchema: fmt::Debug + Send + Sync {
    /// Node-level parse. `Success(None)` means the value is absent.
    fn parse_dyn<'a>(
        &self,
        value: Option<&'a Value>,
        ctx: &ValidationContext<'a>,
    ) -> ValidationResult<Option<Value>>;

    /// Validates a possibly missing value from `path`.
    fn validate(&self, value: Option<&Value>, path: Vec<PathSegment>) -> ValidationResult<Option<Value>> {
        let ctx = ValidationContext::new(path, value);
        self.parse_dyn(value, &ctx)
    }
}

impl<S: Schema> DynSchema for S {
    fn parse_dyn<'a>(
        &self,
        value: Option<&'a Value>,
        ctx: &ValidationContext<'a>,
    ) -> ValidationResult<Option<Value>> {
        self.parse_node(value, ctx).map(|parsed| match (parsed, value) {
            (Parsed::Value(output), Some(input)) => Some(self.output_json(input, output)),
            (parsed, _) => parsed.into_json(),
        })
    }
}

/// Shared, type-erased schema used inside composite schemas.
pub type SchemaRef = Arc<dyn DynSchema>;

/// Conversion into a [`SchemaRef`], accepted wherever a child schema is.
pub trait IntoSchemaRef {
    fn into_schema_ref(self) -> SchemaRef;
}

impl<S: Schema> IntoSchemaRef for S {
    fn into_schema_ref(self) -> SchemaRef {
        Arc::new(self)
    }
}

impl IntoSchemaRef for SchemaRef {
    fn into_schema_ref(self) -> SchemaRef {
        self
    }
}
