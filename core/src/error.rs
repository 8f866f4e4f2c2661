//! Error and result model shared by every schema.
//!
//! Validation never panics and never returns early through `?` on the
//! structural path: failures are carried as [`ValidationResult::Failure`]
//! values holding one or more [`ValidationError`]s, each addressed by the
//! [`PathSegment`]s leading to the offending value. Only
//! [`Schema::safe_parse`](crate::Schema::safe_parse) converts a failure into
//! a [`ParseError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One step in the path from the root input to a nested value.
///
/// Serialized untagged, so a path renders as `["items", 0, "name"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Renders a path as dot-separated text, or `<root>` when empty.
///
/// # Examples
///
/// ```
/// use valguard_core::{PathSegment, display_path};
///
/// let path = vec![PathSegment::from("items"), PathSegment::from(2), PathSegment::from("sku")];
/// assert_eq!(display_path(&path), "items.2.sku");
/// assert_eq!(display_path(&[]), "<root>");
/// ```
pub fn display_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Machine-readable failure kind.
///
/// The vocabulary is closed; every structural, gate, refinement and union
/// failure maps to exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidType,
    StringTooShort,
    StringTooLong,
    StringPatternMismatch,
    InvalidEmail,
    InvalidUrl,
    InvalidUuid,
    InvalidDate,
    InvalidDatetime,
    NotInteger,
    NumberTooSmall,
    NumberTooLarge,
    NotPositive,
    NotNegative,
    ArrayTooSmall,
    ArrayTooLarge,
    ArrayWrongLength,
    UnknownKey,
    LiteralMismatch,
    UnionMismatch,
    Required,
    NotNullable,
    CustomValidationFailed,
}

impl ErrorCode {
    /// Returns the `snake_case` identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidType => "invalid_type",
            ErrorCode::StringTooShort => "string_too_short",
            ErrorCode::StringTooLong => "string_too_long",
            ErrorCode::StringPatternMismatch => "string_pattern_mismatch",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidUrl => "invalid_url",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidDatetime => "invalid_datetime",
            ErrorCode::NotInteger => "not_integer",
            ErrorCode::NumberTooSmall => "number_too_small",
            ErrorCode::NumberTooLarge => "number_too_large",
            ErrorCode::NotPositive => "not_positive",
            ErrorCode::NotNegative => "not_negative",
            ErrorCode::ArrayTooSmall => "array_too_small",
            ErrorCode::ArrayTooLarge => "array_too_large",
            ErrorCode::ArrayWrongLength => "array_wrong_length",
            ErrorCode::UnknownKey => "unknown_key",
            ErrorCode::LiteralMismatch => "literal_mismatch",
            ErrorCode::UnionMismatch => "union_mismatch",
            ErrorCode::Required => "required",
            ErrorCode::NotNullable => "not_nullable",
            ErrorCode::CustomValidationFailed => "custom_validation_failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure.
///
/// # Examples
///
/// ```
/// use valguard_core::{ErrorCode, PathSegment, ValidationError};
///
/// let err = ValidationError::new(
///     ErrorCode::Required,
///     "Required field is missing",
///     &[PathSegment::from("name")],
/// );
/// assert_eq!(err.to_string(), "name: Required field is missing");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Failure kind.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Context path at the point of failure.
    pub path: Vec<PathSegment>,
    /// Echo of the offending value (or a measurement of it, such as a length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
    /// Description of what was wanted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Per-member errors swallowed by a `union_mismatch`. Debug aid only.
    #[serde(skip)]
    pub suppressed: Vec<ValidationError>,
}

impl ValidationError {
    /// Creates an error at `path`.
    pub fn new(code: ErrorCode, message: impl Into<String>, path: &[PathSegment]) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.to_vec(),
            received: None,
            expected: None,
            suppressed: Vec::new(),
        }
    }

    /// Attaches the received value.
    pub fn with_received(mut self, received: impl Into<Value>) -> Self {
        self.received = Some(received.into());
        self
    }

    /// Attaches the expected description.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub(crate) fn with_suppressed(mut self, suppressed: Vec<ValidationError>) -> Self {
        self.suppressed = suppressed;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", display_path(&self.path), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating one value.
///
/// Exactly one variant is populated. A `Failure` always holds at least one
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult<T> {
    /// The value conforms; carries the (possibly coerced) data.
    Success(T),
    /// The value does not conform.
    Failure(Vec<ValidationError>),
}

impl<T> ValidationResult<T> {
    /// Builds a failure holding a single error.
    pub fn fail(error: ValidationError) -> Self {
        ValidationResult::Failure(vec![error])
    }

    /// Returns `true` for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success(_))
    }

    /// Returns `true` for `Failure`.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the data of a success.
    pub fn data(&self) -> Option<&T> {
        match self {
            ValidationResult::Success(data) => Some(data),
            ValidationResult::Failure(_) => None,
        }
    }

    /// Returns the errors of a failure, or an empty slice on success.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationResult::Success(_) => &[],
            ValidationResult::Failure(errors) => errors,
        }
    }

    /// Maps the success data.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            ValidationResult::Success(data) => ValidationResult::Success(f(data)),
            ValidationResult::Failure(errors) => ValidationResult::Failure(errors),
        }
    }

    /// Chains another validation step onto a success.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> ValidationResult<U>) -> ValidationResult<U> {
        match self {
            ValidationResult::Success(data) => f(data),
            ValidationResult::Failure(errors) => ValidationResult::Failure(errors),
        }
    }

    /// Converts into a standard `Result`, aggregating errors into a [`ParseError`].
    pub fn into_result(self) -> Result<T, ParseError> {
        match self {
            ValidationResult::Success(data) => Ok(data),
            ValidationResult::Failure(errors) => Err(ParseError { errors }),
        }
    }
}

/// Aggregate error raised by `safe_parse` when validation fails.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed: {}", summarize(.errors))]
pub struct ParseError {
    /// Every error reported by the failed parse, in order.
    pub errors: Vec<ValidationError>,
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
