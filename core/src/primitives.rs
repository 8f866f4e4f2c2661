//! Leaf schemas: string, number, boolean and any.
//!
//! String and number constraints are checked in a fixed order and the first
//! failing constraint is the only error reported.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checks;
use crate::context::ValidationContext;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::schema::{IntoJson, Schema, SchemaBase, invalid_type};

/// Well-known string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    /// `YYYY-MM-DD` naming a real calendar day.
    Date,
    /// Anything parseable as a date or date-time.
    Datetime,
}

impl StringFormat {
    fn accepts(self, value: &str) -> bool {
        match self {
            StringFormat::Email => checks::is_email(value),
            StringFormat::Url => checks::is_url(value),
            StringFormat::Uuid => checks::is_uuid(value),
            StringFormat::Date => checks::is_date(value),
            StringFormat::Datetime => checks::is_datetime(value),
        }
    }

    fn error_code(self) -> ErrorCode {
        match self {
            StringFormat::Email => ErrorCode::InvalidEmail,
            StringFormat::Url => ErrorCode::InvalidUrl,
            StringFormat::Uuid => ErrorCode::InvalidUuid,
            StringFormat::Date => ErrorCode::InvalidDate,
            StringFormat::Datetime => ErrorCode::InvalidDatetime,
        }
    }

    fn message(self) -> &'static str {
        match self {
            StringFormat::Email => "Invalid email format",
            StringFormat::Url => "Invalid URL format",
            StringFormat::Uuid => "Invalid UUID format",
            StringFormat::Date => "Invalid date format (expected YYYY-MM-DD)",
            StringFormat::Datetime => "Invalid datetime format",
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
            StringFormat::Date => "date",
            StringFormat::Datetime => "datetime",
        };
        f.write_str(name)
    }
}

/// Validates strings.
///
/// Checks run in order: minimum length, maximum length, pattern, format.
/// Lengths count Unicode scalar values.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valguard_core::{ErrorCode, Schema};
///
/// let code = valguard_core::string().length(3).regex(regex::Regex::new("^[A-Z]+$").unwrap());
/// assert!(code.parse(&json!("USD")).is_success());
/// assert_eq!(code.parse(&json!("usd")).errors()[0].code, ErrorCode::StringPatternMismatch);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    base: SchemaBase<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    format: Option<StringFormat>,
}

impl StringSchema {
    pub fn new() -> Self {
        Default::default()
    }

    /// Requires at least `length` characters.
    pub fn min(&self, length: usize) -> Self {
        let mut next = self.clone();
        next.min_length = Some(length);
        next
    }

    /// Allows at most `length` characters.
    pub fn max(&self, length: usize) -> Self {
        let mut next = self.clone();
        next.max_length = Some(length);
        next
    }

    /// Requires exactly `length` characters.
    pub fn length(&self, length: usize) -> Self {
        let mut next = self.clone();
        next.min_length = Some(length);
        next.max_length = Some(length);
        next
    }

    /// Requires a match of `pattern`.
    pub fn regex(&self, pattern: Regex) -> Self {
        let mut next = self.clone();
        next.pattern = Some(pattern);
        next
    }

    /// Requires the given format. Replaces any previously set format.
    pub fn format(&self, format: StringFormat) -> Self {
        let mut next = self.clone();
        next.format = Some(format);
        next
    }

    pub fn email(&self) -> Self {
        self.format(StringFormat::Email)
    }

    pub fn url(&self) -> Self {
        self.format(StringFormat::Url)
    }

    pub fn uuid(&self) -> Self {
        self.format(StringFormat::Uuid)
    }

    pub fn date(&self) -> Self {
        self.format(StringFormat::Date)
    }

    pub fn datetime(&self) -> Self {
        self.format(StringFormat::Datetime)
    }

    pub fn format_kind(&self) -> Option<StringFormat> {
        self.format
    }
}

impl Schema for StringSchema {
    type Output = String;

    fn base(&self) -> &SchemaBase<String> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<String> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, ctx: &ValidationContext<'a>) -> ValidationResult<String> {
        let Some(text) = value.as_str() else {
            return ValidationResult::fail(invalid_type("string", value, ctx));
        };
        let length = text.chars().count();

        if let Some(min) = self.min_length {
            if length < min {
                return ValidationResult::fail(
                    ValidationError::new(
                        ErrorCode::StringTooShort,
                        format!("String must be at least {min} characters long"),
                        &ctx.path,
                    )
                    .with_received(length),
                );
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                return ValidationResult::fail(
                    ValidationError::new(
                        ErrorCode::StringTooLong,
                        format!("String must be at most {max} characters long"),
                        &ctx.path,
                    )
                    .with_received(length),
                );
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                return ValidationResult::fail(
                    ValidationError::new(
                        ErrorCode::StringPatternMismatch,
                        format!("String does not match pattern /{}/", pattern.as_str()),
                        &ctx.path,
                    )
                    .with_received(text)
                    .with_expected(pattern.as_str()),
                );
            }
        }

        if let Some(format) = self.format {
            if !format.accepts(text) {
                return ValidationResult::fail(
                    ValidationError::new(format.error_code(), format.message(), &ctx.path)
                        .with_received(text)
                        .with_expected(format.to_string()),
                );
            }
        }

        ValidationResult::Success(text.to_string())
    }
}

/// Validates numbers.
///
/// Checks run in order: integer, minimum, maximum, positive, negative.
/// Contradictory combinations are accepted and simply reject everything.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    base: SchemaBase<f64>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    integer: bool,
    positive: bool,
    negative: bool,
}

impl NumberSchema {
    pub fn new() -> Self {
        Default::default()
    }

    /// Requires `value >= min`.
    pub fn min(&self, min: f64) -> Self {
        let mut next = self.clone();
        next.min_value = Some(min);
        next
    }

    /// Requires `value <= max`.
    pub fn max(&self, max: f64) -> Self {
        let mut next = self.clone();
        next.max_value = Some(max);
        next
    }

    pub fn int(&self) -> Self {
        let mut next = self.clone();
        next.integer = true;
        next
    }

    pub fn positive(&self) -> Self {
        let mut next = self.clone();
        next.positive = true;
        next
    }

    pub fn negative(&self) -> Self {
        let mut next = self.clone();
        next.negative = true;
        next
    }
}

impl Schema for NumberSchema {
    type Output = f64;

    fn base(&self) -> &SchemaBase<f64> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<f64> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, ctx: &ValidationContext<'a>) -> ValidationResult<f64> {
        let number = match value.as_f64() {
            Some(n) if !n.is_nan() => n,
            _ => return ValidationResult::fail(invalid_type("number", value, ctx)),
        };

        let failure = |code: ErrorCode, message: String| {
            ValidationResult::fail(
                ValidationError::new(code, message, &ctx.path).with_received(value.clone()),
            )
        };

        if self.integer && !checks::is_integer(value) {
            return failure(ErrorCode::NotInteger, "Expected integer".to_string());
        }
        if let Some(min) = self.min_value {
            if number < min {
                return failure(
                    ErrorCode::NumberTooSmall,
                    format!("Number must be greater than or equal to {min}"),
                );
            }
        }
        if let Some(max) = self.max_value {
            if number > max {
                return failure(
                    ErrorCode::NumberTooLarge,
                    format!("Number must be less than or equal to {max}"),
                );
            }
        }
        if self.positive && number <= 0.0 {
            return failure(ErrorCode::NotPositive, "Number must be positive".to_string());
        }
        if self.negative && number >= 0.0 {
            return failure(ErrorCode::NotNegative, "Number must be negative".to_string());
        }

        ValidationResult::Success(number)
    }

    /// Passes the input number through untouched so integers beyond `f64`
    /// precision survive erasure.
    fn output_json(&self, input: &Value, output: f64) -> Value {
        match input {
            Value::Number(n) if n.as_f64() == Some(output) => input.clone(),
            _ => output.into_json(),
        }
    }
}

/// Validates booleans.
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    base: SchemaBase<bool>,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Schema for BooleanSchema {
    type Output = bool;

    fn base(&self) -> &SchemaBase<bool> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<bool> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, ctx: &ValidationContext<'a>) -> ValidationResult<bool> {
        match value.as_bool() {
            Some(flag) => ValidationResult::Success(flag),
            None => ValidationResult::fail(invalid_type("boolean", value, ctx)),
        }
    }
}

/// Accepts any present value. Still honors the missing/null gate.
#[derive(Debug, Clone, Default)]
pub struct AnySchema {
    base: SchemaBase<Value>,
}

impl AnySchema {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Schema for AnySchema {
    type Output = Value;

    fn base(&self) -> &SchemaBase<Value> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SchemaBase<Value> {
        &mut self.base
    }

    fn check<'a>(&self, value: &'a Value, _ctx: &ValidationContext<'a>) -> ValidationResult<Value> {
        ValidationResult::Success(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Parsed, PathSegment};

    fn code_of<S: Schema>(schema: &S, value: Value) -> ErrorCode {
        let result = schema.parse(&value);
        assert_eq!(result.errors().len(), 1, "expected exactly one error");
        result.errors()[0].code
    }

    #[test]
    fn test_string_rejects_non_string() {
        let result = StringSchema::new().parse(&json!(12));
        let err = &result.errors()[0];
        assert_eq!(err.code, ErrorCode::InvalidType);
        assert_eq!(err.message, "Expected string, received number");
        assert_eq!(err.expected.as_deref(), Some("string"));
    }

    #[test]
    fn test_string_first_failing_constraint_wins() {
        // too short and also not an email: only the length error is reported
        let schema = StringSchema::new().min(10).email();
        assert_eq!(code_of(&schema, json!("a@b")), ErrorCode::StringTooShort);

        let schema = StringSchema::new().max(3).regex(Regex::new("^[0-9]+$").unwrap());
        assert_eq!(code_of(&schema, json!("abcd")), ErrorCode::StringTooLong);
        assert_eq!(code_of(&schema, json!("abc")), ErrorCode::StringPatternMismatch);
    }

    #[test]
    fn test_string_length_counts_characters() {
        let schema = StringSchema::new().length(2);
        assert!(schema.parse(&json!("ğü")).is_success());
        assert_eq!(code_of(&schema, json!("ğüş")), ErrorCode::StringTooLong);
        assert_eq!(code_of(&schema, json!("ğ")), ErrorCode::StringTooShort);
    }

    #[test]
    fn test_string_length_error_echoes_length() {
        let result = StringSchema::new().min(5).parse(&json!("abc"));
        assert_eq!(result.errors()[0].received, Some(json!(3)));
    }

    #[test]
    fn test_string_formats() {
        assert_eq!(code_of(&StringSchema::new().email(), json!("nope")), ErrorCode::InvalidEmail);
        assert_eq!(code_of(&StringSchema::new().url(), json!("nope")), ErrorCode::InvalidUrl);
        assert_eq!(code_of(&StringSchema::new().uuid(), json!("nope")), ErrorCode::InvalidUuid);
        assert_eq!(code_of(&StringSchema::new().date(), json!("2024-02-30")), ErrorCode::InvalidDate);
        assert_eq!(code_of(&StringSchema::new().datetime(), json!("nope")), ErrorCode::InvalidDatetime);
        assert!(StringSchema::new().date().parse(&json!("2024-02-29")).is_success());
    }

    #[test]
    fn test_format_error_carries_context_path() {
        let result = StringSchema::new()
            .email()
            .parse_at(&json!("nope"), vec![PathSegment::from("contact")]);
        assert_eq!(result.errors()[0].path, vec![PathSegment::from("contact")]);
    }

    #[test]
    fn test_builder_does_not_mutate_receiver() {
        let a = StringSchema::new();
        let b = a.min(3);
        assert!(a.parse(&json!("x")).is_success());
        assert!(b.parse(&json!("x")).is_failure());
    }

    #[test]
    fn test_number_rejects_non_number() {
        assert_eq!(code_of(&NumberSchema::new(), json!("1")), ErrorCode::InvalidType);
        assert_eq!(code_of(&NumberSchema::new(), json!(true)), ErrorCode::InvalidType);
    }

    #[test]
    fn test_number_check_order() {
        let schema = NumberSchema::new().int().min(0.0).max(120.0);
        assert_eq!(code_of(&schema, json!(-1.5)), ErrorCode::NotInteger);
        assert_eq!(code_of(&schema, json!(-1)), ErrorCode::NumberTooSmall);
        assert_eq!(code_of(&schema, json!(121)), ErrorCode::NumberTooLarge);
        assert_eq!(
            schema.parse(&json!(31)),
            ValidationResult::Success(Parsed::Value(31.0))
        );
    }

    #[test]
    fn test_number_sign_checks() {
        assert_eq!(code_of(&NumberSchema::new().positive(), json!(0)), ErrorCode::NotPositive);
        assert_eq!(code_of(&NumberSchema::new().negative(), json!(0)), ErrorCode::NotNegative);
        assert!(NumberSchema::new().negative().parse(&json!(-0.1)).is_success());
    }

    #[test]
    fn test_number_erasure_keeps_integers_beyond_f64_precision() {
        let schema = NumberSchema::new().int().positive().boxed();
        let big = json!(9_007_199_254_740_993u64);
        assert_eq!(
            schema.validate(Some(&big), Vec::new()),
            ValidationResult::Success(Some(big.clone()))
        );
        assert_eq!(
            NumberSchema::new().boxed().validate(Some(&json!(2.5)), Vec::new()),
            ValidationResult::Success(Some(json!(2.5)))
        );
        assert_eq!(
            NumberSchema::new().opt().default(7.0).boxed().validate(None, Vec::new()),
            ValidationResult::Success(Some(json!(7)))
        );
    }

    #[test]
    fn test_datetime_accepts_reduced_iso_forms() {
        let schema = StringSchema::new().datetime();
        for text in ["2024-01-15T10:30Z", "2024-01-15T10:30+02:00", "2024-01", "2024"] {
            assert!(schema.parse(&json!(text)).is_success(), "{text}");
        }
        assert_eq!(code_of(&schema, json!("2024-1")), ErrorCode::InvalidDatetime);
    }

    #[test]
    fn test_number_contradiction_rejects_everything() {
        let schema = NumberSchema::new().positive().max(-1.0);
        assert_eq!(code_of(&schema, json!(5)), ErrorCode::NumberTooLarge);
        assert_eq!(code_of(&schema, json!(-5)), ErrorCode::NotPositive);
    }

    #[test]
    fn test_boolean_and_any() {
        assert!(BooleanSchema::new().parse(&json!(false)).is_success());
        assert_eq!(code_of(&BooleanSchema::new(), json!("true")), ErrorCode::InvalidType);

        let any = AnySchema::new();
        assert_eq!(
            any.parse(&json!({"x": [1]})),
            ValidationResult::Success(Parsed::Value(json!({"x": [1]})))
        );
        assert_eq!(code_of(&any, Value::Null), ErrorCode::NotNullable);
    }
}
