//! Builder functions for every schema type.
//!
//! These are the public entry points; each returns a fresh schema value
//! that can be refined further through its fluent methods.

use crate::complex::{ArraySchema, LiteralSchema, LiteralValue, ObjectSchema, UnionSchema};
use crate::primitives::{AnySchema, BooleanSchema, NumberSchema, StringSchema};
use crate::schema::{IntoSchemaRef, Schema, SchemaRef};

pub fn string() -> StringSchema {
    StringSchema::new()
}

pub fn number() -> NumberSchema {
    NumberSchema::new()
}

pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

pub fn any() -> AnySchema {
    AnySchema::new()
}

/// An object schema with no fields; add them with [`ObjectSchema::field`].
pub fn object() -> ObjectSchema {
    ObjectSchema::new()
}

/// An object schema over `(key, schema)` pairs.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valguard_core::{Schema, number, object_of, string};
///
/// let person = object_of([
///     ("name", string().min(2).max(50).boxed()),
///     ("age", number().int().min(0.0).max(120.0).boxed()),
/// ]);
/// let parsed = person.safe_parse(&json!({"name": "Jo", "age": 31})).unwrap();
/// assert_eq!(parsed.into_value().unwrap()["age"], json!(31));
/// ```
pub fn object_of<K, I>(shape: I) -> ObjectSchema
where
    K: Into<String>,
    I: IntoIterator<Item = (K, SchemaRef)>,
{
    ObjectSchema::from_shape(shape)
}

/// An array schema; `None` lets any elements through.
pub fn array(element: Option<SchemaRef>) -> ArraySchema {
    match element {
        Some(element) => ArraySchema::of(element),
        None => ArraySchema::new(),
    }
}

/// An array schema whose elements must satisfy `element`.
pub fn array_of(element: impl IntoSchemaRef) -> ArraySchema {
    ArraySchema::of(element)
}

/// A union trying `members` in order.
pub fn union(members: Vec<SchemaRef>) -> UnionSchema {
    UnionSchema::new(members)
}

pub fn literal(value: impl Into<LiteralValue>) -> LiteralSchema {
    LiteralSchema::new(value)
}

/// A union of one literal per allowed value.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valguard_core::{ErrorCode, Schema, enumeration};
///
/// let currency = enumeration(["USD", "EUR", "GBP"]);
/// assert!(currency.parse(&json!("EUR")).is_success());
/// assert_eq!(currency.parse(&json!("TRY")).errors()[0].code, ErrorCode::UnionMismatch);
/// ```
pub fn enumeration<V, I>(values: I) -> UnionSchema
where
    V: Into<LiteralValue>,
    I: IntoIterator<Item = V>,
{
    UnionSchema::new(
        values
            .into_iter()
            .map(|value| LiteralSchema::new(value).boxed())
            .collect(),
    )
}

/// Same as `schema.opt()`.
pub fn optional<S: Schema>(schema: &S) -> S {
    schema.opt()
}

/// Same as `schema.null()`.
pub fn nullable<S: Schema>(schema: &S) -> S {
    schema.null()
}

pub fn email() -> StringSchema {
    string().email()
}

pub fn url() -> StringSchema {
    string().url()
}

pub fn uuid() -> StringSchema {
    string().uuid()
}

pub fn date() -> StringSchema {
    string().date()
}

pub fn datetime() -> StringSchema {
    string().datetime()
}

pub fn integer() -> NumberSchema {
    number().int()
}

pub fn positive() -> NumberSchema {
    number().positive()
}

pub fn negative() -> NumberSchema {
    number().negative()
}

/// An array schema requiring at least one element.
pub fn non_empty_array(element: Option<SchemaRef>) -> ArraySchema {
    array(element).nonempty()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ErrorCode, Parsed, ValidationResult};

    #[test]
    fn test_presets_match_their_builders() {
        assert!(email().parse(&json!("a@b.com")).is_success());
        assert_eq!(email().parse(&json!("not-an-email")).errors()[0].code, ErrorCode::InvalidEmail);
        assert!(uuid().parse(&json!("123e4567-e89b-12d3-a456-426614174000")).is_success());
        assert!(url().parse(&json!("https://example.com")).is_success());
        assert!(date().parse(&json!("2024-05-01")).is_success());
        assert!(datetime().parse(&json!("2024-05-01T12:00:00Z")).is_success());
        assert_eq!(integer().parse(&json!(1.5)).errors()[0].code, ErrorCode::NotInteger);
        assert_eq!(positive().parse(&json!(-1)).errors()[0].code, ErrorCode::NotPositive);
        assert_eq!(negative().parse(&json!(1)).errors()[0].code, ErrorCode::NotNegative);
    }

    #[test]
    fn test_non_empty_array() {
        let schema = non_empty_array(Some(string().boxed()));
        assert_eq!(schema.parse(&json!([])).errors()[0].code, ErrorCode::ArrayTooSmall);
        assert!(non_empty_array(None).parse(&json!([1])).is_success());
    }

    #[test]
    fn test_enumeration_accepts_only_listed_values() {
        let status = enumeration([1, 2, 3]);
        assert!(status.parse(&json!(2)).is_success());
        assert!(status.parse(&json!(4)).is_failure());
    }

    #[test]
    fn test_optional_and_nullable_helpers() {
        let base = boolean();
        assert_eq!(
            optional(&base).parse_input(None, Vec::new()),
            ValidationResult::Success(Parsed::Missing)
        );
        assert_eq!(nullable(&base).parse(&json!(null)), ValidationResult::Success(Parsed::Null));
        assert!(base.parse(&json!(null)).is_failure());
    }

    #[test]
    fn test_any_accepts_everything_present() {
        assert!(any().parse(&json!([1, {"a": null}])).is_success());
        assert_eq!(
            any().parse_input(None, Vec::new()).errors()[0].code,
            ErrorCode::Required
        );
    }
}
