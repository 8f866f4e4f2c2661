//! Named schema lookup with builder pattern and fallback chains.
//!
//! [`SchemaRegistry`] holds compiled schemas by name and is the named
//! validation entry point for host integrations.
//!
//! ```no_run
//! use serde_json::json;
//! use valguard_registry::SchemaRegistry;
//!
//! let registry = SchemaRegistry::from_file("schemas.yml").unwrap();
//! let outcome = registry.validate("user", &json!({"email": "a@b.com"}), "").unwrap();
//! if !outcome.is_valid {
//!     for error in outcome.errors.unwrap_or_default() {
//!         eprintln!("{error}");
//!     }
//! }
//!
//! // Fallback chain: the first file that loads wins
//! let registry = SchemaRegistry::builder()
//!     .from_file("/etc/app/schemas.yml")
//!     .from_file("schemas.json")
//!     .build()
//!     .unwrap();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use valguard_core::{SchemaRef, ValidationError, ValidationResult, split_dotted_path};

use crate::config::RegistryFile;
use crate::error::{RegistryError, Result};

/// Describes where a [`SchemaRegistry`]'s schemas came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrySource {
    /// Built in code or from an in-memory document.
    Inline,
    /// Loaded from a single registry file.
    File(PathBuf),
    /// Loaded via a fallback chain, or merged from several files.
    Multiple(Vec<RegistrySource>),
}

/// Result of a named validation.
///
/// On success `value` is the parsed data and `errors` is `None`. On failure
/// `value` echoes the input and `errors` holds every reported error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

impl ValidationOutcome {
    fn from_result(result: ValidationResult<Option<Value>>, input: &Value) -> Self {
        match result {
            ValidationResult::Success(value) => Self {
                is_valid: true,
                value,
                errors: None,
            },
            ValidationResult::Failure(errors) => Self {
                is_valid: false,
                value: Some(input.clone()),
                errors: Some(errors),
            },
        }
    }
}

/// Compiled schemas indexed by name.
///
/// Schemas are immutable once registered, so a registry can be shared across
/// threads and validated against concurrently.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valguard_core::number;
/// use valguard_registry::SchemaRegistry;
///
/// let mut registry = SchemaRegistry::new();
/// registry.register("qty", number().int().positive()).unwrap();
///
/// let outcome = registry.validate("qty", &json!(3), "").unwrap();
/// assert!(outcome.is_valid);
/// let outcome = registry.validate("qty", &json!(-1), "line.qty").unwrap();
/// assert_eq!(outcome.errors.unwrap()[0].to_string(), "line.qty: Number must be positive");
/// ```
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaRef>,
    source: RegistrySource,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("SchemaRegistry")
            .field("schemas", &names)
            .field("source", &self.source)
            .finish()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            source: RegistrySource::Inline,
        }
    }

    /// Returns a new [`RegistryBuilder`] for configuring a fallback chain.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Loads and compiles a registry file (YAML or JSON by extension).
    ///
    /// # Errors
    ///
    /// Returns an I/O or parse error for an unreadable file, or a compile
    /// error ([`RegistryError::UnknownReference`], [`RegistryError::InvalidPattern`],
    /// [`RegistryError::InvalidDefault`], [`RegistryError::DuplicateSchema`]).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut registry = Self::new();
        registry.load_file(path.as_ref())?;
        registry.source = RegistrySource::File(path.as_ref().to_path_buf());
        Ok(registry)
    }

    /// Compiles a registry from a YAML document.
    pub fn from_str_yaml(text: &str) -> Result<Self> {
        let mut registry = Self::new();
        registry.load(RegistryFile::from_yaml_str(text)?)?;
        Ok(registry)
    }

    /// Compiles a registry from a JSON document.
    pub fn from_str_json(text: &str) -> Result<Self> {
        let mut registry = Self::new();
        registry.load(RegistryFile::from_json_str(text)?)?;
        Ok(registry)
    }

    /// Merges another registry file into this registry.
    ///
    /// Definitions may reference schemas registered before the call. The
    /// registry is left unchanged if any definition fails to compile.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file).
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let was_empty = self.schemas.is_empty();
        let count = self.load(RegistryFile::load(path)?)?;
        info!(count, path = %path.display(), "loaded schema registry file");

        let loaded = RegistrySource::File(path.to_path_buf());
        self.source = match std::mem::replace(&mut self.source, RegistrySource::Inline) {
            RegistrySource::Inline if was_empty => loaded,
            RegistrySource::Multiple(mut sources) => {
                sources.push(loaded);
                RegistrySource::Multiple(sources)
            }
            previous => RegistrySource::Multiple(vec![previous, loaded]),
        };
        Ok(count)
    }

    /// Compiles every definition of `file` and registers it.
    ///
    /// Returns the number of schemas added.
    pub fn load(&mut self, file: RegistryFile) -> Result<usize> {
        let mut known = self.schemas.clone();
        let mut added = Vec::with_capacity(file.schemas.len());

        for entry in file.schemas {
            if added.contains(&entry.name) {
                return Err(RegistryError::DuplicateSchema(entry.name));
            }
            let schema = entry.schema.compile(&known)?;
            debug!(name = %entry.name, "compiled schema definition");
            known.insert(entry.name.clone(), schema);
            added.push(entry.name);
        }

        self.schemas = known;
        Ok(added.len())
    }

    /// Registers a schema, replacing any existing entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaRef) {
        self.schemas.insert(name.into(), schema);
    }

    /// Registers a schema under a new name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSchema`] if `name` is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        schema: impl valguard_core::IntoSchemaRef,
    ) -> Result<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateSchema(name));
        }
        self.schemas.insert(name, schema.into_schema_ref());
        Ok(())
    }

    /// Looks up a schema by name.
    pub fn get(&self, name: &str) -> Option<&SchemaRef> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    pub fn source(&self) -> &RegistrySource {
        &self.source
    }

    /// Validates `value` against the schema registered as `name`.
    ///
    /// `path` is a dot-separated starting path prefixed to every error path;
    /// the empty string means the root.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSchema`] if no schema has that name.
    /// Validation failures are reported in the outcome, not as an error.
    pub fn validate(&self, name: &str, value: &Value, path: &str) -> Result<ValidationOutcome> {
        let schema = self.require(name)?;
        let result = schema.validate(Some(value), split_dotted_path(path));
        Ok(ValidationOutcome::from_result(result, value))
    }

    /// Validates many documents against one schema in parallel.
    ///
    /// Outcomes are returned in input order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSchema`] if no schema has that name.
    pub fn validate_batch(&self, name: &str, values: &[Value]) -> Result<Vec<ValidationOutcome>> {
        let schema = self.require(name)?;
        let outcomes: Vec<ValidationOutcome> = values
            .par_iter()
            .map(|value| ValidationOutcome::from_result(schema.validate(Some(value), Vec::new()), value))
            .collect();

        let invalid = outcomes.iter().filter(|o| !o.is_valid).count();
        debug!(schema = name, total = outcomes.len(), invalid, "validated batch");
        Ok(outcomes)
    }

    fn require(&self, name: &str) -> Result<&SchemaRef> {
        self.schemas
            .get(name)
            .ok_or_else(|| RegistryError::UnknownSchema(name.to_string()))
    }
}

/// Builder for constructing a [`SchemaRegistry`] with a fallback chain.
///
/// Files are tried in the order they are added. The first one that loads and
/// compiles wins; if all fail, [`RegistryError::NoSourcesAvailable`] is
/// returned.
pub struct RegistryBuilder {
    sources: Vec<PathBuf>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a registry file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Attempts to load the configured files in order.
    pub fn build(self) -> Result<SchemaRegistry> {
        let all_sources: Vec<RegistrySource> = self
            .sources
            .iter()
            .cloned()
            .map(RegistrySource::File)
            .collect();

        for path in &self.sources {
            match SchemaRegistry::from_file(path) {
                Ok(mut registry) => {
                    registry.source = RegistrySource::Multiple(all_sources);
                    return Ok(registry);
                }
                Err(err) => debug!(path = %path.display(), error = %err, "registry source failed"),
            }
        }

        Err(RegistryError::NoSourcesAvailable)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use valguard_core::{ErrorCode, Schema, object, string};

    use super::*;

    const ADDRESS_YAML: &str = r#"
version: "1.0"
schemas:
  - name: address
    schema:
      type: object
      strict: true
      shape:
        street: { type: string, min: 1 }
        zip: { type: string, pattern: "^[0-9]{5}$" }
"#;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_from_str_yaml() {
        let registry = SchemaRegistry::from_str_yaml(ADDRESS_YAML).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("address"));
        assert_eq!(registry.source(), &RegistrySource::Inline);
    }

    #[test]
    fn test_validate_success_returns_parsed_value() {
        let registry = SchemaRegistry::from_str_yaml(ADDRESS_YAML).unwrap();
        let input = json!({"street": "Main St", "zip": "12345"});
        let outcome = registry.validate("address", &input, "").unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome {
                is_valid: true,
                value: Some(input),
                errors: None,
            }
        );
    }

    #[test]
    fn test_validate_failure_echoes_input_and_prefixes_path() {
        let registry = SchemaRegistry::from_str_yaml(ADDRESS_YAML).unwrap();
        let input = json!({"street": "", "zip": "1234", "extra": true});
        let outcome = registry.validate("address", &input, "order.shipping").unwrap();

        assert!(!outcome.is_valid);
        assert_eq!(outcome.value, Some(input));
        let rendered: Vec<String> = outcome
            .errors
            .unwrap()
            .iter()
            .map(|e| format!("{} {}", valguard_core::display_path(&e.path), e.code))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "order.shipping.street string_too_short",
                "order.shipping.zip string_pattern_mismatch",
                "order.shipping.extra unknown_key",
            ]
        );
    }

    #[test]
    fn test_validate_unknown_schema() {
        let registry = SchemaRegistry::new();
        let result = registry.validate("nope", &json!(1), "");
        assert!(matches!(result, Err(RegistryError::UnknownSchema(name)) if name == "nope"));
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let mut registry = SchemaRegistry::new();
        registry.register("name", string().min(2)).unwrap();
        let outcome = registry.validate("name", &json!("x"), "").unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["isValid"], json!(false));
        assert_eq!(json["value"], json!("x"));
        assert_eq!(json["errors"][0]["code"], json!("string_too_short"));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = SchemaRegistry::new();
        registry.register("a", string()).unwrap();
        assert!(matches!(
            registry.register("a", string()),
            Err(RegistryError::DuplicateSchema(_))
        ));
        registry.insert("a", object().boxed());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_in_one_file() {
        let yaml = r#"
version: "1.0"
schemas:
  - { name: a, schema: { type: string } }
  - { name: a, schema: { type: number } }
"#;
        let err = SchemaRegistry::from_str_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSchema(name) if name == "a"));
    }

    #[test]
    fn test_ref_must_precede_use() {
        let yaml = r#"
version: "1.0"
schemas:
  - { name: user, schema: { type: object, shape: { id: { type: ref, name: id } } } }
  - { name: id, schema: { type: string } }
"#;
        let err = SchemaRegistry::from_str_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownReference(name) if name == "id"));
    }

    #[test]
    fn test_failed_load_leaves_registry_unchanged() {
        let mut registry = SchemaRegistry::from_str_yaml(ADDRESS_YAML).unwrap();
        let bad = RegistryFile::from_yaml_str(
            "version: \"1.0\"\nschemas:\n  - { name: ok, schema: { type: any } }\n  - { name: bad, schema: { type: ref, name: missing } }\n",
        )
        .unwrap();
        assert!(registry.load(bad).is_err());
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("ok"));
    }

    #[test]
    fn test_load_file_merges_and_resolves_existing_names() {
        let dir = tempfile::tempdir().unwrap();
        let first = write(dir.path(), "address.yml", ADDRESS_YAML);
        let second = write(
            dir.path(),
            "user.json",
            r#"{"version": "1.0", "schemas": [
                {"name": "user", "schema": {"type": "object", "shape": {
                    "home": {"type": "ref", "name": "address"}
                }}}
            ]}"#,
        );

        let mut registry = SchemaRegistry::from_file(&first).unwrap();
        assert_eq!(registry.source(), &RegistrySource::File(first.clone()));

        assert_eq!(registry.load_file(&second).unwrap(), 1);
        assert_eq!(
            registry.source(),
            &RegistrySource::Multiple(vec![
                RegistrySource::File(first),
                RegistrySource::File(second),
            ])
        );

        let mut names: Vec<&str> = registry.names().collect();
        names.sort();
        assert_eq!(names, vec!["address", "user"]);

        let outcome = registry
            .validate("user", &json!({"home": {"street": "x", "zip": "abc"}}), "")
            .unwrap();
        let errors = outcome.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::StringPatternMismatch);
        assert_eq!(
            errors[0].to_string(),
            "home.zip: String does not match pattern /^[0-9]{5}$/"
        );
    }

    #[test]
    fn test_load_file_over_code_schemas_keeps_inline_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "address.yml", ADDRESS_YAML);

        let mut registry = SchemaRegistry::new();
        registry.register("address", string()).unwrap();
        assert_eq!(registry.load_file(&path).unwrap(), 1);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.source(),
            &RegistrySource::Multiple(vec![RegistrySource::Inline, RegistrySource::File(path)])
        );
        assert!(!registry.validate("address", &json!("text"), "").unwrap().is_valid);
    }

    #[test]
    fn test_validate_batch_preserves_order() {
        let registry = SchemaRegistry::from_str_yaml(ADDRESS_YAML).unwrap();
        let values: Vec<Value> = (0..64)
            .map(|i| {
                if i % 3 == 0 {
                    json!({"street": "s", "zip": "bad"})
                } else {
                    json!({"street": "s", "zip": format!("{:05}", i)})
                }
            })
            .collect();

        let outcomes = registry.validate_batch("address", &values).unwrap();
        assert_eq!(outcomes.len(), values.len());
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.is_valid, i % 3 != 0, "document {i}");
            assert_eq!(outcome.value.as_ref(), Some(&values[i]));
        }
    }

    #[test]
    fn test_builder_fallback_first_fails() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "schemas.yml", ADDRESS_YAML);
        let missing = dir.path().join("absent.yml");

        let registry = SchemaRegistry::builder()
            .from_file(&missing)
            .from_file(&good)
            .build()
            .unwrap();
        assert!(registry.contains("address"));
        assert_eq!(
            registry.source(),
            &RegistrySource::Multiple(vec![
                RegistrySource::File(missing),
                RegistrySource::File(good),
            ])
        );
    }

    #[test]
    fn test_builder_all_fail() {
        let result = SchemaRegistry::builder()
            .from_file("/nonexistent/one.yml")
            .from_file("/nonexistent/two.json")
            .build();
        assert!(matches!(result, Err(RegistryError::NoSourcesAvailable)));
        assert!(matches!(
            RegistryBuilder::default().build(),
            Err(RegistryError::NoSourcesAvailable)
        ));
    }
}
