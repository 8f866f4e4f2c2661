//! Registry files: named schema definitions on disk.
//!
//! A registry file is YAML (`.yml`/`.yaml`) or JSON (any other extension).
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! schemas:
//!   - name: address
//!     schema:
//!       type: object
//!       strict: true
//!       shape:
//!         street: { type: string, min: 1 }
//!         zip: { type: string, pattern: "^[0-9]{5}$" }
//!   - name: user
//!     schema:
//!       type: object
//!       shape:
//!         email: { type: string, format: email }
//!         home: { type: ref, name: address }
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::definition::SchemaDefinition;
use crate::error::Result;

/// One named entry of a [`RegistryFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedDefinition {
    /// Name the schema is registered under.
    pub name: String,
    pub schema: SchemaDefinition,
}

/// Top-level registry file.
///
/// Entries are compiled in file order; a `ref` may only name an entry that
/// appears earlier.
///
/// # Examples
///
/// ```
/// use valguard_registry::RegistryFile;
///
/// let file = RegistryFile::from_yaml_str(
///     "version: \"1.0\"\nschemas:\n  - name: id\n    schema: { type: string, format: uuid }\n",
/// )
/// .unwrap();
/// assert_eq!(file.schemas[0].name, "id");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    /// Format version (e.g., `"1.0"`).
    pub version: String,
    #[serde(default)]
    pub schemas: Vec<NamedDefinition>,
}

impl Default for RegistryFile {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            schemas: Vec::new(),
        }
    }
}

impl RegistryFile {
    /// Loads a registry file, choosing YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) /
    /// [`JsonError`](crate::RegistryError::JsonError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = if is_yaml(path) {
            serde_yaml::from_reader(reader)?
        } else {
            serde_json::from_reader(reader)?
        };
        Ok(config)
    }

    /// Saves the file, choosing YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        if is_yaml(path) {
            serde_yaml::to_writer(writer, self)?;
        } else {
            serde_json::to_writer_pretty(writer, self)?;
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Appends a named definition.
    pub fn push(&mut self, name: impl Into<String>, schema: SchemaDefinition) {
        self.schemas.push(NamedDefinition {
            name: name.into(),
            schema,
        });
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml")
    )
}
