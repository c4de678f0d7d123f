//! JSON Schema check for the canonical OKR document.
//!
//! The default schema ships inside the binary; `--schema` swaps in a file.

use std::path::Path;

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::error::SchemaValidationError;

const DEFAULT_SCHEMA: &str = include_str!("../schemas/okr_summary.json");

pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Load and compile a schema, or the embedded one when `schema_path` is None.
    pub fn new(schema_path: Option<&Path>) -> Result<Self, SchemaValidationError> {
        let schema = match schema_path {
            Some(path) => load_schema(path)?,
            None => serde_json::from_str(DEFAULT_SCHEMA).map_err(|e| {
                SchemaValidationError::Load {
                    path: "<embedded okr_summary.json>".into(),
                    reason: e.to_string(),
                }
            })?,
        };

        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| SchemaValidationError::Compile(e.to_string()))?;

        Ok(Self { compiled })
    }

    /// Check `instance`, reporting the first violation.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        if let Err(mut errors) = self.compiled.validate(instance) {
            if let Some(first) = errors.next() {
                let path = first.instance_path.to_string();
                return Err(SchemaValidationError::Invalid {
                    path: if path.is_empty() { "/".to_string() } else { path },
                    message: first.to_string(),
                });
            }
        }
        tracing::debug!("schema validation passed");
        Ok(())
    }
}

fn load_schema(path: &Path) -> Result<Value, SchemaValidationError> {
    let load_err = |reason: String| SchemaValidationError::Load {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))
}
