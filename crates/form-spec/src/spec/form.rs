use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::field::FieldDefinition;

/// Structural problems detected in a form definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("failed to parse form spec: {0}")]
    Parse(String),
    #[error("field key '{0}' is defined more than once")]
    DuplicateKey(String),
    #[error("field '{0}' cannot depend on its own value")]
    SelfDependency(String),
    #[error("field '{0}' requires at least one option")]
    MissingOptions(String),
    #[error("field '{field}' has minLength {min} above maxLength {max}")]
    LengthBounds { field: String, min: usize, max: usize },
}

fn default_id() -> String {
    "form".into()
}

fn default_title() -> String {
    "Untitled Form".into()
}

/// Ordered field definitions plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpecDocument {
    Fields(Vec<FieldDefinition>),
    Form(FormSpec),
}

impl FormSpec {
    pub fn from_fields(fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: default_id(),
            title: default_title(),
            description: None,
            fields,
        }
    }

    /// Parses either a full form object or a bare array of field definitions.
    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        let document: SpecDocument =
            serde_json::from_str(raw).map_err(|err| SchemaError::Parse(err.to_string()))?;
        Ok(match document {
            SpecDocument::Fields(fields) => Self::from_fields(fields),
            SpecDocument::Form(spec) => spec,
        })
    }

    pub fn field(&self, field_key: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.field_key == field_key)
    }

    /// Verifies the structural invariants a session relies on.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.field_key.as_str()) {
                return Err(SchemaError::DuplicateKey(field.field_key.clone()));
            }
            if let Some(clause) = &field.visibility
                && clause.field_key == field.field_key
            {
                return Err(SchemaError::SelfDependency(field.field_key.clone()));
            }
            if field.kind.requires_options() && field.options.is_empty() {
                return Err(SchemaError::MissingOptions(field.field_key.clone()));
            }
            if let Some(constraint) = &field.validation
                && let (Some(min), Some(max)) =
                    (constraint.effective_min(), constraint.effective_max())
                && min > max
            {
                return Err(SchemaError::LengthBounds {
                    field: field.field_key.clone(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// JSON Schema describing a form spec document.
pub fn spec_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(FormSpec)).unwrap_or_default()
}
