use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::spec::FormSpec;
use crate::validate::{ValidationResult, validate};
use crate::value::{FieldValue, ValueBag};

/// Canonical, schema-ordered subset of the value bag.
///
/// Every schema field holding a value is exported, hidden ones included;
/// absent values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPayload {
    entries: Vec<(String, FieldValue)>,
}

impl ExportPayload {
    pub fn build(spec: &FormSpec, values: &ValueBag) -> Self {
        let entries = spec
            .fields
            .iter()
            .filter_map(|field| {
                values
                    .get(&field.field_key)
                    .map(|value| (field.field_key.clone(), value.clone()))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, field_key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == field_key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact JSON with keys in schema order.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Object form of the payload. Key order follows serde_json's map type.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Serialize for ExportPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Validates, then builds the payload only when no visible field fails.
pub fn try_submit(spec: &FormSpec, values: &ValueBag) -> Result<ExportPayload, ValidationResult> {
    let result = validate(spec, values);
    if result.is_valid() {
        Ok(ExportPayload::build(spec, values))
    } else {
        Err(result)
    }
}
