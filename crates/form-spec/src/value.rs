use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured postal address captured by address fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        [&self.street, &self.city, &self.zip]
            .into_iter()
            .all(|part| part.as_deref().is_none_or(str::is_empty))
    }
}

/// A single value held in the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Address(Address),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Presence as seen by the `required` rule.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Address(address) => !address.is_empty(),
        }
    }

    /// Human-friendly rendering for prompts and summaries.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Address(address) => [&address.street, &address.city, &address.zip]
                .into_iter()
                .filter_map(|part| part.as_deref())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Address> for FieldValue {
    fn from(value: Address) -> Self {
        FieldValue::Address(value)
    }
}

/// Live values keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ValueBag {
    values: BTreeMap<String, FieldValue>,
}

impl ValueBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_key: &str) -> Option<&FieldValue> {
        self.values.get(field_key)
    }

    pub fn get_mut(&mut self, field_key: &str) -> Option<&mut FieldValue> {
        self.values.get_mut(field_key)
    }

    pub fn insert(&mut self, field_key: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field_key.into(), value.into());
    }

    pub fn remove(&mut self, field_key: &str) -> Option<FieldValue> {
        self.values.remove(field_key)
    }

    pub fn contains_key(&self, field_key: &str) -> bool {
        self.values.contains_key(field_key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Builds a bag from arbitrary JSON without failing.
    ///
    /// Numbers become their decimal text. Booleans, nulls and arrays holding
    /// non-strings are dropped and therefore count as absent.
    pub fn from_json_lossy(value: &Value) -> Self {
        let mut bag = Self::new();
        let Some(map) = value.as_object() else {
            return bag;
        };
        for (key, raw) in map {
            match coerce_value(raw) {
                Some(value) => bag.insert(key.clone(), value),
                None => tracing::warn!(field = %key, "dropping value of unsupported kind"),
            }
        }
        bag
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn coerce_value(raw: &Value) -> Option<FieldValue> {
    match raw {
        Value::String(text) => Some(FieldValue::Text(text.clone())),
        Value::Number(number) => Some(FieldValue::Text(number.to_string())),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(FieldValue::List),
        Value::Object(_) => serde_json::from_value(raw.clone())
            .ok()
            .map(FieldValue::Address),
        Value::Bool(_) | Value::Null => None,
    }
}

impl FromIterator<(String, FieldValue)> for ValueBag {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lossy_parse_coerces_numbers_and_drops_flags() {
        let bag = ValueBag::from_json_lossy(&json!({
            "amount": 12.5,
            "name": "Ada",
            "tags": ["a", "b"],
            "mixed": ["a", 1],
            "flag": true,
            "nothing": null,
            "home": { "street": "1 Main", "city": "Springfield" }
        }));
        assert_eq!(bag.get("amount"), Some(&FieldValue::Text("12.5".into())));
        assert_eq!(bag.get("name").and_then(FieldValue::as_text), Some("Ada"));
        assert_eq!(bag.get("tags").and_then(FieldValue::as_list).map(|items| items.len()), Some(2));
        assert!(!bag.contains_key("mixed"));
        assert!(!bag.contains_key("flag"));
        assert!(!bag.contains_key("nothing"));
        assert!(matches!(bag.get("home"), Some(FieldValue::Address(_))));
    }

    #[test]
    fn presence_follows_value_kind() {
        assert!(!FieldValue::from("").is_present());
        assert!(FieldValue::from("x").is_present());
        assert!(!FieldValue::List(vec![]).is_present());
        assert!(FieldValue::List(vec![String::new()]).is_present());
        assert!(!FieldValue::Address(Address::default()).is_present());
        let address = Address {
            zip: Some("12345".into()),
            ..Address::default()
        };
        assert!(FieldValue::Address(address).is_present());
    }

    #[test]
    fn untagged_wire_format() {
        let value: FieldValue = serde_json::from_value(json!({"city": "Oslo"})).expect("address");
        assert_eq!(value.display(), "Oslo");
        assert_eq!(serde_json::to_value(&value).expect("json"), json!({"city": "Oslo"}));
    }
}
