use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::{Constraint, FieldDefinition, FormSpec};
use crate::value::{FieldValue, ValueBag};
use crate::visibility::visible_fields;

/// Reason a visible field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    MinLength,
    MaxLength,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::MinLength => "min_length",
            ErrorKind::MaxLength => "max_length",
        }
    }

    /// Inline message shown next to the field.
    pub fn message(&self, constraint: Option<&Constraint>) -> String {
        let limit = |pick: fn(&Constraint) -> Option<usize>| {
            constraint.and_then(pick).unwrap_or_default()
        };
        match self {
            ErrorKind::Required => "Required".to_string(),
            ErrorKind::MinLength => format!("Min {}", limit(Constraint::effective_min)),
            ErrorKind::MaxLength => format!("Max {}", limit(Constraint::effective_max)),
        }
    }
}

/// Failing field keys mapped to their reason; empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<String, ErrorKind>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field_key: &str) -> Option<ErrorKind> {
        self.errors.get(field_key).copied()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ErrorKind)> {
        self.errors.iter()
    }

    pub fn message_for(&self, field: &FieldDefinition) -> Option<String> {
        self.get(&field.field_key)
            .map(|kind| kind.message(field.validation.as_ref()))
    }
}

/// Validates every visible field; hidden fields never report errors.
pub fn validate(spec: &FormSpec, values: &ValueBag) -> ValidationResult {
    let errors = visible_fields(spec, values)
        .filter_map(|field| {
            check_field(field, values.get(&field.field_key))
                .map(|kind| (field.field_key.clone(), kind))
        })
        .collect();
    ValidationResult { errors }
}

/// Runs required, min and max in order; the last failing rule wins.
fn check_field(field: &FieldDefinition, value: Option<&FieldValue>) -> Option<ErrorKind> {
    let constraint = field.validation.as_ref()?;
    let mut failure = None;

    if constraint.required && !value.is_some_and(FieldValue::is_present) {
        failure = Some(ErrorKind::Required);
    }

    if let Some(text) = value.and_then(FieldValue::as_text) {
        let len = text.chars().count();
        if let Some(min) = constraint.effective_min()
            && len < min
        {
            failure = Some(ErrorKind::MinLength);
        }
        if let Some(max) = constraint.effective_max()
            && len > max
        {
            failure = Some(ErrorKind::MaxLength);
        }
    }

    failure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::FieldType;

    fn constrained(min: Option<usize>, max: Option<usize>, required: bool) -> FieldDefinition {
        FieldDefinition::new("f", FieldType::Text).with_validation(Constraint {
            required,
            min_length: min,
            max_length: max,
        })
    }

    #[test]
    fn later_rule_overwrites_required() {
        let field = constrained(Some(3), None, true);
        assert_eq!(
            check_field(&field, Some(&FieldValue::from(""))),
            Some(ErrorKind::MinLength)
        );
        assert_eq!(check_field(&field, None), Some(ErrorKind::Required));
    }

    #[test]
    fn lengths_count_characters() {
        let field = constrained(None, Some(3), false);
        assert_eq!(check_field(&field, Some(&FieldValue::from("héé"))), None);
        assert_eq!(
            check_field(&field, Some(&FieldValue::from("héé!"))),
            Some(ErrorKind::MaxLength)
        );
    }

    #[test]
    fn lengths_ignore_lists() {
        let field = constrained(Some(5), Some(6), false);
        let value = FieldValue::List(vec!["a".into()]);
        assert_eq!(check_field(&field, Some(&value)), None);
    }

    #[test]
    fn messages_include_limits() {
        let constraint = Constraint {
            required: true,
            min_length: Some(2),
            max_length: Some(8),
        };
        assert_eq!(ErrorKind::Required.message(Some(&constraint)), "Required");
        assert_eq!(ErrorKind::MinLength.message(Some(&constraint)), "Min 2");
        assert_eq!(ErrorKind::MaxLength.message(Some(&constraint)), "Max 8");
    }
}
