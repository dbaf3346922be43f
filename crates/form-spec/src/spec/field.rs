use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Built-in options for region-code fields that do not list their own.
pub const REGION_CODES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("CA", "Canada"),
    ("UK", "United Kingdom"),
];

/// Supported input widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FieldType {
    #[serde(rename = "input", alias = "text")]
    Text,
    #[serde(rename = "textarea", alias = "multiline-text")]
    MultilineText,
    #[serde(rename = "currency", alias = "numeric-currency")]
    Currency,
    #[serde(rename = "select", alias = "single-select")]
    Select,
    #[serde(rename = "select-many", alias = "selectMany", alias = "multi-select")]
    MultiSelect,
    #[serde(rename = "dynamic-input", alias = "dynamicInput", alias = "dynamic-list")]
    DynamicList,
    #[serde(rename = "radio", alias = "grouped-choice")]
    Radio,
    #[serde(rename = "country", alias = "region-code")]
    RegionCode,
    #[serde(rename = "address", alias = "structured-address")]
    Address,
}

impl FieldType {
    /// Wire label, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "input",
            FieldType::MultilineText => "textarea",
            FieldType::Currency => "currency",
            FieldType::Select => "select",
            FieldType::MultiSelect => "select-many",
            FieldType::DynamicList => "dynamic-input",
            FieldType::Radio => "radio",
            FieldType::RegionCode => "country",
            FieldType::Address => "address",
        }
    }

    /// Whether the field is meaningless without an `options` list.
    pub fn requires_options(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::MultiSelect | FieldType::Radio
        )
    }

    /// Whether values of this field are ordered sequences of strings.
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::MultiSelect | FieldType::DynamicList)
    }
}

/// Per-field constraints checked on validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl Constraint {
    /// Minimum length, ignoring a zero limit.
    pub fn effective_min(&self) -> Option<usize> {
        self.min_length.filter(|min| *min > 0)
    }

    /// Maximum length, ignoring a zero limit.
    pub fn effective_max(&self) -> Option<usize> {
        self.max_length.filter(|max| *max > 0)
    }
}

/// Shows a field only while another field holds an exact string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityClause {
    pub field_key: String,
    pub value: String,
}

/// Declarative description of one form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub field_key: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Constraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityClause>,
}

impl FieldDefinition {
    pub fn new(field_key: impl Into<String>, kind: FieldType) -> Self {
        Self {
            field_key: field_key.into(),
            kind,
            label: None,
            options: Vec::new(),
            validation: None,
            visibility: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validation(mut self, constraint: Constraint) -> Self {
        self.validation = Some(constraint);
        self
    }

    pub fn required(self) -> Self {
        let constraint = Constraint {
            required: true,
            ..self.validation.clone().unwrap_or_default()
        };
        self.with_validation(constraint)
    }

    pub fn visible_when(mut self, field_key: impl Into<String>, value: impl Into<String>) -> Self {
        self.visibility = Some(VisibilityClause {
            field_key: field_key.into(),
            value: value.into(),
        });
        self
    }

    /// Display label, falling back to the field key.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field_key)
    }

    pub fn is_required(&self) -> bool {
        self.validation
            .as_ref()
            .is_some_and(|constraint| constraint.required)
    }

    /// Options offered to the user, including the built-in region list.
    pub fn effective_options(&self) -> Vec<String> {
        if self.options.is_empty() && self.kind == FieldType::RegionCode {
            REGION_CODES
                .iter()
                .map(|(code, _)| (*code).to_string())
                .collect()
        } else {
            self.options.clone()
        }
    }
}
