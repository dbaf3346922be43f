use crate::spec::{FieldDefinition, FormSpec};
use crate::value::{FieldValue, ValueBag};

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Single-hop visibility check against the current bag.
///
/// A clause matches only when the referenced value is text equal to the
/// clause value; lists, addresses and absent keys never match.
pub fn is_visible(field: &FieldDefinition, values: &ValueBag) -> bool {
    match &field.visibility {
        None => true,
        Some(clause) => matches!(
            values.get(&clause.field_key),
            Some(FieldValue::Text(text)) if *text == clause.value
        ),
    }
}

pub fn resolve_visibility(spec: &FormSpec, values: &ValueBag) -> VisibilityMap {
    spec.fields
        .iter()
        .map(|field| (field.field_key.clone(), is_visible(field, values)))
        .collect()
}

/// Visible fields in schema order.
pub fn visible_fields<'a>(
    spec: &'a FormSpec,
    values: &'a ValueBag,
) -> impl Iterator<Item = &'a FieldDefinition> + 'a {
    spec.fields
        .iter()
        .filter(move |field| is_visible(field, values))
}
