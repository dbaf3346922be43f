use serde_json::{Map, Value, json};

use crate::{
    spec::{FieldType, FormSpec},
    validate::{ValidationResult, validate},
    value::{FieldValue, ValueBag},
    visibility::resolve_visibility,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// At least one visible field fails validation.
    NeedInput,
    /// Every visible field passes; the form can be submitted.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Describes a single field for render outputs.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub key: String,
    pub label: String,
    pub kind: FieldType,
    pub required: bool,
    pub visible: bool,
    pub options: Vec<String>,
    pub current_value: Option<FieldValue>,
    pub error: Option<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub status: RenderStatus,
    pub help: Option<String>,
    pub fields: Vec<RenderField>,
    pub validation: ValidationResult,
}

impl RenderPayload {
    pub fn visible_count(&self) -> usize {
        self.fields.iter().filter(|field| field.visible).count()
    }
}

/// Build the renderer payload from the spec and the current values.
pub fn build_render_payload(spec: &FormSpec, values: &ValueBag) -> RenderPayload {
    let visibility = resolve_visibility(spec, values);
    let validation = validate(spec, values);

    let fields = spec
        .fields
        .iter()
        .map(|field| RenderField {
            key: field.field_key.clone(),
            label: field.display_label().to_string(),
            kind: field.kind,
            required: field.is_required(),
            visible: visibility.get(&field.field_key).copied().unwrap_or(true),
            options: field.effective_options(),
            current_value: values.get(&field.field_key).cloned(),
            error: validation.message_for(field),
        })
        .collect();

    let status = if validation.is_valid() {
        RenderStatus::Complete
    } else {
        RenderStatus::NeedInput
    };

    RenderPayload {
        form_id: spec.id.clone(),
        form_title: spec.title.clone(),
        status,
        help: spec.description.clone(),
        fields,
        validation,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("fieldKey".into(), Value::String(field.key.clone()));
            map.insert("label".into(), Value::String(field.label.clone()));
            map.insert("type".into(), Value::String(field.kind.as_str().to_string()));
            map.insert("required".into(), Value::Bool(field.required));
            map.insert("visible".into(), Value::Bool(field.visible));
            if !field.options.is_empty() {
                map.insert(
                    "options".into(),
                    Value::Array(field.options.iter().cloned().map(Value::String).collect()),
                );
            }
            if let Some(current_value) = &field.current_value {
                map.insert(
                    "value".into(),
                    serde_json::to_value(current_value).unwrap_or(Value::Null),
                );
            }
            if let Some(error) = &field.error {
                map.insert("error".into(), Value::String(error.clone()));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "status": payload.status.as_str(),
        "help": payload.help,
        "visible": payload.visible_count(),
        "fields": fields,
        "errors": payload.validation,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} ({} visible, {} failing)",
        payload.status.as_str(),
        payload.visible_count(),
        payload.validation.len()
    ));
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }

    lines.push("Visible fields:".to_string());
    for field in payload.fields.iter().filter(|field| field.visible) {
        let mut entry = format!(" - {} ({})", field.key, field.label);
        if field.required {
            entry.push_str(" [required]");
        }
        if let Some(value) = &field.current_value {
            entry.push_str(&format!(" = {}", value.display()));
        }
        if let Some(error) = &field.error {
            entry.push_str(&format!(" ! {}", error));
        }
        lines.push(entry);
    }

    lines.join("\n")
}
