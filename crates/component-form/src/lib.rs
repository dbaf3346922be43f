use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use form_spec::{
    FormSpec, JsonArtifactEncoder, SchemaError, SubmitError, ValueBag, build_render_payload,
    pdf_layout, render_json_ui as form_render_json_ui, render_text as form_render_text,
    resolve_visibility, spec_schema, submit_with, validate,
};

const DEFAULT_SPEC: &str = include_str!("../../form-spec/tests/fixtures/contact_form.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("invalid form spec: {0}")]
    Schema(#[from] SchemaError),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_spec_json: Option<String>,
    #[serde(default)]
    qr_limit: bool,
}

fn load_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        Ok(ComponentConfig::default())
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }
}

fn load_form_spec(config: &ComponentConfig) -> Result<FormSpec, ComponentError> {
    let spec_json = config.form_spec_json.as_deref().unwrap_or(DEFAULT_SPEC);
    let spec = FormSpec::from_json(spec_json)?;
    spec.check()?;
    Ok(spec)
}

fn ensure_form(config_json: &str) -> Result<FormSpec, ComponentError> {
    load_form_spec(&load_config(config_json)?)
}

fn parse_values(values_json: &str) -> ValueBag {
    let raw = serde_json::from_str(values_json).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "values are not valid JSON; starting from an empty bag");
        Value::Object(Map::new())
    });
    ValueBag::from_json_lossy(&raw)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

pub fn describe(config_json: &str) -> String {
    respond(
        ensure_form(config_json)
            .and_then(|spec| serde_json::to_value(spec).map_err(ComponentError::JsonEncode)),
    )
}

pub fn get_spec_schema() -> String {
    respond(Ok(spec_schema()))
}

pub fn visibility(config_json: &str, values_json: &str) -> String {
    respond(ensure_form(config_json).and_then(|spec| {
        let values = parse_values(values_json);
        serde_json::to_value(resolve_visibility(&spec, &values))
            .map_err(ComponentError::JsonEncode)
    }))
}

pub fn validate_values(config_json: &str, values_json: &str) -> String {
    respond(ensure_form(config_json).and_then(|spec| {
        let values = parse_values(values_json);
        let result = validate(&spec, &values);
        let errors = serde_json::to_value(&result).map_err(ComponentError::JsonEncode)?;
        Ok(json!({
            "valid": result.is_valid(),
            "errors": errors,
        }))
    }))
}

/// Validates and exports; an encoder failure leaves the caller's values untouched.
pub fn submit(config_json: &str, values_json: &str) -> String {
    respond(load_config(config_json).and_then(|config| {
        let spec = load_form_spec(&config)?;
        let values = parse_values(values_json);
        let encoder = if config.qr_limit {
            JsonArtifactEncoder::for_qr()
        } else {
            JsonArtifactEncoder::default()
        };

        Ok(match submit_with(&spec, &values, &encoder) {
            Ok(artifact) => {
                let canonical = String::from_utf8_lossy(&artifact.data).into_owned();
                let payload: Value =
                    serde_json::from_str(&canonical).map_err(ComponentError::JsonEncode)?;
                json!({
                    "status": "complete",
                    "payload": payload,
                    "canonical": canonical,
                    "data_url": artifact.data_url(),
                })
            }
            Err(SubmitError::Invalid(result)) => {
                let errors = serde_json::to_value(&result).map_err(ComponentError::JsonEncode)?;
                json!({
                    "status": "error",
                    "errors": errors,
                    "values": values.to_json(),
                })
            }
            Err(err @ SubmitError::Encoding(_)) => json!({
                "status": "encoding_failed",
                "message": err.to_string(),
                "values": values.to_json(),
            }),
        })
    }))
}

pub fn render_text(config_json: &str, values_json: &str) -> String {
    respond_string(ensure_form(config_json).map(|spec| {
        let values = parse_values(values_json);
        form_render_text(&build_render_payload(&spec, &values))
    }))
}

pub fn render_json_ui(config_json: &str, values_json: &str) -> String {
    respond(ensure_form(config_json).map(|spec| {
        let values = parse_values(values_json);
        form_render_json_ui(&build_render_payload(&spec, &values))
    }))
}

/// Page layout for a fillable PDF, as consumed by a PDF backend.
pub fn pdf_plan(config_json: &str, values_json: &str) -> String {
    respond(ensure_form(config_json).map(|spec| {
        let values = parse_values(values_json);
        let plan = pdf_layout(&spec, &values);
        let pages = plan
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let fields = page
                    .blocks
                    .iter()
                    .map(|block| {
                        json!({
                            "fieldKey": block.field_key,
                            "label": block.label.text,
                            "y": block.label.y,
                            "widgets": block
                                .widgets
                                .iter()
                                .map(|widget| widget.name.clone())
                                .collect::<Vec<_>>(),
                        })
                    })
                    .collect::<Vec<_>>();
                json!({ "page": index, "fields": fields })
            })
            .collect::<Vec<_>>();
        json!({ "title": plan.title, "pages": pages })
    }))
}
