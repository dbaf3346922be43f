use form_spec::{
    Address, ErrorKind, FieldDefinition, FieldType, FieldValue, FormSpec, ValueBag, is_visible,
    resolve_visibility, try_submit, validate,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "contact_form" => include_str!("fixtures/contact_form.json"),
        "bare_fields" => include_str!("fixtures/bare_fields.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn name_form() -> FormSpec {
    FormSpec::from_fields(vec![FieldDefinition::new("name", FieldType::Text).required()])
}

fn bag(entries: &[(&str, FieldValue)]) -> ValueBag {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn unconditional_fields_are_always_visible() {
    let field = FieldDefinition::new("free", FieldType::Text);
    assert!(is_visible(&field, &ValueBag::new()));
    assert!(is_visible(
        &field,
        &bag(&[("free", FieldValue::List(vec![])), ("other", "x".into())])
    ));
}

#[test]
fn clause_requires_exact_text_match() {
    let field = FieldDefinition::new("state", FieldType::Text).visible_when("country", "US");
    assert!(is_visible(&field, &bag(&[("country", "US".into())])));
    assert!(!is_visible(&field, &bag(&[("country", "us".into())])));
    assert!(!is_visible(&field, &bag(&[("country", "US ".into())])));
    assert!(!is_visible(&field, &ValueBag::new()));
    assert!(!is_visible(
        &field,
        &bag(&[("country", FieldValue::List(vec!["US".into()]))])
    ));
}

#[test]
fn hidden_field_without_value_is_skipped() {
    let spec = FormSpec::from_json(fixture("bare_fields")).expect("spec");
    let values = bag(&[("country", "CA".into())]);

    let visibility = resolve_visibility(&spec, &values);
    assert_eq!(visibility.get("state"), Some(&false));
    assert_eq!(visibility.get("country"), Some(&true));

    assert!(validate(&spec, &values).get("state").is_none());
    let payload = try_submit(&spec, &values).expect("valid");
    assert!(payload.get("state").is_none());
    assert_eq!(payload.to_canonical_json().expect("json"), r#"{"country":"CA"}"#);
}

#[test]
fn hidden_field_with_value_is_still_exported() {
    let spec = FormSpec::from_json(fixture("bare_fields")).expect("spec");
    let values = bag(&[("state", "NY".into()), ("country", "CA".into())]);

    assert!(validate(&spec, &values).is_valid());
    let payload = try_submit(&spec, &values).expect("valid");
    assert_eq!(payload.get("state"), Some(&FieldValue::from("NY")));
    assert_eq!(
        payload.to_canonical_json().expect("json"),
        r#"{"country":"CA","state":"NY"}"#
    );
}

#[test]
fn stale_value_in_hidden_field_never_fails() {
    let spec = FormSpec::from_fields(vec![
        FieldDefinition::new("country", FieldType::Select).with_options(["US", "CA"]),
        FieldDefinition::new("state", FieldType::Text)
            .visible_when("country", "US")
            .with_validation(form_spec::Constraint {
                required: true,
                min_length: Some(2),
                max_length: Some(2),
            }),
    ]);
    let values = bag(&[("country", "CA".into()), ("state", "California".into())]);
    assert!(validate(&spec, &values).is_valid());

    let values = bag(&[("country", "US".into()), ("state", "California".into())]);
    assert_eq!(validate(&spec, &values).get("state"), Some(ErrorKind::MaxLength));
}

#[test]
fn missing_required_rejects_submission() {
    let spec = name_form();
    let result = validate(&spec, &ValueBag::new());
    assert_eq!(result.get("name"), Some(ErrorKind::Required));
    assert_eq!(
        serde_json::to_string(&result).expect("json"),
        r#"{"name":"required"}"#
    );

    let rejected = try_submit(&spec, &ValueBag::new()).expect_err("rejected");
    assert_eq!(rejected, result);
}

#[test]
fn present_value_submits() {
    let spec = name_form();
    let values = bag(&[("name", "John".into())]);
    assert!(validate(&spec, &values).is_valid());
    let payload = try_submit(&spec, &values).expect("valid");
    assert_eq!(payload.to_canonical_json().expect("json"), r#"{"name":"John"}"#);
}

#[test]
fn required_treats_empty_values_as_absent() {
    let spec = FormSpec::from_fields(vec![
        FieldDefinition::new("text", FieldType::Text).required(),
        FieldDefinition::new("list", FieldType::DynamicList).required(),
        FieldDefinition::new("tags", FieldType::MultiSelect)
            .with_options(["a"])
            .required(),
        FieldDefinition::new("home", FieldType::Address).required(),
        FieldDefinition::new("pick", FieldType::Radio)
            .with_options(["x", "y"])
            .required(),
    ]);
    let empty = bag(&[
        ("text", "".into()),
        ("list", FieldValue::List(vec![])),
        ("tags", FieldValue::List(vec![])),
        ("home", FieldValue::Address(Address::default())),
    ]);
    let result = validate(&spec, &empty);
    for key in ["text", "list", "tags", "home", "pick"] {
        assert_eq!(result.get(key), Some(ErrorKind::Required), "{key}");
    }

    let filled = bag(&[
        ("text", "t".into()),
        ("list", FieldValue::List(vec!["555".into()])),
        ("tags", FieldValue::List(vec!["a".into()])),
        (
            "home",
            FieldValue::Address(Address {
                city: Some("Oslo".into()),
                ..Address::default()
            }),
        ),
        ("pick", "y".into()),
    ]);
    assert!(validate(&spec, &filled).is_valid());
}

#[test]
fn length_rules_apply_to_text_only() {
    let spec = FormSpec::from_json(fixture("contact_form")).expect("spec");
    let mut values = ValueBag::new();
    values.insert("name", "J");
    values.insert("country", "CA");
    assert_eq!(validate(&spec, &values).get("name"), Some(ErrorKind::MinLength));

    values.insert("name", "J".repeat(41));
    assert_eq!(validate(&spec, &values).get("name"), Some(ErrorKind::MaxLength));

    values.insert("name", "Jo");
    assert!(validate(&spec, &values).is_valid());
}

#[test]
fn contact_form_needs_state_for_us() {
    let spec = FormSpec::from_json(fixture("contact_form")).expect("spec");
    spec.check().expect("well-formed");
    let mut values = ValueBag::new();
    values.insert("name", "Ada Lovelace");
    values.insert("country", "US");

    let result = validate(&spec, &values);
    assert_eq!(result.len(), 1);
    assert_eq!(result.get("state"), Some(ErrorKind::Required));

    values.insert("state", "NY");
    assert!(validate(&spec, &values).is_valid());
}
