use form_spec::{
    ArtifactEncoder, EncodingError, ErrorKind, ExportPayload, FieldDefinition, FieldType,
    FieldValue, FormSession, FormSpec, JsonArtifactEncoder, SchemaError, SessionError, SubmitError,
    artifact::Artifact,
};

fn session() -> FormSession {
    let spec = FormSpec::from_fields(vec![
        FieldDefinition::new("name", FieldType::Text).required(),
        FieldDefinition::new("phones", FieldType::DynamicList),
        FieldDefinition::new("kind", FieldType::Radio).with_options(["person", "company"]),
        FieldDefinition::new("vat", FieldType::Text)
            .visible_when("kind", "company")
            .required(),
    ]);
    FormSession::new(spec).expect("session")
}

fn phones(session: &FormSession) -> Vec<String> {
    session
        .values()
        .get("phones")
        .and_then(FieldValue::as_list)
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

#[test]
fn first_append_creates_single_entry() {
    let mut session = session();
    assert_eq!(session.append("phones"), Ok(1));
    assert_eq!(phones(&session), vec![String::new()]);
    assert_eq!(session.append("phones"), Ok(2));
    assert_eq!(phones(&session), vec![String::new(), String::new()]);
}

#[test]
fn update_and_remove_respect_bounds() {
    let mut session = session();
    session.append("phones").expect("append");
    session.append("phones").expect("append");
    session.update("phones", 0, "555-0100").expect("update");
    session.update("phones", 1, "555-0199").expect("update");
    session.update("phones", 9, "ignored").expect("out of range");
    assert_eq!(phones(&session), vec!["555-0100", "555-0199"]);

    session.remove("phones", 7).expect("out of range");
    assert_eq!(phones(&session).len(), 2);
    session.remove("phones", 0).expect("remove");
    assert_eq!(phones(&session), vec!["555-0199"]);
}

#[test]
fn update_on_absent_list_fills_the_implicit_row() {
    let mut session = session();
    session.remove("phones", 0).expect("remove");
    assert!(session.values().get("phones").is_none());

    session.update("phones", 3, "x").expect("update");
    assert!(session.values().get("phones").is_none());

    session.update("phones", 0, "x").expect("update");
    assert_eq!(phones(&session), vec!["x"]);
}

#[test]
fn edits_reject_unknown_fields_and_wrong_kinds() {
    let mut session = session();
    assert_eq!(
        session.set_value("nope", "x"),
        Err(SessionError::UnknownField("nope".into()))
    );
    session.set_value("name", "Ada").expect("set");
    assert_eq!(
        session.append("name"),
        Err(SessionError::NotAList("name".into()))
    );
}

#[test]
fn session_requires_well_formed_spec() {
    let spec = FormSpec::from_fields(vec![
        FieldDefinition::new("a", FieldType::Text).visible_when("a", "x"),
    ]);
    assert_eq!(
        FormSession::new(spec).err(),
        Some(SchemaError::SelfDependency("a".into()))
    );
}

#[test]
fn visibility_changes_follow_edits() {
    let mut session = session();
    let keys = |session: &FormSession| {
        session
            .visible_fields()
            .iter()
            .map(|field| field.field_key.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(keys(&session), vec!["name", "phones", "kind"]);
    session.set_value("kind", "company").expect("set");
    assert_eq!(keys(&session), vec!["name", "phones", "kind", "vat"]);

    session.set_value("name", "Acme").expect("set");
    assert_eq!(session.validate().get("vat"), Some(ErrorKind::Required));
    session.set_value("kind", "person").expect("set");
    assert!(session.validate().is_valid());
}

#[test]
fn submit_is_idempotent_and_schema_ordered() {
    let mut session = session();
    session.set_value("kind", "person").expect("set");
    session.append("phones").expect("append");
    session.update("phones", 0, "555").expect("update");
    session.set_value("name", "Ada").expect("set");

    let first = session.try_submit().expect("valid");
    let second = session.try_submit().expect("valid");
    let json = first.to_canonical_json().expect("json");
    assert_eq!(json, second.to_canonical_json().expect("json"));
    assert_eq!(json, r#"{"name":"Ada","phones":["555"],"kind":"person"}"#);
}

#[test]
fn reset_clears_values() {
    let mut session = session();
    session.set_value("name", "Ada").expect("set");
    session.reset();
    assert!(session.values().is_empty());
    assert_eq!(session.validate().get("name"), Some(ErrorKind::Required));
}

struct FailingEncoder;

impl ArtifactEncoder for FailingEncoder {
    fn encode(&self, _payload: &ExportPayload) -> Result<Artifact, EncodingError> {
        Err(EncodingError::Backend("qr encoder out of memory".into()))
    }
}

#[test]
fn encoder_failure_preserves_values() {
    let mut session = session();
    session.set_value("name", "Ada").expect("set");
    let before = session.values().clone();

    let err = session.submit_with(&FailingEncoder).expect_err("encoder fails");
    assert!(matches!(err, SubmitError::Encoding(EncodingError::Backend(_))));
    assert_eq!(session.values(), &before);

    let artifact = session
        .submit_with(&JsonArtifactEncoder::default())
        .expect("json artifact");
    assert_eq!(artifact.data, br#"{"name":"Ada"}"#.to_vec());
}

#[test]
fn invalid_submission_never_reaches_encoder() {
    let session = session();
    let err = session.submit_with(&FailingEncoder).expect_err("invalid");
    let SubmitError::Invalid(result) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(result.get("name"), Some(ErrorKind::Required));
}

#[test]
fn qr_encoder_enforces_capacity() {
    let mut session = session();
    session
        .set_value("name", "x".repeat(JsonArtifactEncoder::QR_BINARY_CAPACITY))
        .expect("set");
    let err = session
        .submit_with(&JsonArtifactEncoder::for_qr())
        .expect_err("too large");
    assert!(matches!(
        err,
        SubmitError::Encoding(EncodingError::PayloadTooLarge { .. })
    ));
}
