use thiserror::Error;

use crate::artifact::{Artifact, ArtifactEncoder, SubmitError, submit_with};
use crate::export::{ExportPayload, try_submit};
use crate::spec::{FieldDefinition, FormSpec, SchemaError};
use crate::validate::{ValidationResult, validate};
use crate::value::{FieldValue, ValueBag};
use crate::visibility::{VisibilityMap, resolve_visibility, visible_fields};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("field '{0}' is not part of the form")]
    UnknownField(String),
    #[error("field '{0}' does not hold a list of entries")]
    NotAList(String),
}

/// One user's pass through a form: the immutable spec plus the live values.
#[derive(Debug, Clone)]
pub struct FormSession {
    spec: FormSpec,
    values: ValueBag,
}

impl FormSession {
    pub fn new(spec: FormSpec) -> Result<Self, SchemaError> {
        spec.check()?;
        Ok(Self {
            spec,
            values: ValueBag::new(),
        })
    }

    /// Starts from an existing bag, e.g. answers loaded from a file.
    pub fn with_values(spec: FormSpec, values: ValueBag) -> Result<Self, SchemaError> {
        let mut session = Self::new(spec)?;
        session.values = values;
        Ok(session)
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn values(&self) -> &ValueBag {
        &self.values
    }

    fn field(&self, field_key: &str) -> Result<&FieldDefinition, SessionError> {
        self.spec
            .field(field_key)
            .ok_or_else(|| SessionError::UnknownField(field_key.to_string()))
    }

    /// Records a field-change event.
    pub fn set_value(
        &mut self,
        field_key: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), SessionError> {
        self.field(field_key)?;
        tracing::debug!(field = field_key, "value changed");
        self.values.insert(field_key, value);
        Ok(())
    }

    pub fn clear_value(&mut self, field_key: &str) -> Result<Option<FieldValue>, SessionError> {
        self.field(field_key)?;
        Ok(self.values.remove(field_key))
    }

    fn list_mut(&mut self, field_key: &str) -> Result<Option<&mut Vec<String>>, SessionError> {
        if !self.field(field_key)?.kind.is_list() {
            return Err(SessionError::NotAList(field_key.to_string()));
        }
        match self.values.get_mut(field_key) {
            None => Ok(None),
            Some(FieldValue::List(items)) => Ok(Some(items)),
            Some(_) => Err(SessionError::NotAList(field_key.to_string())),
        }
    }

    /// Appends one empty entry, starting a new list when none exists.
    pub fn append(&mut self, field_key: &str) -> Result<usize, SessionError> {
        let len = match self.list_mut(field_key)? {
            Some(items) => {
                items.push(String::new());
                items.len()
            }
            None => {
                self.values
                    .insert(field_key, FieldValue::List(vec![String::new()]));
                1
            }
        };
        tracing::debug!(field = field_key, len, "list entry appended");
        Ok(len)
    }

    /// Removes the entry at `index`; out-of-range indexes are ignored.
    pub fn remove(&mut self, field_key: &str, index: usize) -> Result<(), SessionError> {
        if let Some(items) = self.list_mut(field_key)?
            && index < items.len()
        {
            items.remove(index);
        }
        Ok(())
    }

    /// Replaces the entry at `index`; out-of-range indexes are ignored.
    ///
    /// An absent list behaves as the single empty row every view shows for it,
    /// so index 0 starts the list with `value`.
    pub fn update(
        &mut self,
        field_key: &str,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        match self.list_mut(field_key)? {
            Some(items) => {
                if let Some(slot) = items.get_mut(index) {
                    *slot = value.into();
                }
            }
            None if index == 0 => {
                self.values
                    .insert(field_key, FieldValue::List(vec![value.into()]));
            }
            None => {}
        }
        Ok(())
    }

    pub fn visibility(&self) -> VisibilityMap {
        resolve_visibility(&self.spec, &self.values)
    }

    pub fn visible_fields(&self) -> Vec<&FieldDefinition> {
        visible_fields(&self.spec, &self.values).collect()
    }

    pub fn validate(&self) -> ValidationResult {
        validate(&self.spec, &self.values)
    }

    pub fn try_submit(&self) -> Result<ExportPayload, ValidationResult> {
        try_submit(&self.spec, &self.values)
    }

    pub fn submit_with<E: ArtifactEncoder + ?Sized>(
        &self,
        encoder: &E,
    ) -> Result<Artifact, SubmitError> {
        submit_with(&self.spec, &self.values, encoder)
    }

    /// Drops every value, returning the session to its initial state.
    pub fn reset(&mut self) {
        self.values.clear();
    }
}
