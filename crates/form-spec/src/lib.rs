#![allow(missing_docs)]

pub mod artifact;
pub mod export;
pub mod pdf;
pub mod render;
pub mod session;
pub mod spec;
pub mod validate;
pub mod value;
pub mod visibility;

pub use artifact::{
    Artifact, ArtifactEncoder, EncodingError, JsonArtifactEncoder, SubmitError, submit_with,
};
pub use export::{ExportPayload, try_submit};
pub use pdf::{
    PartialArtifactFailure, PdfFormBackend, PdfPlan, PdfReport, layout as pdf_layout, render_pdf,
};
pub use render::{
    RenderField, RenderPayload, RenderStatus, build_render_payload, render_json_ui, render_text,
};
pub use session::{FormSession, SessionError};
pub use spec::form::spec_schema;
pub use spec::{Constraint, FieldDefinition, FieldType, FormSpec, SchemaError, VisibilityClause};
pub use validate::{ErrorKind, ValidationResult, validate};
pub use value::{Address, FieldValue, ValueBag};
pub use visibility::{VisibilityMap, is_visible, resolve_visibility, visible_fields};
