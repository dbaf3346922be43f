use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::export::{ExportPayload, try_submit};
use crate::spec::FormSpec;
use crate::validate::ValidationResult;
use crate::value::ValueBag;

/// Generated artifact handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl Artifact {
    /// `data:` URL with base64 content, ready for an image or link element.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.data))
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("payload of {len} bytes exceeds encoder limit of {limit}")]
    PayloadTooLarge { len: usize, limit: usize },
    #[error("encoder backend failed: {0}")]
    Backend(String),
}

/// Failure signal surfaced to the submitting caller.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(ValidationResult),
    #[error("artifact generation failed: {0}")]
    Encoding(#[from] EncodingError),
}

/// External collaborator turning a payload into an artifact (QR image, document).
pub trait ArtifactEncoder {
    fn encode(&self, payload: &ExportPayload) -> Result<Artifact, EncodingError>;
}

/// Emits the canonical JSON text, the string a QR encoder consumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArtifactEncoder {
    /// Upper bound on the encoded size, when the downstream encoder has one.
    pub max_len: Option<usize>,
}

impl JsonArtifactEncoder {
    /// Byte capacity of a version 40 QR symbol in binary mode at level L.
    pub const QR_BINARY_CAPACITY: usize = 2953;

    pub fn for_qr() -> Self {
        Self {
            max_len: Some(Self::QR_BINARY_CAPACITY),
        }
    }
}

impl ArtifactEncoder for JsonArtifactEncoder {
    fn encode(&self, payload: &ExportPayload) -> Result<Artifact, EncodingError> {
        let json = payload.to_canonical_json()?;
        if let Some(limit) = self.max_len
            && json.len() > limit
        {
            return Err(EncodingError::PayloadTooLarge {
                len: json.len(),
                limit,
            });
        }
        Ok(Artifact {
            media_type: "application/json".into(),
            data: json.into_bytes(),
        })
    }
}

/// Validates, exports and encodes; the bag is only read.
pub fn submit_with<E: ArtifactEncoder + ?Sized>(
    spec: &FormSpec,
    values: &ValueBag,
    encoder: &E,
) -> Result<Artifact, SubmitError> {
    let payload = try_submit(spec, values).map_err(SubmitError::Invalid)?;
    let artifact = encoder.encode(&payload)?;
    tracing::debug!(
        form = %spec.id,
        fields = payload.len(),
        media_type = %artifact.media_type,
        "artifact generated"
    );
    Ok(artifact)
}
