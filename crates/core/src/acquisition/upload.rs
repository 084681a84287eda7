use crate::verification::TicketIdentifier;

use super::{AcquisitionError, QrDecoder};

/// Image received through the upload path.
#[derive(Debug, Clone, Default)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Unknown content type is given the benefit of the doubt.
    fn declares_non_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| !ct.trim().to_ascii_lowercase().starts_with("image/"))
    }
}

/// Decode an uploaded image into a ticket identifier.
///
/// - No bytes (nothing picked): `Ok(None)`, a no-op.
/// - Not an image, or an image without a readable code: `InvalidImage`.
/// - A code whose text is empty: `Ok(None)`.
pub fn decode_upload(
    decoder: &dyn QrDecoder,
    upload: &UploadedImage,
) -> Result<Option<TicketIdentifier>, AcquisitionError> {
    if upload.bytes.is_empty() {
        return Ok(None);
    }

    if upload.declares_non_image() {
        return Err(AcquisitionError::InvalidImage(format!(
            "unsupported content type {}",
            upload.content_type.as_deref().unwrap_or_default()
        )));
    }

    match decoder.decode(&upload.bytes)? {
        Some(text) => Ok(TicketIdentifier::new(text)),
        None => Err(AcquisitionError::InvalidImage(
            "no QR code found in image".to_string(),
        )),
    }
}
