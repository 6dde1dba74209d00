use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::rc::Rc;

use crate::error::ClientError;

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// 10 MB, the upload ceiling of the classification page.
pub const CLASSIFICATION_MAX_BYTES: usize = 10 * 1024 * 1024;

/// A file as handed over by the browser layer, not yet validated.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A validated, immutable image held by a page session.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    name: String,
    mime_type: String,
    bytes: Rc<[u8]>,
}

/// Checks the declared type and size of a file.
///
/// Runs before the browser reads the file and again in [`ImageAsset::from_raw`].
pub fn validate(mime_type: &str, len: usize, max_bytes: Option<usize>) -> Result<(), ClientError> {
    let normalized = mime_type.trim().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&normalized.as_str()) {
        return Err(ClientError::InvalidFileType(mime_type.to_string()));
    }
    if let Some(limit) = max_bytes {
        if len > limit {
            return Err(ClientError::FileTooLarge { size: len, limit });
        }
    }
    Ok(())
}

impl ImageAsset {
    pub fn from_raw(raw: RawFile, max_bytes: Option<usize>) -> Result<Self, ClientError> {
        validate(&raw.mime_type, raw.bytes.len(), max_bytes)?;
        Ok(Self {
            name: raw.name,
            mime_type: raw.mime_type.trim().to_ascii_lowercase(),
            bytes: raw.bytes.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:` URL used for the upload preview.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}
