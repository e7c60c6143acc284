//! Upload validation for leaf images
//!
//! Runs before any inference call. Pure functions of the uploaded bytes and
//! the content type the client declared.

use thiserror::Error;

use crate::types::{ImageFormat, MAX_UPLOAD_BYTES};

/// Reason an upload was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("File is empty")]
    EmptyFile,

    #[error("Invalid file type '{received}'. Supported: {supported}")]
    InvalidFileType { received: String, supported: String },

    #[error("File size of {size} bytes exceeds maximum limit of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },
}

/// Limits applied to uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Validate an upload, returning the accepted format
    pub fn validate(&self, data: &[u8], content_type: &str) -> Result<ImageFormat, UploadRejection> {
        self.check_declared(data.len(), content_type)
    }

    /// Validate from the length alone, for callers that have not read the bytes yet
    pub fn check_declared(
        &self,
        len: usize,
        content_type: &str,
    ) -> Result<ImageFormat, UploadRejection> {
        if len == 0 {
            return Err(UploadRejection::EmptyFile);
        }

        let format = ImageFormat::from_mime(content_type).ok_or_else(|| {
            UploadRejection::InvalidFileType {
                received: content_type.to_string(),
                supported: ImageFormat::supported_list(),
            }
        })?;

        if len > self.max_bytes {
            return Err(UploadRejection::PayloadTooLarge {
                size: len,
                max: self.max_bytes,
            });
        }

        Ok(format)
    }
}

/// Validate an upload against the default 10 MiB policy
pub fn validate_upload(data: &[u8], content_type: &str) -> Result<ImageFormat, UploadRejection> {
    UploadPolicy::default().validate(data, content_type)
}
