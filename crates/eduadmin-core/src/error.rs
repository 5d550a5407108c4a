//! Error types module
//!
//! All upload failures are unified under [`UploadError`]. Each variant maps to one
//! step of the upload protocol, so callers can tell which step failed without
//! parsing messages. Nothing here is retried.

use crate::models::upload::UploadStage;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for backend rejections
    Warn,
    /// Error level - for transport failures
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// Local size/type check failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Signed-URL request failed or the backend answered `success: false`.
    #[error("Failed to get signed URL: {0}")]
    SignedUrl(String),

    /// Storage answered with a non-success HTTP status.
    #[error("Upload failed with status {status}")]
    StorageStatus { status: u16 },

    /// Storage request could not be sent or completed.
    #[error("Upload failed: {0}")]
    StorageTransport(String),

    /// Verify-and-publish failed or the backend answered `success: false`.
    /// The stored object is left in place.
    #[error("Failed to verify and publish file: {0}")]
    VerifyPublish(String),
}

impl UploadError {
    /// Last stage reached before the failure.
    pub fn stage(&self) -> UploadStage {
        match self {
            UploadError::Validation(_) => UploadStage::Start,
            UploadError::SignedUrl(_) => UploadStage::Validated,
            UploadError::StorageStatus { .. } | UploadError::StorageTransport(_) => {
                UploadStage::UrlIssued
            }
            UploadError::VerifyPublish(_) => UploadStage::Stored,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::Validation(_) => "VALIDATION_FAILED",
            UploadError::SignedUrl(_) => "SIGNED_URL_FAILED",
            UploadError::StorageStatus { .. } => "STORAGE_REJECTED",
            UploadError::StorageTransport(_) => "STORAGE_UNREACHABLE",
            UploadError::VerifyPublish(_) => "VERIFY_PUBLISH_FAILED",
        }
    }

    /// True when bytes may already sit in storage without being published.
    pub fn may_orphan_object(&self) -> bool {
        matches!(self, UploadError::VerifyPublish(_))
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Validation(_) => LogLevel::Debug,
            UploadError::SignedUrl(_)
            | UploadError::StorageStatus { .. }
            | UploadError::VerifyPublish(_) => LogLevel::Warn,
            UploadError::StorageTransport(_) => LogLevel::Error,
        }
    }
}

/// Result type for upload operations
pub type UploadOutcome<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failed_step() {
        assert_eq!(
            UploadError::Validation("File size exceeds the 5MB limit".into()).to_string(),
            "File size exceeds the 5MB limit"
        );
        assert!(UploadError::SignedUrl("backend refused".into())
            .to_string()
            .starts_with("Failed to get signed URL"));
        assert_eq!(
            UploadError::StorageStatus { status: 500 }.to_string(),
            "Upload failed with status 500"
        );
        assert!(UploadError::VerifyPublish("success was false".into())
            .to_string()
            .starts_with("Failed to verify and publish file"));
    }

    #[test]
    fn stage_reflects_progress_before_failure() {
        assert_eq!(
            UploadError::Validation(String::new()).stage(),
            UploadStage::Start
        );
        assert_eq!(
            UploadError::SignedUrl(String::new()).stage(),
            UploadStage::Validated
        );
        assert_eq!(
            UploadError::StorageStatus { status: 403 }.stage(),
            UploadStage::UrlIssued
        );
        assert_eq!(
            UploadError::VerifyPublish(String::new()).stage(),
            UploadStage::Stored
        );
    }

    #[test]
    fn only_verify_failures_can_orphan() {
        assert!(UploadError::VerifyPublish(String::new()).may_orphan_object());
        assert!(!UploadError::StorageStatus { status: 500 }.may_orphan_object());
        assert_eq!(
            UploadError::Validation(String::new()).log_level(),
            LogLevel::Debug
        );
    }
}
