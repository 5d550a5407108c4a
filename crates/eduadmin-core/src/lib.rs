//! eduadmin Core Library
//!
//! This crate provides the upload folder constraint table, local file validation,
//! wire models for the upload endpoints, error types and client configuration
//! shared by the API client and the CLI.

pub mod config;
pub mod error;
pub mod folders;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{LogLevel, UploadError, UploadOutcome};
pub use folders::{FolderConfig, FolderTable, DEFAULT_FOLDER_CONFIG};
pub use models::upload::{
    FileMetadata, SignedUrlQuery, SignedUrlResponse, UploadResult, UploadStage,
    VerifyPublishRequest, VerifyPublishResponse,
};
pub use validation::{
    normalize_content_type, sanitize_file_name, validate_file, validate_file_with,
    ValidationOutcome,
};
