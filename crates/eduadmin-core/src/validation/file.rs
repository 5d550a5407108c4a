//! Local file validation against a folder's constraints.
//!
//! Runs before any network call. Size is checked before type, so an oversized
//! file of the wrong type reports the size limit.

use serde::Serialize;

use crate::folders::FolderTable;
use crate::models::upload::FileMetadata;

/// Result of validating one file. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }

    /// Convert into a `Result`, carrying the message on failure.
    pub fn into_result(self) -> Result<(), String> {
        match (self.valid, self.error) {
            (true, _) => Ok(()),
            (false, Some(message)) => Err(message),
            (false, None) => Err("File validation failed".to_string()),
        }
    }
}

/// Validate against the built-in folder table.
pub fn validate_file(file: &FileMetadata, folder: &str) -> ValidationOutcome {
    validate_file_with(&FolderTable::builtin(), file, folder)
}

pub fn validate_file_with(
    table: &FolderTable,
    file: &FileMetadata,
    folder: &str,
) -> ValidationOutcome {
    let config = table.get(folder);

    if file.size > config.max_size_bytes() {
        return ValidationOutcome::invalid(format!(
            "File size exceeds the {}MB limit",
            config.max_size_mb
        ));
    }

    if !config.accepts_mime(&file.content_type) {
        return ValidationOutcome::invalid(format!(
            "Invalid file type. Accepted types: {}",
            config.accepted_types_label()
        ));
    }

    ValidationOutcome::ok()
}
