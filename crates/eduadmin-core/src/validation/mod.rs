//! Validation modules

pub mod file;
pub mod filename;

pub use file::{validate_file, validate_file_with, ValidationOutcome};
pub use filename::{normalize_content_type, sanitize_file_name};
