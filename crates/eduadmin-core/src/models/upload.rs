use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Metadata of a local file as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Original filename, unsanitized
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Client-observed MIME type. Empty when unknown.
    pub content_type: String,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, size: u64, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
        }
    }
}

/// Query parameters for `GET /upload/get-signed-url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlQuery {
    pub folder: String,
    /// Sanitized filename
    pub file_name: String,
    /// Normalized content type (`image/jpeg` is sent as `image/jpg`)
    pub content_type: String,
    pub file_size: u64,
}

/// Response of `GET /upload/get-signed-url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub success: bool,
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub relative_path: String,
    /// Extra form fields for POST-style presigned uploads, in server order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Map<String, serde_json::Value>>,
}

impl SignedUrlResponse {
    /// Form fields as ordered string pairs. Non-string values are rendered as JSON.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flatten()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// Body of `POST /upload/verify-and-publish`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPublishRequest {
    pub relative_path: String,
}

/// Response of `POST /upload/verify-and-publish`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPublishResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of a completed upload. `relative_path` is what downstream records store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub relative_path: String,
    pub success: bool,
}

/// Progress of a single upload. Strictly linear; `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    Start,
    Validated,
    UrlIssued,
    Stored,
    Published,
    Done,
    Failed,
}

impl UploadStage {
    /// Next stage on success. `Done` and `Failed` do not advance.
    pub fn next(self) -> Self {
        match self {
            UploadStage::Start => UploadStage::Validated,
            UploadStage::Validated => UploadStage::UrlIssued,
            UploadStage::UrlIssued => UploadStage::Stored,
            UploadStage::Stored => UploadStage::Published,
            UploadStage::Published => UploadStage::Done,
            UploadStage::Done => UploadStage::Done,
            UploadStage::Failed => UploadStage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStage::Done | UploadStage::Failed)
    }
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStage::Start => write!(f, "start"),
            UploadStage::Validated => write!(f, "validated"),
            UploadStage::UrlIssued => write!(f, "url_issued"),
            UploadStage::Stored => write!(f, "stored"),
            UploadStage::Published => write!(f, "published"),
            UploadStage::Done => write!(f, "done"),
            UploadStage::Failed => write!(f, "failed"),
        }
    }
}
