//! Signed-URL upload protocol.
//!
//! An upload moves through `Start → Validated → UrlIssued → Stored → Published → Done`:
//!
//! 1. validate the file locally against its folder's constraints;
//! 2. ask the backend for a signed storage URL;
//! 3. POST the bytes straight to storage as a multipart form;
//! 4. ask the backend to verify and publish the stored object.
//!
//! Any failure moves the session to `Failed` and is returned to the caller as an
//! [`UploadError`]. Nothing is retried and nothing is rolled back, so a failed
//! verify step can leave an unpublished object in storage.

use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use eduadmin_core::{
    normalize_content_type, sanitize_file_name, validate_file_with, FileMetadata, LogLevel,
    SignedUrlQuery, SignedUrlResponse, UploadError, UploadOutcome, UploadResult, UploadStage,
    ValidationOutcome, VerifyPublishRequest, VerifyPublishResponse,
};
use futures::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};

use crate::ApiClient;

pub const SIGNED_URL_PATH: &str = "/upload/get-signed-url";
pub const VERIFY_PUBLISH_PATH: &str = "/upload/verify-and-publish";

const FALLBACK_FILE_NAME: &str = "upload.bin";

/// A local file ready to upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub metadata: FileMetadata,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            metadata: FileMetadata::new(name, data.len() as u64, content_type),
            data,
        }
    }

    /// Read a file from disk. The content type is guessed from the extension
    /// unless given; an unknown extension leaves it empty.
    pub async fn from_path(
        path: impl AsRef<Path>,
        content_type: Option<&str>,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let metadata = Self::metadata_from_path(path, content_type).await?;
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(Self::new(metadata.name, metadata.content_type, data))
    }

    /// Name, size and content type of a file on disk, without reading its bytes.
    pub async fn metadata_from_path(
        path: impl AsRef<Path>,
        content_type: Option<&str>,
    ) -> anyhow::Result<FileMetadata> {
        let path = path.as_ref();
        let fs_metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat file: {}", path.display()))?;
        if !fs_metadata.is_file() {
            return Err(anyhow::anyhow!("Not a regular file: {}", path.display()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => mime_guess::from_path(path)
                .first()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_default(),
        };

        Ok(FileMetadata::new(name, fs_metadata.len(), content_type))
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Where a session is. A failed session always carries its error.
#[derive(Debug, Clone)]
enum SessionState {
    InProgress(UploadStage),
    Failed(UploadError),
}

/// One run of the upload protocol for one file.
///
/// Sessions are independent: concurrent uploads share only the HTTP client.
#[derive(Debug)]
pub struct UploadSession<'a> {
    client: &'a ApiClient,
    file: &'a UploadFile,
    folder: String,
    state: SessionState,
    signed: Option<SignedUrlResponse>,
}

impl<'a> UploadSession<'a> {
    pub fn new(client: &'a ApiClient, file: &'a UploadFile, folder: impl Into<String>) -> Self {
        Self {
            client,
            file,
            folder: folder.into(),
            state: SessionState::InProgress(UploadStage::Start),
            signed: None,
        }
    }

    pub fn stage(&self) -> UploadStage {
        match self.state {
            SessionState::InProgress(stage) => stage,
            SessionState::Failed(_) => UploadStage::Failed,
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// The failure that moved this session to `Failed`.
    pub fn error(&self) -> Option<&UploadError> {
        match &self.state {
            SessionState::Failed(err) => Some(err),
            SessionState::InProgress(_) => None,
        }
    }

    /// Relative path issued by the backend, once a signed URL has been obtained.
    pub fn relative_path(&self) -> Option<&str> {
        self.signed.as_ref().map(|s| s.relative_path.as_str())
    }

    /// Drive the session to `Done` or `Failed`.
    ///
    /// Calling again on a finished session returns the same outcome without
    /// touching the network.
    #[tracing::instrument(
        skip(self),
        fields(
            folder = %self.folder,
            file_name = %self.file.metadata.name,
            file_size = self.file.metadata.size,
            operation = "upload_file"
        )
    )]
    pub async fn run(&mut self) -> UploadOutcome<UploadResult> {
        loop {
            let stage = match &self.state {
                SessionState::InProgress(stage) => *stage,
                SessionState::Failed(err) => return Err(err.clone()),
            };

            let step = match stage {
                UploadStage::Start => self.validate(),
                UploadStage::Validated => self.request_signed_url().await,
                UploadStage::UrlIssued => self.store().await,
                UploadStage::Stored => self.verify_and_publish().await,
                UploadStage::Failed => unreachable!("failed sessions carry their error"),
                UploadStage::Published | UploadStage::Done => {
                    self.state = SessionState::InProgress(UploadStage::Done);
                    let relative_path = self.relative_path().unwrap_or_default().to_string();
                    tracing::info!(relative_path = %relative_path, "Upload published");
                    return Ok(UploadResult {
                        relative_path,
                        success: true,
                    });
                }
            };

            match step {
                Ok(()) => self.state = SessionState::InProgress(stage.next()),
                Err(err) => {
                    log_failure(&err, stage);
                    self.state = SessionState::Failed(err.clone());
                    return Err(err);
                }
            }
        }
    }

    fn validate(&self) -> Result<(), UploadError> {
        validate_file_with(self.client.folders(), &self.file.metadata, &self.folder)
            .into_result()
            .map_err(UploadError::Validation)
    }

    async fn request_signed_url(&mut self) -> Result<(), UploadError> {
        let metadata = &self.file.metadata;
        let query = SignedUrlQuery {
            folder: self.folder.clone(),
            file_name: sanitize_file_name(&metadata.name),
            content_type: normalize_content_type(&metadata.content_type).to_string(),
            file_size: metadata.size,
        };

        let response: SignedUrlResponse = self
            .client
            .get(SIGNED_URL_PATH, &query)
            .await
            .map_err(|e| UploadError::SignedUrl(format!("{:#}", e)))?;

        if !response.success {
            return Err(UploadError::SignedUrl(
                "backend returned success: false".to_string(),
            ));
        }
        if response.upload_url.is_empty() || response.relative_path.is_empty() {
            return Err(UploadError::SignedUrl(
                "response is missing uploadUrl or relativePath".to_string(),
            ));
        }

        tracing::debug!(
            relative_path = %response.relative_path,
            extra_fields = response.form_fields().len(),
            "Signed URL issued"
        );
        self.signed = Some(response);
        Ok(())
    }

    async fn store(&self) -> Result<(), UploadError> {
        let signed = self
            .signed
            .as_ref()
            .ok_or_else(|| UploadError::SignedUrl("no signed URL was issued".to_string()))?;

        let form = build_upload_form(signed, self.file)?;

        // The signed URL is its own authorization; no bearer token goes to storage.
        let response = self
            .client
            .client()
            .post(&signed.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::StorageTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::StorageStatus {
                status: status.as_u16(),
            });
        }

        tracing::debug!(status = status.as_u16(), "Bytes stored");
        Ok(())
    }

    async fn verify_and_publish(&self) -> Result<(), UploadError> {
        let relative_path = self
            .relative_path()
            .ok_or_else(|| UploadError::VerifyPublish("no relative path".to_string()))?;

        let body = VerifyPublishRequest {
            relative_path: relative_path.to_string(),
        };
        let response: VerifyPublishResponse = self
            .client
            .post_json(VERIFY_PUBLISH_PATH, &body)
            .await
            .map_err(|e| UploadError::VerifyPublish(format!("{:#}", e)))?;

        if !response.success {
            return Err(UploadError::VerifyPublish(
                response
                    .message
                    .unwrap_or_else(|| "backend returned success: false".to_string()),
            ));
        }
        Ok(())
    }
}

/// Extra signed fields first, in the order the backend sent them, then the file
/// itself under `file`.
fn build_upload_form(signed: &SignedUrlResponse, file: &UploadFile) -> Result<Form, UploadError> {
    let mut form = Form::new();
    for (key, value) in signed.form_fields() {
        form = form.text(key, value);
    }

    let mut part = Part::stream_with_length(file.data.clone(), file.data.len() as u64)
        .file_name(file.metadata.name.clone());
    let content_type = file.metadata.content_type.as_str();
    if content_type.parse::<mime_guess::Mime>().is_ok() {
        part = part
            .mime_str(content_type)
            .map_err(|e| UploadError::StorageTransport(e.to_string()))?;
    }

    Ok(form.part("file", part))
}

fn log_failure(err: &UploadError, stage: UploadStage) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(%stage, code, error = %err, "Upload rejected"),
        LogLevel::Warn => tracing::warn!(
            %stage,
            code,
            error = %err,
            may_orphan_object = err.may_orphan_object(),
            "Upload failed"
        ),
        LogLevel::Error => tracing::error!(%stage, code, error = %err, "Upload failed"),
    }
}

impl ApiClient {
    /// Validate a file against this client's folder table without uploading.
    pub fn validate(&self, file: &FileMetadata, folder: &str) -> ValidationOutcome {
        validate_file_with(self.folders(), file, folder)
    }

    /// Upload one file into `folder` and return its relative path.
    pub async fn upload_file(
        &self,
        file: &UploadFile,
        folder: &str,
    ) -> UploadOutcome<UploadResult> {
        UploadSession::new(self, file, folder).run().await
    }

    /// Upload several files into `folder`, at most `concurrency` at a time.
    ///
    /// Results come back in input order. Each file succeeds or fails on its own.
    pub async fn upload_many(
        &self,
        files: &[UploadFile],
        folder: &str,
        concurrency: usize,
    ) -> Vec<UploadOutcome<UploadResult>> {
        stream::iter(files)
            .map(|file| self.upload_file(file, folder))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
