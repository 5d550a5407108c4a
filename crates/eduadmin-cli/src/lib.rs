use std::path::PathBuf;

use eduadmin_api_client::{ApiClient, UploadFile};
use eduadmin_core::{
    validate_file_with, FolderConfig, FolderTable, UploadError, UploadOutcome, UploadResult,
    ValidationOutcome,
};
use serde::Serialize;

/// Per-file reports of one command and whether every file went through.
#[derive(Debug)]
pub struct CommandReport<T> {
    pub reports: Vec<T>,
    pub all_ok: bool,
}

impl<T> CommandReport<T> {
    /// Process exit code: 0 when every file succeeded, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_ok {
            0
        } else {
            1
        }
    }
}

/// One row of `eduadmin folders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRow {
    pub folder: String,
    #[serde(flatten)]
    pub config: FolderConfig,
}

/// Folder table as printable rows, with the fallback listed last as `*`.
pub fn folder_rows(table: &FolderTable) -> Vec<FolderRow> {
    table
        .iter()
        .map(|(name, config)| FolderRow {
            folder: name.to_string(),
            config: *config,
        })
        .chain(std::iter::once(FolderRow {
            folder: "*".to_string(),
            config: *table.fallback(),
        }))
        .collect()
}

/// Per-file line of `eduadmin validate`.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub file: String,
    #[serde(flatten)]
    pub outcome: ValidationOutcome,
}

/// Per-file line of `eduadmin upload`.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub file: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_after: Option<String>,
}

impl UploadReport {
    pub fn new(file: impl Into<String>, result: &Result<UploadResult, UploadError>) -> Self {
        let file = file.into();
        match result {
            Ok(done) => Self {
                file,
                success: done.success,
                relative_path: Some(done.relative_path.clone()),
                error: None,
                error_code: None,
                failed_after: None,
            },
            Err(err) => Self {
                file,
                success: false,
                relative_path: None,
                error: Some(err.to_string()),
                error_code: Some(err.error_code()),
                failed_after: Some(err.stage().to_string()),
            },
        }
    }
}

/// `eduadmin validate`: check files against `folder` using only their size on
/// disk and their content type. File contents are never read.
pub async fn validate_paths(
    table: &FolderTable,
    paths: &[PathBuf],
    folder: &str,
    content_type: Option<&str>,
) -> anyhow::Result<CommandReport<ValidationReport>> {
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let metadata = UploadFile::metadata_from_path(path, content_type).await?;
        let outcome = validate_file_with(table, &metadata, folder);
        reports.push(ValidationReport {
            file: metadata.name,
            outcome,
        });
    }

    let all_ok = reports.iter().all(|r| r.outcome.valid);
    Ok(CommandReport { reports, all_ok })
}

/// `eduadmin upload`: validate every file from its metadata, read only the ones
/// that pass, and upload those concurrently. Reports keep the input order.
pub async fn upload_paths(
    client: &ApiClient,
    paths: &[PathBuf],
    folder: &str,
    content_type: Option<&str>,
    concurrency: usize,
) -> anyhow::Result<CommandReport<UploadReport>> {
    let mut names = Vec::with_capacity(paths.len());
    let mut outcomes: Vec<Option<UploadOutcome<UploadResult>>> = Vec::with_capacity(paths.len());
    let mut pending = Vec::new();
    let mut pending_slots = Vec::new();

    for (slot, path) in paths.iter().enumerate() {
        let metadata = UploadFile::metadata_from_path(path, content_type).await?;
        names.push(metadata.name.clone());

        match client.validate(&metadata, folder).into_result() {
            Ok(()) => {
                pending.push(UploadFile::from_path(path, content_type).await?);
                pending_slots.push(slot);
                outcomes.push(None);
            }
            Err(message) => {
                tracing::debug!(file = %metadata.name, error = %message, "Skipping invalid file");
                outcomes.push(Some(Err(UploadError::Validation(message))));
            }
        }
    }

    let results = client.upload_many(&pending, folder, concurrency).await;
    for (slot, result) in pending_slots.into_iter().zip(results) {
        outcomes[slot] = Some(result);
    }

    let reports: Vec<UploadReport> = names
        .iter()
        .zip(outcomes)
        .filter_map(|(name, outcome)| outcome.map(|o| UploadReport::new(name.as_str(), &o)))
        .collect();
    let all_ok = reports.iter().all(|r| r.success);
    Ok(CommandReport { reports, all_ok })
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_follows_all_ok() {
        let ok: CommandReport<UploadReport> = CommandReport {
            reports: Vec::new(),
            all_ok: true,
        };
        assert_eq!(ok.exit_code(), 0);
        let failed: CommandReport<UploadReport> = CommandReport {
            reports: Vec::new(),
            all_ok: false,
        };
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn folder_rows_end_with_fallback() {
        let table = FolderTable::builtin();
        let rows = folder_rows(&table);
        assert_eq!(rows.len(), table.len() + 1);
        let last = rows.last().unwrap();
        assert_eq!(last.folder, "*");
        assert_eq!(last.config.max_size_mb, 5);
    }

    #[test]
    fn folder_row_json_is_flat() {
        let rows = folder_rows(&FolderTable::builtin());
        let value = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(value["folder"], "profile-images");
        assert_eq!(value["maxSizeMb"], 5);
        assert_eq!(value["acceptedTypes"][0], "JPEG");
    }

    #[test]
    fn upload_report_success() {
        let result = Ok(UploadResult {
            relative_path: "profile-images/a.png".to_string(),
            success: true,
        });
        let report = UploadReport::new("a.png", &result);
        assert!(report.success);
        assert_eq!(report.relative_path.as_deref(), Some("profile-images/a.png"));
        assert!(report.error.is_none());
    }

    #[test]
    fn upload_report_failure_names_step() {
        let result = Err(UploadError::StorageStatus { status: 500 });
        let report = UploadReport::new("a.png", &result);
        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("Upload failed with status 500"));
        assert_eq!(report.error_code, Some("STORAGE_REJECTED"));
        assert_eq!(report.failed_after.as_deref(), Some("url_issued"));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("relativePath").is_none());
    }

    #[test]
    fn validation_report_flattens_outcome() {
        let report = ValidationReport {
            file: "x.gif".to_string(),
            outcome: ValidationOutcome::invalid("Invalid file type. Accepted types: PDF"),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["file"], "x.gif");
        assert_eq!(json["valid"], false);
        assert_eq!(json["error"], "Invalid file type. Accepted types: PDF");
    }
}
