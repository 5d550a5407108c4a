//! eduadmin CLI — upload files to the eduadmin backend.
//!
//! Set EDUADMIN_API_URL (or API_URL) and EDUADMIN_API_TOKEN (or API_TOKEN).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use eduadmin_api_client::ApiClient;
use eduadmin_cli::{folder_rows, init_tracing, upload_paths, validate_paths};
use eduadmin_core::{ClientConfig, FolderTable};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "eduadmin", about = "eduadmin upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List upload folders and their size/type limits
    Folders,
    /// Check files against a folder's limits without uploading
    Validate {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Destination folder, e.g. profile-images
        #[arg(long)]
        folder: String,
        /// Override the MIME type guessed from the extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Upload files through the signed-URL flow
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Destination folder, e.g. homework-files
        #[arg(long)]
        folder: String,
        /// Override the MIME type guessed from the extension
        #[arg(long)]
        content_type: Option<String>,
        /// Maximum uploads in flight (defaults to EDUADMIN_UPLOAD_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Folders => {
            print_json(&folder_rows(&FolderTable::builtin()))?;
        }
        Commands::Validate {
            files,
            folder,
            content_type,
        } => {
            let table = FolderTable::builtin();
            if !table.contains(&folder) {
                tracing::warn!(folder = %folder, "Unknown folder, default limits apply");
            }
            let report = validate_paths(&table, &files, &folder, content_type.as_deref()).await?;
            print_json(&report.reports)?;
            if !report.all_ok {
                std::process::exit(report.exit_code());
            }
        }
        Commands::Upload {
            files,
            folder,
            content_type,
            concurrency,
        } => {
            let config = ClientConfig::from_env().context(
                "Failed to load configuration. Set EDUADMIN_API_URL and EDUADMIN_API_TOKEN",
            )?;
            let client = ApiClient::from_config(&config).context("Failed to create API client")?;
            if !client.folders().contains(&folder) {
                tracing::warn!(folder = %folder, "Unknown folder, default limits apply");
            }

            let concurrency = concurrency.unwrap_or(config.upload_concurrency);
            let report = upload_paths(
                &client,
                &files,
                &folder,
                content_type.as_deref(),
                concurrency,
            )
            .await?;
            print_json(&report.reports)?;

            if !report.all_ok {
                let failed = report.reports.iter().filter(|r| !r.success).count();
                tracing::warn!(failed, total = report.reports.len(), "Some uploads failed");
                std::process::exit(report.exit_code());
            }
        }
    }

    Ok(())
}
