//! Shared HTTP client for the eduadmin backend.
//!
//! Provides a minimal client with injectable bearer credentials, generic GET/POST
//! helpers, and the signed-URL upload protocol (see [`upload`]).

pub mod auth;
pub mod upload;

use anyhow::{Context, Result};
use eduadmin_core::{ClientConfig, FolderTable};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use auth::{Auth, StaticToken, TokenProvider};
pub use upload::{UploadFile, UploadSession, SIGNED_URL_PATH, VERIFY_PUBLISH_PATH};

// Re-export domain types for convenience.
pub use eduadmin_core::{UploadError, UploadResult, UploadStage, ValidationOutcome};

/// HTTP client for the eduadmin backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
    folders: FolderTable,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        Self::with_timeout(base_url, auth, Duration::from_secs(60))
    }

    pub fn with_timeout(base_url: String, auth: Auth, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            folders: FolderTable::builtin(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let auth = match &config.api_token {
            Some(token) => Auth::Bearer(token.clone()),
            None => Auth::None,
        };
        Self::with_timeout(
            config.api_url.clone(),
            auth,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Create client from environment. See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env().context("Failed to load client configuration")?;
        Self::from_config(&config)
    }

    /// Replace the folder constraint table used for local validation.
    pub fn with_folder_table(mut self, folders: FolderTable) -> Self {
        self.folders = folders;
        self
    }

    pub fn folders(&self) -> &FolderTable {
        &self.folders
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the given token, if any. The token is resolved once per call by the
    /// caller so the builder itself never touches credential storage.
    fn apply_auth(
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned, Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let url = self.build_url(path);
        let token = self.auth.current_token();
        let request = Self::apply_auth(self.client.get(&url), token.as_deref()).query(query);

        let response = request.send().await.context("Failed to send request")?;
        Self::parse_json(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let token = self.auth.current_token();
        let request = Self::apply_auth(self.client.post(&url).json(body), token.as_deref());

        let response = request.send().await.context("Failed to send request")?;
        Self::parse_json(response).await
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }

    /// Raw client for custom requests. Carries no credentials.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
