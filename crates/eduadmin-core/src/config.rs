//! Configuration module
//!
//! Client-side settings for talking to the eduadmin backend, read from the
//! process environment. Loading a `.env` file is left to binaries.

use std::env;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const HTTP_TIMEOUT_SECS: u64 = 60;
const UPLOAD_CONCURRENCY: usize = 4;

/// Client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    /// Bearer token sent with backend requests
    pub api_token: Option<String>,
    pub http_timeout_secs: u64,
    /// Maximum uploads in flight for multi-file uploads
    pub upload_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            upload_concurrency: UPLOAD_CONCURRENCY,
        }
    }
}

impl ClientConfig {
    /// Load from environment: EDUADMIN_API_URL (or API_URL), EDUADMIN_API_TOKEN (or
    /// API_TOKEN), EDUADMIN_HTTP_TIMEOUT_SECS, EDUADMIN_UPLOAD_CONCURRENCY.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("EDUADMIN_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "EDUADMIN_API_URL must start with http:// or https://, got '{}'",
                api_url
            ));
        }

        let api_token = lookup("EDUADMIN_API_TOKEN")
            .or_else(|| lookup("API_TOKEN"))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let http_timeout_secs = match lookup("EDUADMIN_HTTP_TIMEOUT_SECS") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("EDUADMIN_HTTP_TIMEOUT_SECS must be a valid number")
            })?,
            None => HTTP_TIMEOUT_SECS,
        };

        let upload_concurrency = lookup("EDUADMIN_UPLOAD_CONCURRENCY")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(UPLOAD_CONCURRENCY);

        Ok(Self {
            api_url,
            api_token,
            http_timeout_secs,
            upload_concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("EDUADMIN_API_URL", "https://api.school.example/"),
            ("EDUADMIN_API_TOKEN", "tok-123"),
            ("EDUADMIN_HTTP_TIMEOUT_SECS", "15"),
            ("EDUADMIN_UPLOAD_CONCURRENCY", "8"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://api.school.example");
        assert_eq!(config.api_token.as_deref(), Some("tok-123"));
        assert_eq!(config.http_timeout_secs, 15);
        assert_eq!(config.upload_concurrency, 8);
    }

    #[test]
    fn falls_back_to_generic_names() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("API_URL", "http://backend:3000"),
            ("API_TOKEN", "generic"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://backend:3000");
        assert_eq!(config.api_token.as_deref(), Some("generic"));
    }

    #[test]
    fn blank_token_is_treated_as_missing() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("EDUADMIN_API_TOKEN", "  ")])).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn from_env_does_not_load_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "EDUADMIN_UPLOAD_CONCURRENCY=97\nEDUADMIN_HTTP_TIMEOUT_SECS=97\n",
        )
        .unwrap();

        let previous = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();
        let config = ClientConfig::from_env();
        env::set_current_dir(previous).unwrap();

        let config = config.unwrap();
        assert_ne!(config.upload_concurrency, 97);
        assert_ne!(config.http_timeout_secs, 97);
    }

    #[test]
    fn rejects_non_http_url() {
        let result = ClientConfig::from_lookup(lookup_from(&[("EDUADMIN_API_URL", "ftp://x")]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_timeout_and_ignores_zero_concurrency() {
        assert!(ClientConfig::from_lookup(lookup_from(&[(
            "EDUADMIN_HTTP_TIMEOUT_SECS",
            "soon"
        )]))
        .is_err());

        let config =
            ClientConfig::from_lookup(lookup_from(&[("EDUADMIN_UPLOAD_CONCURRENCY", "0")]))
                .unwrap();
        assert_eq!(config.upload_concurrency, UPLOAD_CONCURRENCY);
    }
}
