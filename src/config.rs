//! Adapter and client settings loaded from a JSON file and the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::range::{AdapterConfig, RangeAdapter};
use crate::sheets::http_client::DEFAULT_TIMEOUT_SECS;
use crate::sheets::{Credentials, HttpSheetsClient, ServiceError, ValueRenderOption, DEFAULT_ENDPOINT};

pub const ENV_SPREADSHEET_ID: &str = "SHEETS_SPREADSHEET_ID";
pub const ENV_ACCESS_TOKEN: &str = "SHEETS_ACCESS_TOKEN";
pub const ENV_API_KEY: &str = "SHEETS_API_KEY";
pub const ENV_ENDPOINT: &str = "SHEETS_ENDPOINT";

/// Settings file, e.g.
///
/// ```json
/// { "spreadsheetId": "1f5e...", "headerRows": 1, "accessToken": "ya29..." }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub header_rows: usize,
    #[serde(default)]
    pub index_cols: usize,
    #[serde(default)]
    pub value_render_option: ValueRenderOption,
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("spreadsheetId is not set (config file or SHEETS_SPREADSHEET_ID)")]
    MissingSpreadsheetId,

    #[error("building http client: {0}")]
    Http(#[from] ServiceError),
}

impl SheetsConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Override settings from `SHEETS_*` environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    pub fn apply_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = lookup(ENV_SPREADSHEET_ID) {
            self.spreadsheet_id = id;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        self
    }

    pub fn adapter_config(&self) -> Result<AdapterConfig, ConfigError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::MissingSpreadsheetId);
        }
        Ok(AdapterConfig::new(self.spreadsheet_id.trim())
            .header_rows(self.header_rows)
            .index_cols(self.index_cols)
            .value_render_option(self.value_render_option))
    }

    /// An access token wins over an API key
    pub fn credentials(&self) -> Credentials {
        match (&self.access_token, &self.api_key) {
            (Some(token), _) => Credentials::AccessToken(token.clone()),
            (None, Some(key)) => Credentials::ApiKey(key.clone()),
            (None, None) => Credentials::None,
        }
    }

    pub fn build_client(&self) -> Result<HttpSheetsClient, ConfigError> {
        let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let timeout = Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        Ok(HttpSheetsClient::with_endpoint(endpoint, self.credentials(), timeout)?)
    }

    /// HTTP client and adapter in one step
    pub fn connect(&self) -> Result<RangeAdapter<HttpSheetsClient>, ConfigError> {
        let config = self.adapter_config()?;
        Ok(RangeAdapter::new(self.build_client()?, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"spreadsheetId": "abc", "headerRows": 1, "valueRenderOption": "UNFORMATTED_VALUE"}}"#
        )
        .unwrap();

        let config = SheetsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.spreadsheet_id, "abc");
        assert_eq!(config.header_rows, 1);
        assert_eq!(config.index_cols, 0);
        assert_eq!(config.value_render_option, ValueRenderOption::UnformattedValue);
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_missing_file() {
        let err = SheetsConfig::from_file("/nonexistent/sheets.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = SheetsConfig::from_json("{ spreadsheetId").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_SPREADSHEET_ID, "from-env"),
            (ENV_ACCESS_TOKEN, "token"),
            (ENV_API_KEY, "  "),
        ]);
        let config = SheetsConfig::from_json(r#"{"spreadsheetId": "from-file", "apiKey": "key"}"#)
            .unwrap()
            .apply_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.spreadsheet_id, "from-env");
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.credentials(), Credentials::AccessToken("token".to_string()));
    }

    #[test]
    fn test_adapter_config_requires_id() {
        let err = SheetsConfig::default().adapter_config().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSpreadsheetId));

        let config = SheetsConfig::from_json(r#"{"spreadsheetId": "abc", "headerRows": 1, "indexCols": 2}"#)
            .unwrap()
            .adapter_config()
            .unwrap();
        assert_eq!(config, AdapterConfig::new("abc").header_rows(1).index_cols(2));
    }

    #[test]
    fn test_connect_uses_endpoint() {
        let config = SheetsConfig::from_json(
            r#"{"spreadsheetId": "abc", "endpoint": "http://localhost:9000/v4", "apiKey": "k"}"#,
        )
        .unwrap();
        let adapter = config.connect().unwrap();
        assert_eq!(adapter.service().endpoint().as_str(), "http://localhost:9000/v4");
        assert_eq!(adapter.config().spreadsheet_id, "abc");
    }
}
