use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::client::SheetsService;
use super::types::*;

pub const DEFAULT_ENDPOINT: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How requests are authorized. Obtaining the token is up to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Credentials {
    #[default]
    None,
    /// OAuth 2.0 access token sent as a bearer header
    AccessToken(String),
    /// API key sent as the `key` query parameter (read-only access to public sheets)
    ApiKey(String),
}

/// `SheetsService` over the public REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpSheetsClient {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl HttpSheetsClient {
    pub fn new(credentials: Credentials) -> Result<Self, ServiceError> {
        Self::with_endpoint(
            DEFAULT_ENDPOINT,
            credentials,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_endpoint(
        endpoint: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, endpoint, credentials)
    }

    /// Use a preconfigured reqwest client (proxy, TLS or pool settings).
    pub fn with_client(
        client: reqwest::Client,
        endpoint: &str,
        credentials: Credentials,
    ) -> Result<Self, ServiceError> {
        // Ensure URL ends without a trailing slash so segments append cleanly
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| ServiceError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(ServiceError::InvalidEndpoint(endpoint.to_string()));
        }

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Append path segments to the endpoint, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::None => request,
            Credentials::AccessToken(token) => request.bearer_auth(token),
            Credentials::ApiKey(key) => request.query(&[("key", key)]),
        }
    }

    fn batch_get_request(
        &self,
        spreadsheet_id: &str,
        ranges: &[&str],
        major_dimension: MajorDimension,
        render: ValueRenderOption,
    ) -> Result<RequestBuilder, ServiceError> {
        let url = self.url(&["spreadsheets", spreadsheet_id, "values:batchGet"])?;

        let mut query: Vec<(&str, &str)> = ranges.iter().map(|r| ("ranges", *r)).collect();
        query.push(("majorDimension", major_dimension.as_str()));
        query.push(("valueRenderOption", render.as_str()));

        Ok(self.client.get(url).query(&query))
    }

    fn clear_request(&self, spreadsheet_id: &str, range: &str) -> Result<RequestBuilder, ServiceError> {
        let segment = format!("{}:clear", range);
        let url = self.url(&["spreadsheets", spreadsheet_id, "values", &segment])?;
        Ok(self.client.post(url).json(&serde_json::json!({})))
    }

    fn update_request(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<RequestBuilder, ServiceError> {
        let url = self.url(&["spreadsheets", spreadsheet_id, "values", range])?;
        Ok(self
            .client
            .put(url)
            .query(&[("valueInputOption", input.as_str())])
            .json(values))
    }

    fn append_request(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<RequestBuilder, ServiceError> {
        let segment = format!("{}:append", range);
        let url = self.url(&["spreadsheets", spreadsheet_id, "values", &segment])?;
        Ok(self
            .client
            .post(url)
            .query(&[("valueInputOption", input.as_str())])
            .json(values))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

/// Parse a response body, turning non-2xx statuses into `ServiceError::Api`.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ServiceError> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "sheets api request failed");
        return Err(ServiceError::from_body(status.as_u16(), body));
    }

    Ok(serde_json::from_str(body)?)
}

impl SheetsService for HttpSheetsClient {
    async fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[&str],
        major_dimension: MajorDimension,
        render: ValueRenderOption,
    ) -> Result<BatchGetValuesResponse, ServiceError> {
        debug!(spreadsheet_id, ?ranges, "batchGet");
        let request = self.batch_get_request(spreadsheet_id, ranges, major_dimension, render)?;
        self.send(request).await
    }

    async fn clear(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse, ServiceError> {
        debug!(spreadsheet_id, range, "clear");
        let request = self.clear_request(spreadsheet_id, range)?;
        self.send(request).await
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse, ServiceError> {
        debug!(spreadsheet_id, range, rows = values.values.len(), "update");
        let request = self.update_request(spreadsheet_id, range, values, input)?;
        self.send(request).await
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse, ServiceError> {
        debug!(spreadsheet_id, range, rows = values.values.len(), "append");
        let request = self.append_request(spreadsheet_id, range, values, input)?;
        self.send(request).await
    }
}
