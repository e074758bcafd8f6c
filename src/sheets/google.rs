//! Google Sheets v4 REST implementation of [`SheetClient`].

use async_trait::async_trait;
use log::debug;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::{fetch_access_token, load_service_account_key};
use super::{is_quota_message, SheetClient, SheetValues, SheetsError};
use crate::config::SheetsConfig;

/// Google Sheets client authenticated with a bearer token.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl GoogleSheetsClient {
    /// Authenticate with the configured service account and build a client.
    ///
    /// # Errors
    /// Returns [`SheetsError::Config`] when no credential path is configured or the
    /// credential file cannot be used.
    pub async fn connect(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let path = config.resolve_credentials_path().ok_or_else(|| {
            SheetsError::Config(format!(
                "Missing service account credentials: set sheets.credentials_path or the {} environment variable",
                config.credentials_env
            ))
        })?;

        let key = load_service_account_key(&path)?;
        let http = reqwest::Client::new();
        let token = fetch_access_token(&http, &key, config.token_url.as_deref()).await?;
        Self::build(http, &config.api_base_url, token)
    }

    /// Build a client around an already issued access token.
    pub fn with_token(base_url: &str, access_token: impl Into<String>) -> Result<Self, SheetsError> {
        Self::build(reqwest::Client::new(), base_url, access_token.into())
    }

    fn build(http: reqwest::Client, base_url: &str, access_token: String) -> Result<Self, SheetsError> {
        let base_url =
            Url::parse(base_url).map_err(|e| SheetsError::Config(format!("Invalid Sheets API URL '{}': {}", base_url, e)))?;
        Ok(Self {
            http,
            base_url,
            access_token,
        })
    }

    /// Build `{base}/v4/spreadsheets/{id}[/values/{segment}]`.
    fn url(&self, spreadsheet_id: &str, values_segment: Option<&str>) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::Config(format!("Invalid Sheets API URL '{}'", self.base_url)))?;
            segments.pop_if_empty().extend(["v4", "spreadsheets", spreadsheet_id]);
            if let Some(segment) = values_segment {
                segments.extend(["values", segment]);
            }
        }
        Ok(url)
    }

    async fn check(response: Response, spreadsheet_id: &str, range: Option<&str>) -> Result<Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|parsed| parsed.error.message)
            .unwrap_or(body);
        Err(classify_error(status, &message, spreadsheet_id, range))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, SheetsError> {
        request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SheetsError::Other(e.to_string()))
    }
}

/// Quote a tab title as an A1 range covering the whole tab.
pub fn tab_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// Translate an API failure into the error taxonomy.
pub fn classify_error(status: StatusCode, message: &str, spreadsheet_id: &str, range: Option<&str>) -> SheetsError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => SheetsError::Quota(message.to_string()),
        _ if is_quota_message(message) => SheetsError::Quota(message.to_string()),
        StatusCode::FORBIDDEN => SheetsError::AccessDenied {
            spreadsheet_id: spreadsheet_id.to_string(),
        },
        StatusCode::NOT_FOUND => SheetsError::NotFound {
            spreadsheet_id: spreadsheet_id.to_string(),
        },
        StatusCode::BAD_REQUEST if message.contains("Unable to parse range") => SheetsError::RangeParse {
            range: range.unwrap_or(message).to_string(),
        },
        _ => SheetsError::Other(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetClient for GoogleSheetsClient {
    fn client_type(&self) -> &str {
        "google"
    }

    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        let mut url = self.url(spreadsheet_id, None)?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

        debug!("Listing tabs of spreadsheet {}", spreadsheet_id);
        let response = self.send(self.http.get(url)).await?;
        let response = Self::check(response, spreadsheet_id, None).await?;
        let metadata: SpreadsheetMetadata = response
            .json()
            .await
            .map_err(|e| SheetsError::Other(format!("Invalid spreadsheet metadata: {}", e)))?;

        Ok(metadata.sheets.into_iter().map(|sheet| sheet.properties.title).collect())
    }

    async fn read_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<SheetValues, SheetsError> {
        let range = tab_range(tab);
        let url = self.url(spreadsheet_id, Some(&range))?;

        debug!("Reading {} from spreadsheet {}", range, spreadsheet_id);
        let response = self.send(self.http.get(url)).await?;
        let response = Self::check(response, spreadsheet_id, Some(tab)).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::Other(format!("Invalid values response: {}", e)))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn write_tab(&self, spreadsheet_id: &str, tab: &str, values: &SheetValues) -> Result<(), SheetsError> {
        let range = tab_range(tab);
        let mut url = self.url(spreadsheet_id, Some(&range))?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        debug!("Writing {} rows to {} in spreadsheet {}", values.len(), range, spreadsheet_id);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });
        let response = self.send(self.http.put(url).json(&body)).await?;
        Self::check(response, spreadsheet_id, Some(tab)).await?;
        Ok(())
    }

    async fn clear_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<(), SheetsError> {
        let range = format!("{}:clear", tab_range(tab));
        let url = self.url(spreadsheet_id, Some(&range))?;

        debug!("Clearing {} in spreadsheet {}", tab, spreadsheet_id);
        let response = self.send(self.http.post(url).json(&json!({}))).await?;
        Self::check(response, spreadsheet_id, Some(tab)).await?;
        Ok(())
    }
}
