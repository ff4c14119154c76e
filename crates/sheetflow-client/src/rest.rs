//! REST backend for the remote spreadsheet service.
//!
//! One [`RestClient`] is bound to one spreadsheet document and one bearer
//! credential. Calls are strictly sequential and never retried: any
//! non-success status is surfaced as [`ClientError::Status`] carrying the
//! operation name and the literal status code, and the whole action aborts.

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use thiserror::Error;
use tracing::debug;

use sheetflow_core::{RawCell, RawGrid};

use crate::traits::{AppendSummary, ClearSummary, SheetsClient, SpreadsheetInfo, UpdateSummary};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
const DRIVE_BASE_URL: &str = "https://www.googleapis.com";
const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

const SPREADSHEET_MIME_QUERY: &str = "mimeType='application/vnd.google-apps.spreadsheet'";
/// Status the revocation endpoint returns for a token that is already
/// revoked; tolerated as success.
const ALREADY_REVOKED_STATUS: u16 = 400;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{operation} returned unexpected status {status}")]
    Status { operation: &'static str, status: u16 },

    #[error("{operation} transport failure: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned an undecodable body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP client bound to one spreadsheet document.
pub struct RestClient {
    http: reqwest::blocking::Client,
    token: String,
    spreadsheet_id: String,
    sheets_url: String,
    drive_url: String,
    revoke_url: String,
}

impl RestClient {
    /// Client without a bound document; only the datasource-level calls
    /// ([`Self::list_spreadsheets`], [`Self::probe`], [`Self::revoke_token`])
    /// are meaningful on it.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            token: token.into(),
            spreadsheet_id: String::new(),
            sheets_url: SHEETS_BASE_URL.to_string(),
            drive_url: DRIVE_BASE_URL.to_string(),
            revoke_url: REVOKE_URL.to_string(),
        }
    }

    /// Client bound to the spreadsheet document an action targets.
    pub fn for_spreadsheet(token: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        let mut client = Self::new(token);
        client.spreadsheet_id = spreadsheet_id.into();
        client
    }

    /// Override endpoint roots; intended for tests against a local stub.
    pub fn with_endpoints(
        mut self,
        sheets_url: impl Into<String>,
        drive_url: impl Into<String>,
        revoke_url: impl Into<String>,
    ) -> Self {
        self.sheets_url = sheets_url.into();
        self.drive_url = drive_url.into();
        self.revoke_url = revoke_url.into();
        self
    }

    fn send(
        &self,
        operation: &'static str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|source| ClientError::Transport { operation, source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{range}{suffix}",
            self.sheets_url, self.spreadsheet_id
        )
    }

    /// Sequentially page through the document catalog. Each page fetch
    /// depends on the previous page's continuation token.
    pub fn list_spreadsheets(&self) -> Result<Vec<SpreadsheetInfo>, ClientError> {
        let operation = "listSpreadsheets";
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http
                .get(format!("{}/drive/v3/files", self.drive_url))
                .query(&[
                    ("q", SPREADSHEET_MIME_QUERY),
                    ("fields", "files(id,name),nextPageToken"),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: FileListResponse = self
                .send(operation, request)?
                .json()
                .map_err(|source| ClientError::Decode { operation, source })?;
            debug!(files = page.files.len(), "fetched catalog page");
            files.extend(
                page.files
                    .into_iter()
                    .map(|f| SpreadsheetInfo { id: f.id, name: f.name }),
            );
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }
        Ok(files)
    }

    /// Connectivity probe: fetch a single catalog entry and discard it.
    pub fn probe(&self) -> Result<(), ClientError> {
        let request = self
            .http
            .get(format!("{}/drive/v3/files", self.drive_url))
            .query(&[
                ("q", SPREADSHEET_MIME_QUERY),
                ("fields", "files(id)"),
                ("pageSize", "1"),
            ]);
        self.send("probe", request).map(|_| ())
    }

    /// Revoke the datasource credential. The already-revoked status is
    /// tolerated as success; anything else non-success is fatal.
    pub fn revoke_token(&self) -> Result<(), ClientError> {
        let operation = "revokeToken";
        let response = self
            .http
            .post(&self.revoke_url)
            .query(&[("token", self.token.as_str())])
            .send()
            .map_err(|source| ClientError::Transport { operation, source })?;
        let status = response.status();
        if status.is_success() || status.as_u16() == ALREADY_REVOKED_STATUS {
            return Ok(());
        }
        Err(ClientError::Status {
            operation,
            status: status.as_u16(),
        })
    }
}

impl SheetsClient for RestClient {
    type Error = ClientError;

    fn get_values(&mut self, range: &str) -> Result<RawGrid, Self::Error> {
        let operation = "getValues";
        debug!(range, "fetching grid data");
        let request = self
            .http
            .get(format!(
                "{}/v4/spreadsheets/{}",
                self.sheets_url, self.spreadsheet_id
            ))
            .query(&[
                ("ranges", range),
                ("includeGridData", "true"),
                (
                    "fields",
                    "sheets.data.rowData.values(formattedValue,effectiveValue,userEnteredValue)",
                ),
            ]);
        let body: GridResponse = self
            .send(operation, request)?
            .json()
            .map_err(|source| ClientError::Decode { operation, source })?;

        let grid = body
            .sheets
            .into_iter()
            .next()
            .and_then(|sheet| sheet.data.into_iter().next())
            .map(|data| data.row_data.into_iter().map(|row| row.values).collect())
            .unwrap_or_default();
        Ok(grid)
    }

    fn update_values(
        &mut self,
        range: &str,
        rows: &[Vec<JsonValue>],
    ) -> Result<UpdateSummary, Self::Error> {
        let operation = "updateValues";
        debug!(range, rows = rows.len(), "updating values");
        let request = self
            .http
            .put(self.values_url(range, ""))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }));
        self.send(operation, request)?
            .json()
            .map_err(|source| ClientError::Decode { operation, source })
    }

    fn append_values(
        &mut self,
        range: &str,
        rows: &[Vec<JsonValue>],
    ) -> Result<AppendSummary, Self::Error> {
        let operation = "appendValues";
        debug!(range, rows = rows.len(), "appending values");
        let request = self
            .http
            .post(self.values_url(range, ":append"))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }));
        self.send(operation, request)?
            .json()
            .map_err(|source| ClientError::Decode { operation, source })
    }

    fn clear_values(&mut self, range: &str) -> Result<ClearSummary, Self::Error> {
        let operation = "clearValues";
        debug!(range, "clearing values");
        let request = self.http.post(self.values_url(range, ":clear")).json(&json!({}));
        self.send(operation, request)?
            .json()
            .map_err(|source| ClientError::Decode { operation, source })
    }
}

#[derive(Debug, Default, Deserialize)]
struct GridResponse {
    #[serde(default)]
    sheets: Vec<GridSheet>,
}

#[derive(Debug, Default, Deserialize)]
struct GridSheet {
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    row_data: Vec<GridRow>,
}

#[derive(Debug, Default, Deserialize)]
struct GridRow {
    #[serde(default)]
    values: Vec<RawCell>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileEntry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}
