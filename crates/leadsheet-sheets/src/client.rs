//! HTTP client for the spreadsheet backend.
//!
//! Wraps `reqwest` over the Google Sheets v4 and Drive v3 REST surfaces with
//! bearer authentication, typed response deserialization, and error-envelope
//! handling. All calls are single-shot: no retry, no internal timeout beyond
//! the client-wide request timeout.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::SheetsError;
use crate::types::{
    AddSheet, BatchUpdateRequest, CreateSpreadsheetRequest, CreateSpreadsheetResponse, FileList,
    GridProperties, Permission, SheetProperties, SheetRequest, SpreadsheetProperties,
    UpdateValuesRequest, UpdateValuesResponse,
};

const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com";

/// Client for the spreadsheet/file-storage backend.
///
/// Holds the HTTP client, bearer token, and the two API base URLs. Use
/// [`SheetsClient::new`] for production or [`SheetsClient::with_base_urls`]
/// to point at a mock server in tests.
pub struct SheetsClient {
    client: Client,
    access_token: String,
    sheets_base_url: Url,
    drive_base_url: Url,
}

impl SheetsClient {
    /// Creates a new client pointed at the production API endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64) -> Result<Self, SheetsError> {
        Self::with_base_urls(
            access_token,
            timeout_secs,
            DEFAULT_SHEETS_BASE_URL,
            DEFAULT_DRIVE_BASE_URL,
        )
    }

    /// Creates a new client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SheetsError::InvalidBaseUrl`] if either
    /// base URL does not parse as a hierarchical URL.
    pub fn with_base_urls(
        access_token: &str,
        timeout_secs: u64,
        sheets_base_url: &str,
        drive_base_url: &str,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("leadsheet/0.1 (lead-export)")
            .build()?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            sheets_base_url: parse_base_url(sheets_base_url)?,
            drive_base_url: parse_base_url(drive_base_url)?,
        })
    }

    /// Searches Drive for a file with exactly the given name and returns the
    /// first match's id.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if the backend answers with a non-2xx status.
    /// - [`SheetsError::Http`] on network failure.
    /// - [`SheetsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn find_file_by_title(&self, title: &str) -> Result<Option<String>, SheetsError> {
        let mut url = endpoint(&self.drive_base_url, &["drive", "v3", "files"])?;
        let query = format!("name = '{}'", escape_query_value(title));
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("spaces", "drive")
            .append_pair("fields", "files(id, name)");

        let list: FileList = self.send_json(self.client.get(url), "files.list").await?;
        Ok(list.files.into_iter().next().map(|file| file.id))
    }

    /// Creates a new spreadsheet with the given title and returns its id.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if the backend answers with a non-2xx status.
    /// - [`SheetsError::Http`] on network failure.
    /// - [`SheetsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn create_spreadsheet(&self, title: &str) -> Result<String, SheetsError> {
        let mut url = endpoint(&self.sheets_base_url, &["v4", "spreadsheets"])?;
        url.query_pairs_mut().append_pair("fields", "spreadsheetId");

        let body = CreateSpreadsheetRequest {
            properties: SpreadsheetProperties {
                title: title.to_string(),
            },
        };
        let created: CreateSpreadsheetResponse = self
            .send_json(self.client.post(url).json(&body), "spreadsheets.create")
            .await?;
        Ok(created.spreadsheet_id)
    }

    /// Grants `email` writer access on the given file.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if the backend answers with a non-2xx status.
    /// - [`SheetsError::Http`] on network failure.
    pub async fn grant_writer(&self, file_id: &str, email: &str) -> Result<(), SheetsError> {
        let url = endpoint(
            &self.drive_base_url,
            &["drive", "v3", "files", file_id, "permissions"],
        )?;
        let body = Permission::writer_for(email);
        self.send_checked(self.client.post(url).json(&body), "permissions.create")
            .await?;
        Ok(())
    }

    /// Adds a worksheet with the given title and grid size to a spreadsheet.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if the backend answers with a non-2xx status
    ///   (including a duplicate worksheet title).
    /// - [`SheetsError::Http`] on network failure.
    pub async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        row_count: u32,
        column_count: u32,
    ) -> Result<(), SheetsError> {
        let op = format!("{spreadsheet_id}:batchUpdate");
        let url = endpoint(&self.sheets_base_url, &["v4", "spreadsheets", &op])?;

        let body = BatchUpdateRequest {
            requests: vec![SheetRequest {
                add_sheet: AddSheet {
                    properties: SheetProperties {
                        title: title.to_string(),
                        grid_properties: GridProperties {
                            row_count,
                            column_count,
                        },
                    },
                },
            }],
        };
        self.send_checked(
            self.client.post(url).json(&body),
            "spreadsheets.batchUpdate",
        )
        .await?;
        Ok(())
    }

    /// Writes `values` over the given A1-notation range in one bulk update
    /// (`valueInputOption=RAW`).
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if the backend answers with a non-2xx status.
    /// - [`SheetsError::Http`] on network failure.
    /// - [`SheetsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        let mut url = endpoint(
            &self.sheets_base_url,
            &["v4", "spreadsheets", spreadsheet_id, "values", range],
        )?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = UpdateValuesRequest { values };
        let summary: UpdateValuesResponse = self
            .send_json(self.client.put(url).json(&body), "values.update")
            .await?;
        tracing::debug!(
            range,
            updated_rows = summary.updated_rows,
            updated_cells = summary.updated_cells,
            "bulk write applied"
        );
        Ok(())
    }

    /// Sends an authenticated request and parses the body into `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, SheetsError> {
        let body = self.send_checked(request, context).await?;
        serde_json::from_str(&body).map_err(|e| SheetsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Sends an authenticated request, asserting a 2xx status. Non-2xx
    /// responses become [`SheetsError::Api`] carrying the backend's error
    /// envelope message.
    async fn send_checked(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<String, SheetsError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            tracing::debug!(context, status = status.as_u16(), "backend call failed");
            Err(SheetsError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            })
        }
    }
}

/// Parses and normalizes a base URL: exactly one trailing slash so that
/// endpoint paths append instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, SheetsError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| SheetsError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(SheetsError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "not a hierarchical URL".to_string(),
        });
    }
    Ok(url)
}

/// Appends path segments to a base URL with per-segment percent-encoding,
/// so worksheet names and ranges cannot break out of the path.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SheetsError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| SheetsError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "not a hierarchical URL".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Escapes a value for use inside a single-quoted Drive query expression.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Pulls the human-readable message out of a Google-style error envelope
/// (`{"error": {"code": ..., "message": ...}}`), falling back to the raw
/// body when the envelope is absent.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(serde_json::Value::as_str)
        {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "unknown error".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
