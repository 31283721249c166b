//! Request and response bodies for the spreadsheet backend.
//!
//! All types model the Google Sheets v4 / Drive v3 JSON surface this
//! component touches. Field names follow the wire's camelCase via serde
//! renames.

use serde::{Deserialize, Serialize};

/// Body for `POST /v4/spreadsheets`: `{"properties": {"title": ...}}`.
#[derive(Debug, Serialize)]
pub struct CreateSpreadsheetRequest {
    pub properties: SpreadsheetProperties,
}

#[derive(Debug, Serialize)]
pub struct SpreadsheetProperties {
    pub title: String,
}

/// Response to spreadsheet creation, narrowed to the id via
/// `?fields=spreadsheetId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpreadsheetResponse {
    pub spreadsheet_id: String,
}

/// Response to a Drive file listing: `{"files": [{"id", "name"}, ...]}`.
#[derive(Debug, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

/// Body for `POST /drive/v3/files/{id}/permissions`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "type")]
    pub grantee_type: String,
    pub role: String,
    pub email_address: String,
}

impl Permission {
    /// A `writer` grant for an individual user account.
    pub fn writer_for(email: &str) -> Self {
        Self {
            grantee_type: "user".to_string(),
            role: "writer".to_string(),
            email_address: email.to_string(),
        }
    }
}

/// Body for `POST /v4/spreadsheets/{id}:batchUpdate`. Only the `addSheet`
/// request kind is used here.
#[derive(Debug, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<SheetRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRequest {
    pub add_sheet: AddSheet,
}

#[derive(Debug, Serialize)]
pub struct AddSheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub title: String,
    pub grid_properties: GridProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    pub row_count: u32,
    pub column_count: u32,
}

/// Body for `PUT /v4/spreadsheets/{id}/values/{range}`.
#[derive(Debug, Serialize)]
pub struct UpdateValuesRequest {
    pub values: Vec<Vec<String>>,
}

/// Summary returned by a values update; used for debug logging only.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateValuesResponse {
    pub updated_rows: u32,
    pub updated_columns: u32,
    pub updated_cells: u32,
}
