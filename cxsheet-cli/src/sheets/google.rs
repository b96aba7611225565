//! Google Sheets tabs as tables
//!
//! A spreadsheet may be named by id or by title; titles are resolved through
//! the Drive files listing visible to the service account.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::TokenSource;
use crate::api::client::{REQUEST_TIMEOUT_SECS, check_response, http_client};
use crate::convert::Table;
use crate::error::{CxSheetError, Result};

pub const SHEETS_URL: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_URL: &str = "https://www.googleapis.com/drive/v3";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

static SHEET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{40,}$").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheetsClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
    sheets_url: String,
    drive_url: String,
}

impl GoogleSheetsClient {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Result<Self> {
        Ok(Self {
            http: http_client(Duration::from_secs(REQUEST_TIMEOUT_SECS))?,
            tokens,
            sheets_url: SHEETS_URL.to_string(),
            drive_url: DRIVE_URL.to_string(),
        })
    }

    pub fn with_endpoints(mut self, sheets_url: impl Into<String>, drive_url: impl Into<String>) -> Self {
        self.sheets_url = sheets_url.into().trim_end_matches('/').to_string();
        self.drive_url = drive_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Spreadsheet id for an id or a title
    pub async fn resolve_id(&self, sheet: &str) -> Result<String> {
        if SHEET_ID_RE.is_match(sheet) {
            return Ok(sheet.to_string());
        }

        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            sheet.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let token = self.tokens.token().await?;
        let response = self
            .http
            .get(format!("{}/files", self.drive_url))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(|e| CxSheetError::remote("find spreadsheet", e))?;
        let list: FileList = check_response("find spreadsheet", response)
            .await?
            .json()
            .await
            .map_err(|e| CxSheetError::remote("find spreadsheet", e))?;

        let mut files = list.files.into_iter();
        let first = files.next().ok_or_else(|| {
            CxSheetError::table(format!(
                "spreadsheet '{}' not found or not shared with the service account",
                sheet
            ))
        })?;
        if files.next().is_some() {
            log::warn!("Several spreadsheets are named '{}', using {}", sheet, first.id);
        }
        log::debug!("Resolved spreadsheet '{}' to {}", first.name, first.id);
        Ok(first.id)
    }

    /// All values of a tab, first row as header
    pub async fn read_sheet(&self, sheet: &str, tab: &str) -> Result<Table> {
        let id = self.resolve_id(sheet).await?;
        let token = self.tokens.token().await?;
        let response = self
            .http
            .get(self.values_url(&id, &quote_tab(tab)))
            .bearer_auth(token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .map_err(|e| CxSheetError::remote("read sheet", e))?;
        let range: ValueRange = check_response("read sheet", response)
            .await?
            .json()
            .await
            .map_err(|e| CxSheetError::remote("read sheet", e))?;

        let values = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(value_to_string).collect())
            .collect();
        let table = Table::from_values(values);
        log::info!("Read {} row(s) from {}#{}", table.len(), sheet, tab);
        Ok(table)
    }

    /// Replace the contents of a tab with the table, header first, from A1
    pub async fn write_sheet(&self, sheet: &str, tab: &str, table: &Table) -> Result<()> {
        let id = self.resolve_id(sheet).await?;
        let quoted = quote_tab(tab);

        let token = self.tokens.token().await?;
        let response = self
            .http
            .post(format!("{}:clear", self.values_url(&id, &quoted)))
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| CxSheetError::remote("clear sheet", e))?;
        check_response("clear sheet", response).await?;

        let start = format!("{}!A1", quoted);
        let response = self
            .http
            .put(self.values_url(&id, &start))
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": start,
                "majorDimension": "ROWS",
                "values": table.to_values(),
            }))
            .send()
            .await
            .map_err(|e| CxSheetError::remote("write sheet", e))?;
        check_response("write sheet", response).await?;

        log::info!("Wrote {} row(s) to {}#{}", table.len(), sheet, tab);
        Ok(())
    }

    fn values_url(&self, id: &str, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.sheets_url,
            id,
            urlencoding::encode(range)
        )
    }
}

/// A1 notation needs single quotes around tab names with spaces or symbols
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
