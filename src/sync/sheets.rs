use std::borrow::Cow;

use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{RowStore, SheetError};
use crate::core::{Contact, ContactDraft};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Row 1 holds the column headers (Name, Email, Notes).
const FIRST_DATA_ROW: u32 = 2;

/// Sheet name as it appears in A1 notation. Plain names stay bare; anything
/// else is single-quoted with embedded quotes doubled.
pub fn quote_sheet_name(sheet: &str) -> Cow<'_, str> {
    let plain = sheet.starts_with(|c: char| c.is_ascii_alphabetic())
        && sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain && !looks_like_cell(sheet) {
        Cow::Borrowed(sheet)
    } else {
        Cow::Owned(format!("'{}'", sheet.replace('\'', "''")))
    }
}

/// `A1`, `XFD10` or `R1C1` would be read as a cell, not a sheet.
fn looks_like_cell(name: &str) -> bool {
    let letters = name.chars().take_while(char::is_ascii_alphabetic).count();
    let digits = &name[letters..];
    if (1..=3).contains(&letters) && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let upper = name.to_ascii_uppercase();
    upper
        .strip_prefix('R')
        .map(|rest| rest.trim_start_matches(|c: char| c.is_ascii_digit()))
        .and_then(|rest| rest.strip_prefix('C'))
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

/// Every contact row from the first data row down.
pub fn data_range(sheet: &str) -> String {
    format!("{}!A{}:C", quote_sheet_name(sheet), FIRST_DATA_ROW)
}

/// The whole tracked table; appends land after its last used row.
pub fn column_range(sheet: &str) -> String {
    format!("{}!A:C", quote_sheet_name(sheet))
}

pub fn row_range(sheet: &str, row_index: u32) -> String {
    format!("{}!A{}:C{}", quote_sheet_name(sheet), row_index, row_index)
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets v4 values client for a single spreadsheet.
pub struct SheetsClient {
    api_base: String,
    sheet_id: String,
    sheet_name: String,
    api_key: String,
    http: Client,
}

impl SheetsClient {
    pub fn new(sheet_id: &str, api_key: &str) -> Result<Self, SheetError> {
        let http = Client::builder()
            .build()
            .map_err(|e| SheetError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            api_base: DEFAULT_API_BASE.to_string(),
            sheet_id: sheet_id.trim().to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            api_key: api_key.trim().to_string(),
            http,
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: &str) -> Self {
        if !sheet_name.trim().is_empty() {
            self.sheet_name = sheet_name.trim().to_string();
        }
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Build `{base}/v4/spreadsheets/{id}/values/{range}{suffix}` with the
    /// key (and, for writes, the value input option) as query parameters.
    pub fn values_url(&self, range: &str, suffix: &str, write: bool) -> Result<Url, SheetError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| SheetError::Transport(format!("Invalid API base `{}`: {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetError::Transport(format!("Invalid API base `{}`", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.sheet_id.as_str(), "values"])
            .push(&format!("{}{}", range, suffix));
        {
            let mut query = url.query_pairs_mut();
            if write {
                query.append_pair("valueInputOption", "USER_ENTERED");
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Value, SheetError> {
        let resp = request
            .send()
            .await
            .map_err(|e| SheetError::Transport(format!("{} request failed: {}", what, e)))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SheetError::Transport(format!("Failed to read {} response: {}", what, e)))?;

        log::debug!("Sheets {} returned {} ({} bytes)", what, status, text.len());

        match parse_body(&text) {
            Err(SheetError::Decode(_)) if !status.is_success() => Err(SheetError::Transport(
                format!("{} returned {}", what, status),
            )),
            other => other,
        }
    }
}

impl RowStore for SheetsClient {
    async fn list(&self) -> Result<Vec<Contact>, SheetError> {
        let range = data_range(&self.sheet_name);
        let url = self.values_url(&range, "", false)?;
        log::debug!("Sheets GET {}", range);

        let body = self.send(self.http.get(url), "GET").await?;
        let contacts = contacts_from_value(body)?;
        log::info!("Loaded {} contacts from {}", contacts.len(), range);
        Ok(contacts)
    }

    async fn append(&self, draft: &ContactDraft) -> Result<(), SheetError> {
        let range = column_range(&self.sheet_name);
        let url = self.values_url(&range, ":append", true)?;
        log::debug!("Sheets POST {}:append", range);

        self.send(self.http.post(url).json(&values_body(draft)), "append")
            .await?;
        log::info!("Appended contact row to {}", range);
        Ok(())
    }

    async fn update(&self, row_index: u32, draft: &ContactDraft) -> Result<(), SheetError> {
        let range = row_range(&self.sheet_name, row_index);
        let url = self.values_url(&range, "", true)?;
        log::debug!("Sheets PUT {}", range);

        self.send(self.http.put(url).json(&values_body(draft)), "update")
            .await?;
        log::info!("Updated contact row {}", row_index);
        Ok(())
    }
}

/// `{"values": [[name, email, notes]]}`
pub fn values_body(draft: &ContactDraft) -> Value {
    json!({ "values": [draft.to_row()] })
}

/// Decode a response body, turning an `error.message` into [`SheetError::Remote`].
pub fn parse_body(text: &str) -> Result<Value, SheetError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SheetError::Decode(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(SheetError::Remote(message));
    }

    Ok(value)
}

/// Map a values response onto contacts. Short rows are padded with empty
/// strings and the row number is the physical sheet row.
pub fn contacts_from_value(value: Value) -> Result<Vec<Contact>, SheetError> {
    let range: ValueRange = serde_json::from_value(value)
        .map_err(|e| SheetError::Decode(format!("Unexpected values payload: {}", e)))?;

    Ok(range
        .values
        .into_iter()
        .zip(FIRST_DATA_ROW..)
        .map(|(row, row_index)| {
            let mut cells = row.into_iter().map(cell_text);
            Contact {
                row_index,
                name: cells.next().unwrap_or_default(),
                email: cells.next().unwrap_or_default(),
                notes: cells.next().unwrap_or_default(),
            }
        })
        .collect())
}

pub fn parse_list_response(text: &str) -> Result<Vec<Contact>, SheetError> {
    contacts_from_value(parse_body(text)?)
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
