//! Google Sheets API v4 client, scoped to reading range values.

use crate::adapters::auth::TokenProvider;
use crate::domain::model::SheetTable;
use crate::domain::ports::TableFetcher;
use crate::utils::error::{InvoiceError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Raw shape of a `values.get` response. Cells can arrive as strings,
/// numbers or booleans depending on the sheet's formatting.
#[derive(Debug, Deserialize)]
struct SheetValues {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Coerce one cell to a string. Integral numbers lose their float artifacts
/// (`5.0` becomes `"5"`) so package numbers always join against their string
/// form regardless of how the sheet typed the column.
pub fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (f as i64).to_string()
                } else {
                    f.to_string()
                }
            } else {
                n.to_string()
            }
        }
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Percent-encode a path segment (range names contain `!` and `:`).
pub(crate) fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(b"0123456789ABCDEF"[(b >> 4) as usize]));
                out.push(char::from(b"0123456789ABCDEF"[(b & 0x0F) as usize]));
            }
        }
    }
    out
}

/// Client for the Sheets v4 REST API.
pub struct GoogleSheetsClient<A: TokenProvider> {
    base_url: String,
    client: Client,
    auth: A,
}

impl<A: TokenProvider> GoogleSheetsClient<A> {
    pub fn new(auth: A) -> Self {
        Self::with_base_url(auth, DEFAULT_BASE_URL)
    }

    /// Point the client at a custom base URL (useful for testing).
    pub fn with_base_url(auth: A, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl<A: TokenProvider> TableFetcher for GoogleSheetsClient<A> {
    async fn fetch_table(&self, spreadsheet_id: &str, range: &str) -> Result<SheetTable> {
        let token = self.auth.access_token().await?;
        let url = format!(
            "{}/{}/values/{}",
            self.base_url,
            spreadsheet_id,
            encode_segment(range)
        );
        debug!(url = %url, "reading Sheets values");

        let response = self.client.get(&url).bearer_auth(&token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InvoiceError::RemoteApiError {
                service: "sheets".to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: SheetValues = response.json().await?;
        let values = parsed
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(SheetTable::from_values(values))
    }
}
