//! Wire contract with the extraction service.
//!
//! The request carries exactly one payload field plus the caller's auth
//! state. Responses arrive in one of three shapes, all normalized here into
//! [`ExtractedTable`]:
//!
//! - `{"headers": [...], "rows": [[...]]}`
//! - `{"tabularData": [{..}, {..}]}` (array of row objects)
//! - `{"tabularData": "<json string>"}` (stringified array of row objects)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractError;
use crate::payload::ExtractionPayload;
use crate::table::ExtractedTable;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_data_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    pub is_logged_in: bool,
}

impl ExtractionRequest {
    pub fn new(payload: &ExtractionPayload, is_logged_in: bool) -> Self {
        match payload {
            ExtractionPayload::DataUri(uri) => Self {
                pdf_data_uri: Some(uri.clone()),
                text_content: None,
                is_logged_in,
            },
            ExtractionPayload::PlainText(text) => Self {
                pdf_data_uri: None,
                text_content: Some(text.clone()),
                is_logged_in,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    #[serde(default)]
    pub headers: Option<Vec<String>>,

    #[serde(default)]
    pub rows: Option<Vec<Vec<String>>>,

    #[serde(default)]
    pub tabular_data: Option<Value>,
}

impl ExtractionResponse {
    /// Normalize whichever shape the service answered with. `headers` wins
    /// when present; otherwise `tabularData` is unwrapped, parsing it first
    /// when it arrives as a JSON string.
    pub fn into_table(self) -> Result<ExtractedTable, ExtractError> {
        if let Some(headers) = self.headers {
            return Ok(ExtractedTable::from_headers_rows(
                headers,
                self.rows.unwrap_or_default(),
            ));
        }

        match self.tabular_data {
            Some(Value::String(raw)) => {
                let trimmed = raw.trim();
                // The model signals "nothing found" with a literal empty
                // collection.
                if trimmed == "[]" || trimmed == "{}" {
                    return Err(ExtractError::EmptyResult);
                }
                let value: Value =
                    serde_json::from_str(trimmed).map_err(|e| ExtractError::InvalidShape {
                        reason: format!("tabularData is not valid JSON: {e}"),
                    })?;
                table_from_value(value)
            }
            Some(value) => table_from_value(value),
            None => Err(ExtractError::InvalidShape {
                reason: "response carries neither headers/rows nor tabularData".to_string(),
            }),
        }
    }
}

fn table_from_value(value: Value) -> Result<ExtractedTable, ExtractError> {
    match value {
        Value::Array(records) => {
            if records.is_empty() {
                return Err(ExtractError::EmptyResult);
            }
            ExtractedTable::from_records(&records)
                .map_err(|reason| ExtractError::InvalidShape { reason })
        }
        Value::Object(map) if map.is_empty() => Err(ExtractError::EmptyResult),
        _ => Err(ExtractError::InvalidShape {
            reason: "tabularData is not an array of row objects".to_string(),
        }),
    }
}
