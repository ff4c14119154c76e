//! The Spreadsheet Client capability consumed by the executor.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use sheetflow_core::RawGrid;

/// Confirmation payload for a values update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

/// Confirmation payload for an append, including the range the remote
/// service assigned to the new rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: UpdateSummary,
}

/// Confirmation payload for a clear.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearSummary {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub cleared_range: String,
}

/// One entry of the spreadsheet document catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetInfo {
    pub id: String,
    pub name: String,
}

/// Remote spreadsheet operations the core depends on.
///
/// Every `range` argument is fully qualified as `<sheetTitle>!<A1-range>`.
/// Implementations surface any non-success status as their error type; the
/// executor never retries, so a single failed call aborts the action.
pub trait SheetsClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the raw grid covering `range`. Rows may be ragged and
    /// trailing cells absent; every cell carries whichever of the three
    /// value representations the service has for it.
    fn get_values(&mut self, range: &str) -> Result<RawGrid, Self::Error>;

    /// Overwrite cells starting at the range anchor.
    fn update_values(
        &mut self,
        range: &str,
        rows: &[Vec<JsonValue>],
    ) -> Result<UpdateSummary, Self::Error>;

    /// Append rows after the data found in `range`.
    fn append_values(
        &mut self,
        range: &str,
        rows: &[Vec<JsonValue>],
    ) -> Result<AppendSummary, Self::Error>;

    /// Clear every cell in `range`.
    fn clear_values(&mut self, range: &str) -> Result<ClearSummary, Self::Error>;
}
