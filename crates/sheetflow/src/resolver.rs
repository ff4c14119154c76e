//! Client-backed column resolution.
//!
//! The pure strategies live in `sheetflow_core::column`; the helpers here
//! perform the remote fetches those strategies start from. Header cells
//! are always decoded as display strings regardless of the action's data
//! format: column names are textual by definition.

use sheetflow_client::SheetsClient;
use sheetflow_core::{A1Range, ColumnSet, RawGrid, SheetError, ValueFormat};

/// From-header strategy: fetch the designated row across the maximal
/// column extent and turn every cell into a column. An empty fetch result
/// is a hard error when the header is mandated, and an empty column set
/// otherwise (merge strategy callers).
pub fn fetch_header_columns<C: SheetsClient>(
    client: &mut C,
    sheet: &str,
    header_row: u32,
    required: bool,
) -> Result<ColumnSet, SheetError> {
    let range = A1Range::row_span(header_row).qualified(sheet);
    let grid = client
        .get_values(&range)
        .map_err(|e| SheetError::remote("getValues", e))?;
    let names = header_names(&grid);
    if names.is_empty() {
        if required {
            return Err(SheetError::MissingHeader { row: header_row });
        }
        return Ok(ColumnSet::new());
    }
    Ok(ColumnSet::from_header_cells(names))
}

/// Display-string names from the first row of a fetched grid.
pub fn header_names(grid: &RawGrid) -> Vec<String> {
    grid.first()
        .map(|row| {
            row.iter()
                .map(|cell| cell.decode(ValueFormat::Formatted).display_text())
                .collect()
        })
        .unwrap_or_default()
}
