//! Operation executor.
//!
//! Each action is a short linear pipeline over the [`SheetsClient`]
//! capability, in the documented call order: later calls depend on row
//! counts and header contents computed from earlier results. There is no
//! retry and no partial result: the first failed remote call aborts the
//! action, wrapped with the operation name, and the whole action is
//! wrapped again with its action context.

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use sheetflow_client::{AppendSummary, ClearSummary, SheetsClient, UpdateSummary};
use sheetflow_core::{
    A1Range, ColumnSet, Record, SheetError, ValueFormat, project_to_grid, project_to_records,
};

use crate::request::{ActionRequest, Destination, Operation};
use crate::resolver::{fetch_header_columns, header_names};

/// Result surface returned to the plugin host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    /// Read family: ordered records.
    Rows(Vec<Record>),
    /// Overwrite-style writes: the remote update confirmation.
    Updated(UpdateSummary),
    /// Append-style writes: the remote append confirmation.
    Appended(AppendSummary),
    /// Clear: the remote clear confirmation.
    Cleared(ClearSummary),
}

/// Run one validated action against a client bound to its spreadsheet.
pub fn execute<C: SheetsClient>(
    client: &mut C,
    request: &ActionRequest,
) -> Result<ActionOutcome, SheetError> {
    let action = request.operation.name();
    debug!(action, sheet = %request.sheet_title, "executing action");
    run(client, request).map_err(|e| SheetError::in_action(action, e))
}

fn run<C: SheetsClient>(
    client: &mut C,
    request: &ActionRequest,
) -> Result<ActionOutcome, SheetError> {
    let sheet = request.sheet_title.as_str();
    match &request.operation {
        Operation::Read {
            extract_header,
            format,
        } => read(client, sheet, None, *extract_header, *format).map(ActionOutcome::Rows),
        Operation::ReadRange {
            range,
            extract_header,
            format,
        } => read(client, sheet, Some(range), *extract_header, *format).map(ActionOutcome::Rows),
        Operation::Append { rows } => append_legacy(client, sheet, rows).map(ActionOutcome::Appended),
        Operation::CreateRows {
            destination,
            rows,
            include_header_row,
            header_row_number,
        } => match destination {
            Destination::Append => {
                create_rows_append(client, sheet, rows, *include_header_row, *header_row_number)
                    .map(ActionOutcome::Appended)
            }
            Destination::RowNumber(row_number) => create_rows_at(
                client,
                sheet,
                rows,
                *row_number,
                *include_header_row,
                *header_row_number,
            )
            .map(ActionOutcome::Updated),
        },
        Operation::Clear {
            preserve_header_row,
            header_row_number,
        } => clear(client, sheet, *preserve_header_row, *header_row_number)
            .map(ActionOutcome::Cleared),
    }
}

fn read<C: SheetsClient>(
    client: &mut C,
    sheet: &str,
    range: Option<&A1Range>,
    extract_header: bool,
    format: ValueFormat,
) -> Result<Vec<Record>, SheetError> {
    // The header always comes from the sheet's true row 1. A user range
    // only interacts with it when the range itself starts at row 1, in
    // which case the header consumes that top row.
    let columns = if extract_header {
        fetch_header_columns(client, sheet, 1, true)?
    } else {
        ColumnSet::new()
    };

    let effective = match range {
        None if extract_header => A1Range::from_row_to_end(2),
        None => A1Range::full_sheet(),
        Some(r) if extract_header && r.start_row() == 1 => match r.shrink_top_row() {
            Some(shrunk) => shrunk,
            // Height-1 range at row 1: the header consumed the only row,
            // no data rows remain and no fetch is needed.
            None => return Ok(Vec::new()),
        },
        Some(r) => r.clone(),
    };

    let offset = effective.start_col() as usize;
    let grid = client
        .get_values(&effective.qualified(sheet))
        .map_err(|e| SheetError::remote("getValues", e))?;
    Ok(project_to_records(&grid, &columns, offset, format))
}

fn append_legacy<C: SheetsClient>(
    client: &mut C,
    sheet: &str,
    rows: &[Record],
) -> Result<AppendSummary, SheetError> {
    let grid = client
        .get_values(&A1Range::full_sheet().qualified(sheet))
        .map_err(|e| SheetError::remote("getValues", e))?;
    let columns = ColumnSet::from_header_cells(header_names(&grid));
    let row_count = grid.len() as u32;

    let payload = project_to_grid(rows, &columns)?;
    client
        .append_values(&A1Range::anchor_row(row_count + 1).qualified(sheet), &payload)
        .map_err(|e| SheetError::remote("appendValues", e))
}

fn create_rows_append<C: SheetsClient>(
    client: &mut C,
    sheet: &str,
    rows: &[Record],
    include_header_row: bool,
    header_row_number: u32,
) -> Result<AppendSummary, SheetError> {
    let grid = client
        .get_values(&A1Range::full_sheet().qualified(sheet))
        .map_err(|e| SheetError::remote("getValues", e))?;
    let row_count = (grid.len() as u32).max(header_row_number);

    let columns = if include_header_row {
        let mut columns = fetch_header_columns(client, sheet, header_row_number, false)?;
        columns.merge_record_keys(rows);
        write_header(client, sheet, &columns, header_row_number)?;
        columns
    } else {
        ColumnSet::from_records(rows)
    };

    let payload = project_to_grid(rows, &columns)?;
    client
        .append_values(&A1Range::anchor_row(row_count + 1).qualified(sheet), &payload)
        .map_err(|e| SheetError::remote("appendValues", e))
}

fn create_rows_at<C: SheetsClient>(
    client: &mut C,
    sheet: &str,
    rows: &[Record],
    row_number: u32,
    include_header_row: bool,
    header_row_number: u32,
) -> Result<UpdateSummary, SheetError> {
    let columns = ColumnSet::from_records(rows);
    if include_header_row {
        write_header(client, sheet, &columns, header_row_number)?;
    }

    let payload = project_to_grid(rows, &columns)?;
    let height = payload.len().max(1) as u32;
    client
        .clear_values(&A1Range::row_block(row_number, height).qualified(sheet))
        .map_err(|e| SheetError::remote("clearValues", e))?;
    client
        .update_values(&A1Range::anchor_row(row_number).qualified(sheet), &payload)
        .map_err(|e| SheetError::remote("updateValues", e))
}

fn clear<C: SheetsClient>(
    client: &mut C,
    sheet: &str,
    preserve_header_row: bool,
    header_row_number: u32,
) -> Result<ClearSummary, SheetError> {
    let range = if preserve_header_row {
        A1Range::from_row_to_end(header_row_number + 1)
    } else {
        A1Range::full_sheet()
    };
    client
        .clear_values(&range.qualified(sheet))
        .map_err(|e| SheetError::remote("clearValues", e))
}

/// Rewrite the header row: clear the old header cells across the full row
/// span first, then write the column names.
fn write_header<C: SheetsClient>(
    client: &mut C,
    sheet: &str,
    columns: &ColumnSet,
    header_row: u32,
) -> Result<(), SheetError> {
    client
        .clear_values(&A1Range::row_span(header_row).qualified(sheet))
        .map_err(|e| SheetError::remote("clearValues", e))?;
    if columns.is_empty() {
        return Ok(());
    }
    let names: Vec<JsonValue> = columns
        .names()
        .map(|name| JsonValue::String(name.to_string()))
        .collect();
    let width = names.len() as u32;
    client
        .update_values(
            &A1Range::row_prefix(header_row, width).qualified(sheet),
            &[names],
        )
        .map_err(|e| SheetError::remote("updateValues", e))?;
    Ok(())
}
