//! In-memory backend.
//!
//! Sheets are stored as rows of plain JSON scalars; reads synthesize the
//! three remote value representations per cell. The client records every
//! call it receives so tests can assert on the exact remote traffic an
//! action produced.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use thiserror::Error;

use sheetflow_core::{A1Range, RawCell, RawGrid, SheetError, column_label};

use crate::traits::{AppendSummary, ClearSummary, SheetsClient, UpdateSummary};

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("range `{0}` is not qualified as `<sheet>!<A1-range>`")]
    Unqualified(String),

    #[error(transparent)]
    Range(#[from] SheetError),
}

/// In-memory spreadsheet document.
#[derive(Debug, Default)]
pub struct MemoryClient {
    sheets: BTreeMap<String, Vec<Vec<JsonValue>>>,
    calls: Vec<String>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet with rows of JSON scalars.
    pub fn with_sheet(
        mut self,
        title: impl Into<String>,
        rows: Vec<Vec<JsonValue>>,
    ) -> Self {
        self.sheets.insert(title.into(), rows);
        self
    }

    /// Current contents of a sheet; empty if the sheet never existed.
    pub fn rows(&self, title: &str) -> &[Vec<JsonValue>] {
        self.sheets.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every call received so far, as `<operation> <qualified range>`.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn split(range: &str) -> Result<(&str, A1Range), MemoryError> {
        let (sheet, a1) = range
            .split_once('!')
            .ok_or_else(|| MemoryError::Unqualified(range.to_string()))?;
        Ok((sheet, A1Range::parse(a1)?))
    }

    fn write_at(
        &mut self,
        sheet: &str,
        start_row: usize,
        start_col: usize,
        rows: &[Vec<JsonValue>],
    ) -> UpdateSummary {
        let entry = self.sheets.entry(sheet.to_string()).or_default();
        let mut updated_cells = 0u32;
        let mut max_width = 0usize;
        for (i, values) in rows.iter().enumerate() {
            let r = start_row - 1 + i;
            if entry.len() <= r {
                entry.resize(r + 1, Vec::new());
            }
            let target = &mut entry[r];
            for (j, value) in values.iter().enumerate() {
                let c = start_col + j;
                if target.len() <= c {
                    target.resize(c + 1, JsonValue::Null);
                }
                target[c] = value.clone();
                if !value.is_null() {
                    updated_cells += 1;
                }
            }
            max_width = max_width.max(values.len());
        }

        let updated_range = if rows.is_empty() {
            format!("{sheet}!{}{start_row}", column_label(start_col as u32))
        } else {
            format!(
                "{sheet}!{}{}:{}{}",
                column_label(start_col as u32),
                start_row,
                column_label((start_col + max_width.max(1) - 1) as u32),
                start_row + rows.len() - 1,
            )
        };
        UpdateSummary {
            spreadsheet_id: String::new(),
            updated_range,
            updated_rows: rows.len() as u32,
            updated_columns: max_width as u32,
            updated_cells,
        }
    }
}

impl SheetsClient for MemoryClient {
    type Error = MemoryError;

    fn get_values(&mut self, range: &str) -> Result<RawGrid, Self::Error> {
        self.calls.push(format!("getValues {range}"));
        let (sheet, a1) = Self::split(range)?;
        let rows = self.sheets.get(sheet).map(Vec::as_slice).unwrap_or(&[]);

        let sr = a1.start_row() as usize - 1;
        let er = (a1.end_row() as usize).min(rows.len());
        let sc = a1.start_col() as usize;
        let ec = a1.end_col() as usize;

        let mut grid: RawGrid = Vec::new();
        for row in rows.iter().take(er).skip(sr) {
            let cells = row
                .iter()
                .enumerate()
                .filter(|(c, _)| *c >= sc && *c <= ec)
                .map(|(_, value)| RawCell::from_scalar(value))
                .collect();
            grid.push(cells);
        }
        // The remote service omits trailing empty rows from grid data.
        while grid
            .last()
            .is_some_and(|row: &Vec<RawCell>| row.iter().all(|c| *c == RawCell::default()))
        {
            grid.pop();
        }
        Ok(grid)
    }

    fn update_values(
        &mut self,
        range: &str,
        rows: &[Vec<JsonValue>],
    ) -> Result<UpdateSummary, Self::Error> {
        self.calls.push(format!("updateValues {range}"));
        let (sheet, a1) = Self::split(range)?;
        Ok(self.write_at(sheet, a1.start_row() as usize, a1.start_col() as usize, rows))
    }

    fn append_values(
        &mut self,
        range: &str,
        rows: &[Vec<JsonValue>],
    ) -> Result<AppendSummary, Self::Error> {
        self.calls.push(format!("appendValues {range}"));
        let (sheet, a1) = Self::split(range)?;
        // Appends land after any existing data, even when the anchor row
        // sits inside it.
        let existing = self.sheets.get(sheet).map(Vec::len).unwrap_or(0);
        let start_row = (a1.start_row() as usize).max(existing + 1);
        let updates = self.write_at(sheet, start_row, a1.start_col() as usize, rows);
        Ok(AppendSummary {
            table_range: Some(updates.updated_range.clone()),
            updates,
        })
    }

    fn clear_values(&mut self, range: &str) -> Result<ClearSummary, Self::Error> {
        self.calls.push(format!("clearValues {range}"));
        let (sheet, a1) = Self::split(range)?;
        if let Some(entry) = self.sheets.get_mut(sheet) {
            let sr = a1.start_row() as usize - 1;
            let er = (a1.end_row() as usize).min(entry.len());
            let sc = a1.start_col() as usize;
            let ec = a1.end_col() as usize;
            for row in entry.iter_mut().take(er).skip(sr) {
                for c in sc..row.len().min(ec + 1) {
                    row[c] = JsonValue::Null;
                }
                while row.last().is_some_and(JsonValue::is_null) {
                    row.pop();
                }
            }
            while entry.last().is_some_and(Vec::is_empty) {
                entry.pop();
            }
        }
        Ok(ClearSummary {
            spreadsheet_id: String::new(),
            cleared_range: range.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheetflow_core::{ScalarValue, ValueFormat};

    fn seeded() -> MemoryClient {
        MemoryClient::new().with_sheet(
            "Sheet1",
            vec![
                vec![json!("Subname"), json!("ACI")],
                vec![json!("Butterfly"), json!("57")],
            ],
        )
    }

    #[test]
    fn reads_clip_to_stored_data() {
        let mut client = seeded();
        let grid = client.get_values("Sheet1!A1:ZZZ10000000").unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(
            grid[1][0].decode(ValueFormat::Effective),
            ScalarValue::Text("Butterfly".into())
        );

        let grid = client.get_values("Sheet1!B2:ZZZ10000000").unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(
            grid[0][0].decode(ValueFormat::Formatted),
            ScalarValue::Text("57".into())
        );

        assert!(client.get_values("Missing!A1:ZZZ10000000").unwrap().is_empty());
    }

    #[test]
    fn updates_overwrite_and_report_the_written_range() {
        let mut client = seeded();
        let summary = client
            .update_values("Sheet1!A2", &[vec![json!("Moth"), json!("58")]])
            .unwrap();
        assert_eq!(summary.updated_range, "Sheet1!A2:B2");
        assert_eq!(summary.updated_rows, 1);
        assert_eq!(summary.updated_cells, 2);
        assert_eq!(client.rows("Sheet1")[1], vec![json!("Moth"), json!("58")]);
    }

    #[test]
    fn appends_land_after_existing_data() {
        let mut client = seeded();
        let summary = client
            .append_values("Sheet1!A3", &[vec![json!("Wasp"), JsonValue::Null, json!("9")]])
            .unwrap();
        assert_eq!(summary.updates.updated_range, "Sheet1!A3:C3");
        // Nulls are written as gaps, not values.
        assert_eq!(summary.updates.updated_cells, 2);
        assert_eq!(client.rows("Sheet1").len(), 3);
    }

    #[test]
    fn clear_trims_trailing_nulls_and_rows() {
        let mut client = seeded();
        client.clear_values("Sheet1!A2:ZZZ10000000").unwrap();
        assert_eq!(client.rows("Sheet1").len(), 1);

        client.clear_values("Sheet1!A1:ZZZ10000000").unwrap();
        assert!(client.rows("Sheet1").is_empty());
    }

    #[test]
    fn unqualified_ranges_are_rejected() {
        let mut client = MemoryClient::new();
        match client.get_values("A1:B2") {
            Err(MemoryError::Unqualified(r)) => assert_eq!(r, "A1:B2"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
