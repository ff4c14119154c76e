//! Grid <-> record projection.
//!
//! The read direction turns a ragged raw grid into ordered records keyed by
//! column name; the write direction turns records back into rows positioned
//! by each column's `source_index`. Neither direction pads with sentinel
//! "empty" values: absent cells stay absent so sparse rows survive a
//! round-trip intact.

use serde_json::Value as JsonValue;

use crate::column::ColumnSet;
use crate::error::SheetError;
use crate::value::{RawCell, ValueFormat};

/// One logical row: column name -> scalar value, in column order.
pub type Record = serde_json::Map<String, JsonValue>;

/// Read path. `offset` shifts the column list to align with a sub-range
/// that does not start at column A: cell `i` maps to column `i + offset`.
/// Cells beyond the named columns get the pinned `column{N}` placeholder
/// (N = zero-based absolute index); absent cells are omitted entirely.
pub fn project_to_records(
    grid: &[Vec<RawCell>],
    columns: &ColumnSet,
    offset: usize,
    format: ValueFormat,
) -> Vec<Record> {
    grid.iter()
        .map(|row| {
            let mut record = Record::new();
            for (i, cell) in row.iter().enumerate() {
                let Some(value) = cell.decode(format).into_json() else {
                    continue;
                };
                let absolute = i + offset;
                let key = match columns.get(absolute) {
                    Some(column) => column.name.clone(),
                    None => format!("column{absolute}"),
                };
                record.insert(key, value);
            }
            record
        })
        .collect()
}

/// Write path. With a non-empty column set every field must match a column
/// (case-insensitively) and lands at its `source_index`; the row is only as
/// wide as its highest referenced column, with JSON nulls in the gaps. A
/// field that matches nothing fails the whole projection with an error
/// listing every known column.
///
/// With an empty column set, values are pushed in encountered key order
/// with no validation (preserved source behavior; rows with differing key
/// sets are the caller's responsibility).
pub fn project_to_grid(
    records: &[Record],
    columns: &ColumnSet,
) -> Result<Vec<Vec<JsonValue>>, SheetError> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        if columns.is_empty() {
            rows.push(record.values().cloned().collect());
            continue;
        }
        let mut row: Vec<JsonValue> = Vec::new();
        for (key, value) in record {
            let index = columns
                .position_of(key)
                .ok_or_else(|| SheetError::UnmatchedField {
                    field: key.clone(),
                    known: columns.names_joined(),
                })?;
            if row.len() <= index {
                row.resize(index + 1, JsonValue::Null);
            }
            row[index] = value.clone();
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ScalarValue;
    use serde_json::json;

    fn record(fields: &[(&str, JsonValue)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn grid_of(rows: &[&[JsonValue]]) -> Vec<Vec<RawCell>> {
        rows.iter()
            .map(|row| row.iter().map(RawCell::from_scalar).collect())
            .collect()
    }

    #[test]
    fn placeholder_keys_for_unnamed_columns() {
        let grid = grid_of(&[
            &[json!("Name"), json!("stocks"), json!("stocks")],
            &[json!("Row1"), json!("57"), json!("763")],
        ]);
        let records =
            project_to_records(&grid, &ColumnSet::new(), 0, ValueFormat::Formatted);
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([
                { "column0": "Name", "column1": "stocks", "column2": "stocks" },
                { "column0": "Row1", "column1": "57", "column2": "763" }
            ])
        );
    }

    #[test]
    fn offset_shifts_the_column_list() {
        let columns =
            ColumnSet::from_header_cells(["Id", "Name", "Qty"].map(String::from));
        let grid = grid_of(&[&[json!("Widget"), json!(4)]]);
        let records = project_to_records(&grid, &columns, 1, ValueFormat::Effective);
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{ "Name": "Widget", "Qty": 4.0 }])
        );
    }

    #[test]
    fn absent_cells_are_omitted_not_nulled() {
        let columns = ColumnSet::from_header_cells(["a", "b", "c"].map(String::from));
        let grid = grid_of(&[&[json!("x"), JsonValue::Null, json!("z")], &[json!("only")]]);
        let records = project_to_records(&grid, &columns, 0, ValueFormat::Effective);
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{ "a": "x", "c": "z" }, { "a": "only" }])
        );
        assert!(!records[1].contains_key("b"));
    }

    #[test]
    fn grid_rows_are_as_wide_as_their_highest_column() {
        let columns =
            ColumnSet::from_header_cells(["Subname", "ACI", "NewCol"].map(String::from));
        let records = [record(&[("Subname", json!("X")), ("NewCol", json!("Y"))])];
        let rows = project_to_grid(&records, &columns).unwrap();
        assert_eq!(rows, vec![vec![json!("X"), JsonValue::Null, json!("Y")]]);
    }

    #[test]
    fn unmatched_field_lists_every_known_column() {
        let columns = ColumnSet::from_header_cells(["Subname", "ACI"].map(String::from));
        let records = [record(&[("Missing", json!(1))])];
        let err = project_to_grid(&records, &columns).unwrap_err();
        match err {
            SheetError::UnmatchedField { field, known } => {
                assert_eq!(field, "Missing");
                assert_eq!(known, "Subname, ACI");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn case_insensitive_match_uses_stored_casing_on_read() {
        let columns = ColumnSet::from_header_cells(["Name"].map(String::from));
        let records = [record(&[("name", json!("x"))])];
        let rows = project_to_grid(&records, &columns).unwrap();
        assert_eq!(rows, vec![vec![json!("x")]]);

        let grid = grid_of(&[&[json!("x")]]);
        let back = project_to_records(&grid, &columns, 0, ValueFormat::Effective);
        assert!(back[0].contains_key("Name"));
    }

    #[test]
    fn column_less_write_mode_keeps_encountered_order() {
        let records = [record(&[("b", json!(2)), ("a", json!(1))])];
        let rows = project_to_grid(&records, &ColumnSet::new()).unwrap();
        assert_eq!(rows, vec![vec![json!(2), json!(1)]]);
    }

    #[test]
    fn round_trip_through_from_data_columns() {
        let records = [
            record(&[("Name", json!("Widget")), ("Qty", json!(4))]),
            record(&[("Qty", json!(9)), ("Extra", json!(true))]),
        ];
        let columns = ColumnSet::from_records(records.iter());
        let rows = project_to_grid(&records, &columns).unwrap();

        let grid: Vec<Vec<RawCell>> = rows
            .iter()
            .map(|row| row.iter().map(RawCell::from_scalar).collect())
            .collect();
        let back = project_to_records(&grid, &columns, 0, ValueFormat::Effective);

        assert_eq!(back[0].get("Name"), Some(&json!("Widget")));
        assert_eq!(back[0].get("Qty"), Some(&json!(4.0)));
        assert!(!back[0].contains_key("Extra"));
        assert_eq!(back[1].get("Qty"), Some(&json!(9.0)));
        assert_eq!(back[1].get("Extra"), Some(&json!(true)));
        assert!(!back[1].contains_key("Name"));
    }

    #[test]
    fn formatted_decode_yields_display_strings() {
        let cell = RawCell::from_scalar(&json!(763));
        assert_eq!(
            cell.decode(ValueFormat::Formatted),
            ScalarValue::Text("763".into())
        );
    }
}
