//! Action and datasource configuration surface.
//!
//! The plugin host hands over camelCase JSON; [`ActionConfig::validate`]
//! checks every required field and produces the closed [`Operation`] enum
//! the executor dispatches on. All validation happens before any remote
//! call is issued.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use sheetflow_core::{A1Range, Record, SheetError, ValueFormat};

/// Datasource-level credential configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceConfig {
    #[serde(default)]
    pub access_token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Read,
    ReadRange,
    Append,
    CreateRows,
    Clear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDestination {
    Append,
    RowNumber,
}

/// Raw action configuration as supplied by the host, prior to validation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionConfig {
    pub action: Option<ActionKind>,
    pub spreadsheet_id: Option<String>,
    pub sheet_title: Option<String>,
    pub range: Option<String>,
    pub extract_first_row_header: bool,
    pub format: ValueFormat,
    /// JSON-encoded array of flat objects.
    pub data: Option<String>,
    pub write_to_destination_type: Option<WriteDestination>,
    pub row_number: Option<i64>,
    pub include_header_row: bool,
    pub preserve_header_row: bool,
    pub header_row_number: Option<i64>,
}

/// Validated action request.
#[derive(Clone, Debug)]
pub struct ActionRequest {
    pub spreadsheet_id: String,
    pub sheet_title: String,
    pub operation: Operation,
}

/// Closed set of operations; adding a variant makes every dispatch site a
/// compile error until handled.
#[derive(Clone, Debug)]
pub enum Operation {
    Read {
        extract_header: bool,
        format: ValueFormat,
    },
    ReadRange {
        range: A1Range,
        extract_header: bool,
        format: ValueFormat,
    },
    /// Legacy append: no header handling.
    Append { rows: Vec<Record> },
    CreateRows {
        destination: Destination,
        rows: Vec<Record>,
        include_header_row: bool,
        header_row_number: u32,
    },
    Clear {
        preserve_header_row: bool,
        header_row_number: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Append,
    RowNumber(u32),
}

impl Operation {
    /// Action name used as the outer error context.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Read { .. } => "read",
            Operation::ReadRange { .. } => "readRange",
            Operation::Append { .. } => "append",
            Operation::CreateRows { .. } => "createRows",
            Operation::Clear { .. } => "clear",
        }
    }
}

impl ActionConfig {
    pub fn validate(&self) -> Result<ActionRequest, SheetError> {
        let action = self.action.ok_or(SheetError::MissingField { field: "action" })?;
        let spreadsheet_id = required(&self.spreadsheet_id, "spreadsheetId")?;
        let sheet_title = required(&self.sheet_title, "sheetTitle")?;

        let operation = match action {
            ActionKind::Read => Operation::Read {
                extract_header: self.extract_first_row_header,
                format: self.format,
            },
            ActionKind::ReadRange => {
                let expr = required(&self.range, "range")?;
                Operation::ReadRange {
                    range: A1Range::parse_strict(&expr)?,
                    extract_header: self.extract_first_row_header,
                    format: self.format,
                }
            }
            ActionKind::Append => Operation::Append {
                rows: self.parse_payload()?,
            },
            ActionKind::CreateRows => {
                let destination_type =
                    self.write_to_destination_type
                        .ok_or(SheetError::MissingField {
                            field: "writeToDestinationType",
                        })?;
                let header_row_number = positive_row(self.header_row_number, "headerRowNumber", 1)?;
                let destination = match destination_type {
                    WriteDestination::Append => Destination::Append,
                    WriteDestination::RowNumber => {
                        let value = self
                            .row_number
                            .ok_or(SheetError::MissingField { field: "rowNumber" })?;
                        let row_number = positive_row(Some(value), "rowNumber", 1)?;
                        if header_row_number >= row_number {
                            return Err(SheetError::RowOrdering {
                                row_number,
                                header_row_number,
                            });
                        }
                        Destination::RowNumber(row_number)
                    }
                };
                Operation::CreateRows {
                    destination,
                    rows: self.parse_payload()?,
                    include_header_row: self.include_header_row,
                    header_row_number,
                }
            }
            ActionKind::Clear => Operation::Clear {
                preserve_header_row: self.preserve_header_row,
                header_row_number: positive_row(self.header_row_number, "headerRowNumber", 1)?,
            },
        };

        Ok(ActionRequest {
            spreadsheet_id,
            sheet_title,
            operation,
        })
    }

    /// Decode `data` into records: an array of objects whose values are all
    /// scalars.
    fn parse_payload(&self) -> Result<Vec<Record>, SheetError> {
        let data = required(&self.data, "data")?;
        let value: JsonValue = serde_json::from_str(&data).map_err(SheetError::payload)?;
        let JsonValue::Array(items) = value else {
            return Err(SheetError::Payload {
                message: "payload must be a JSON array of objects".to_string(),
            });
        };
        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let JsonValue::Object(record) = item else {
                return Err(SheetError::Payload {
                    message: format!("row {index} is not an object"),
                });
            };
            if let Some((field, _)) = record
                .iter()
                .find(|(_, v)| v.is_array() || v.is_object())
            {
                return Err(SheetError::Payload {
                    message: format!("row {index} field `{field}` must be a scalar value"),
                });
            }
            rows.push(record);
        }
        Ok(rows)
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, SheetError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(SheetError::MissingField { field }),
    }
}

fn positive_row(value: Option<i64>, field: &'static str, default: u32) -> Result<u32, SheetError> {
    match value {
        None => Ok(default),
        Some(v) if (1..=i64::from(u32::MAX)).contains(&v) => Ok(v as u32),
        Some(v) => Err(SheetError::InvalidRowNumber { field, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_config(action: ActionKind) -> ActionConfig {
        ActionConfig {
            action: Some(action),
            spreadsheet_id: Some("sid".into()),
            sheet_title: Some("Sheet1".into()),
            ..ActionConfig::default()
        }
    }

    #[test]
    fn deserializes_the_camel_case_wire_form() {
        let config: ActionConfig = serde_json::from_value(json!({
            "action": "CREATE_ROWS",
            "spreadsheetId": "abc",
            "sheetTitle": "Data",
            "format": "EFFECTIVE_VALUE",
            "writeToDestinationType": "ROW_NUMBER",
            "rowNumber": 5,
            "includeHeaderRow": true,
            "headerRowNumber": 2,
            "data": "[{\"a\":1}]"
        }))
        .unwrap();
        assert_eq!(config.action, Some(ActionKind::CreateRows));
        assert_eq!(config.format, ValueFormat::Effective);

        let request = config.validate().unwrap();
        assert_eq!(request.spreadsheet_id, "abc");
        match request.operation {
            Operation::CreateRows {
                destination: Destination::RowNumber(5),
                ref rows,
                include_header_row: true,
                header_row_number: 2,
            } => assert_eq!(rows.len(), 1),
            ref other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn missing_required_fields_are_reported_by_wire_name() {
        let config = ActionConfig {
            action: Some(ActionKind::Read),
            ..ActionConfig::default()
        };
        match config.validate() {
            Err(SheetError::MissingField { field }) => assert_eq!(field, "spreadsheetId"),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut config = base_config(ActionKind::ReadRange);
        config.range = None;
        match config.validate() {
            Err(SheetError::MissingField { field }) => assert_eq!(field, "range"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn read_range_requires_a_canonical_range() {
        let mut config = base_config(ActionKind::ReadRange);
        config.range = Some("A01:B2".into());
        assert!(matches!(
            config.validate(),
            Err(SheetError::InvalidRange { .. })
        ));

        config.range = Some("A1:B2".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn row_ordering_violation_fails_validation() {
        let mut config = base_config(ActionKind::CreateRows);
        config.write_to_destination_type = Some(WriteDestination::RowNumber);
        config.row_number = Some(2);
        config.header_row_number = Some(2);
        config.data = Some("[]".into());
        match config.validate() {
            Err(SheetError::RowOrdering {
                row_number,
                header_row_number,
            }) => {
                assert_eq!(row_number, 2);
                assert_eq!(header_row_number, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_positive_row_numbers_fail_validation() {
        let mut config = base_config(ActionKind::CreateRows);
        config.write_to_destination_type = Some(WriteDestination::RowNumber);
        config.row_number = Some(0);
        config.data = Some("[]".into());
        assert!(matches!(
            config.validate(),
            Err(SheetError::InvalidRowNumber {
                field: "rowNumber",
                value: 0
            })
        ));
    }

    #[test]
    fn payload_must_be_an_array_of_flat_objects() {
        let mut config = base_config(ActionKind::Append);
        config.data = Some("{\"a\":1}".into());
        assert!(matches!(config.validate(), Err(SheetError::Payload { .. })));

        config.data = Some("[[1,2]]".into());
        assert!(matches!(config.validate(), Err(SheetError::Payload { .. })));

        config.data = Some("[{\"a\":{\"nested\":true}}]".into());
        assert!(matches!(config.validate(), Err(SheetError::Payload { .. })));

        config.data = Some("not json".into());
        assert!(matches!(config.validate(), Err(SheetError::Payload { .. })));

        config.data = Some("[{\"a\":1,\"b\":\"x\",\"c\":true,\"d\":null}]".into());
        assert!(config.validate().is_ok());
    }
}
