//! Uniform error kind for the adapter.
//!
//! Every layer funnels into [`SheetError`]; the executor wraps whatever it
//! catches into the outer [`SheetError::Action`] variant so messages nest
//! ("read action failed" -> specific cause). Remote failures carry the
//! operation name and the literal status text received.

use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    /// Range expression failed syntactic or round-trip validation.
    #[error("invalid range `{range}`: {reason}")]
    InvalidRange { range: String, reason: String },

    /// A field the action requires was absent from the configuration.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// A row-number field was zero or negative.
    #[error("field `{field}` must be a positive row number, got {value}")]
    InvalidRowNumber { field: &'static str, value: i64 },

    /// Destination row does not sit below the header row.
    #[error("row number {row_number} must be greater than the header row number {header_row_number}")]
    RowOrdering { row_number: u32, header_row_number: u32 },

    /// Write payload could not be decoded into an array of flat objects.
    #[error("invalid write payload: {message}")]
    Payload { message: String },

    /// A mandatory header row came back empty from the remote service.
    #[error("row {row} doesn't have a header")]
    MissingHeader { row: u32 },

    /// A record field matched none of the resolved columns. `known` lists
    /// every column name so callers can see the full header at a glance.
    #[error("field `{field}` does not match any column; known columns: [{known}]")]
    UnmatchedField { field: String, known: String },

    /// A remote call returned a non-success status or transport failure.
    #[error("remote {operation} call failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// Outer context added by the executor around any inner failure.
    #[error("{action} action failed")]
    Action {
        action: &'static str,
        #[source]
        source: Box<SheetError>,
    },
}

impl SheetError {
    /// Wrap a client-side failure with the remote operation name.
    pub fn remote<E: Display>(operation: &'static str, err: E) -> Self {
        SheetError::Remote {
            operation,
            message: err.to_string(),
        }
    }

    /// Wrap any inner failure with the action it occurred in.
    pub fn in_action(action: &'static str, err: SheetError) -> Self {
        SheetError::Action {
            action,
            source: Box::new(err),
        }
    }

    pub fn payload<E: Display>(err: E) -> Self {
        SheetError::Payload {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn action_context_nests() {
        let inner = SheetError::MissingHeader { row: 1 };
        let outer = SheetError::in_action("read", inner);
        assert_eq!(outer.to_string(), "read action failed");
        let source = outer.source().expect("outer error carries its cause");
        assert_eq!(source.to_string(), "row 1 doesn't have a header");
    }

    #[test]
    fn remote_errors_name_the_operation() {
        let err = SheetError::remote("getValues", "unexpected status 403 Forbidden");
        assert_eq!(
            err.to_string(),
            "remote getValues call failed: unexpected status 403 Forbidden"
        );
    }
}
