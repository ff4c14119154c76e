//! Spreadsheet integration adapter.
//!
//! Invoked by a plugin host with a datasource configuration (credentials)
//! and an action configuration (which operation, with what parameters).
//! The configuration is validated into a closed [`request::Operation`]
//! enum before any remote call, then [`execute::execute`] runs the action
//! as one sequential chain of calls against a [`SheetsClient`].

pub mod adapter;
pub mod execute;
pub mod request;
pub mod resolver;

pub use adapter::{metadata, pre_delete, run_action, test_connection};
pub use execute::{ActionOutcome, execute};
pub use request::{
    ActionConfig, ActionKind, ActionRequest, DatasourceConfig, Destination, Operation,
    WriteDestination,
};

// Re-exports for downstream callers.
pub use sheetflow_client::{MemoryClient, RestClient, SheetsClient, SpreadsheetInfo};
pub use sheetflow_core::{A1Range, ColumnSet, Record, SheetError, ValueFormat};
