//! Spreadsheet service client capability.
//!
//! The executor in `sheetflow` is generic over [`SheetsClient`]; this crate
//! supplies the trait plus two backends: [`RestClient`] against the remote
//! service's HTTP API and [`MemoryClient`], an in-memory store used by
//! tests and local runs.

pub mod memory;
pub mod rest;
pub mod traits;

pub use memory::{MemoryClient, MemoryError};
pub use rest::{ClientError, RestClient};
pub use traits::{AppendSummary, ClearSummary, SheetsClient, SpreadsheetInfo, UpdateSummary};
