//! Plugin host entry points.
//!
//! One invocation = one remote operation: validate the action
//! configuration, bind a REST client to the target spreadsheet, execute.
//! The datasource-level entry points (catalog, connectivity test,
//! credential cleanup) are thin pass-throughs over the client.

use tracing::debug;

use sheetflow_client::{RestClient, SpreadsheetInfo};
use sheetflow_core::SheetError;

use crate::execute::{ActionOutcome, execute};
use crate::request::{ActionConfig, DatasourceConfig};

/// Validate and run one action against the remote service.
pub fn run_action(
    datasource: &DatasourceConfig,
    config: &ActionConfig,
) -> Result<ActionOutcome, SheetError> {
    let request = config.validate()?;
    let mut client = RestClient::for_spreadsheet(
        datasource.access_token.as_str(),
        request.spreadsheet_id.as_str(),
    );
    execute(&mut client, &request)
}

/// Catalog of spreadsheet documents visible to the datasource credential.
pub fn metadata(datasource: &DatasourceConfig) -> Result<Vec<SpreadsheetInfo>, SheetError> {
    RestClient::new(datasource.access_token.as_str())
        .list_spreadsheets()
        .map_err(|e| SheetError::remote("listSpreadsheets", e))
}

/// Connectivity probe used by the host's "test" button.
pub fn test_connection(datasource: &DatasourceConfig) -> Result<(), SheetError> {
    debug!("probing datasource connectivity");
    RestClient::new(datasource.access_token.as_str())
        .probe()
        .map_err(|e| SheetError::remote("probe", e))
}

/// Credential cleanup before the datasource is deleted. An
/// already-revoked token is not an error.
pub fn pre_delete(datasource: &DatasourceConfig) -> Result<(), SheetError> {
    RestClient::new(datasource.access_token.as_str())
        .revoke_token()
        .map_err(|e| SheetError::remote("revokeToken", e))
}
