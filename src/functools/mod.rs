mod get_job_details;
mod get_job_status;
mod list_jobs;
mod list_tables;
mod run_sql_query;

pub use get_job_details::get_job_details;
pub use get_job_status::get_job_status;
pub use list_jobs::list_jobs;
pub use list_tables::list_tables;
pub use run_sql_query::run_sql_query;

use crate::error::DatabricksError;
use rmcp::{model::*, ErrorData as McpError};

pub(crate) type McpResult = Result<CallToolResult, McpError>;

/// Report a failed invocation to the caller as `Error <context>: <cause>`.
pub(crate) fn tool_failure(context: &str, err: DatabricksError) -> McpResult {
    tracing::warn!("tool failed while {}: {}", context, err);
    mcp_error!(format!("Error {}: {}", context, err))
}
