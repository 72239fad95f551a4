use crate::client::DatabricksClient;
use crate::error::Result;
use crate::markdown::format_job_runs;

use super::{tool_failure, McpResult};

const CONTEXT: &str = "getting job status";

pub async fn get_job_status(client: Result<&DatabricksClient>, job_id: i64) -> McpResult {
    let client = match client {
        Ok(client) => client,
        Err(e) => return tool_failure(CONTEXT, e),
    };

    match client.get_job_runs(job_id).await {
        Ok(runs) => mcp_return!(format_job_runs(job_id, &runs)),
        Err(e) => tool_failure(CONTEXT, e),
    }
}
