use crate::client::DatabricksClient;
use crate::error::Result;
use crate::markdown::format_job_detail;

use super::{tool_failure, McpResult};

const CONTEXT: &str = "getting job details";

pub async fn get_job_details(client: Result<&DatabricksClient>, job_id: i64) -> McpResult {
    let client = match client {
        Ok(client) => client,
        Err(e) => return tool_failure(CONTEXT, e),
    };

    match client.get_job_details(job_id).await {
        Ok(job) => mcp_return!(format_job_detail(&job)),
        Err(e) => tool_failure(CONTEXT, e),
    }
}
