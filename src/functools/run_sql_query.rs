// Copyright (C) 2025 Nuwaira
// All Rights Reserved.
//
// NOTICE: All information contained herein is, and remains
// the property of Nuwaira.
// The intellectual and technical concepts contained
// herein are proprietary to Nuwaira
// and are protected by trade secret or copyright law.
// Dissemination of this information or reproduction of this material
// is strictly forbidden unless prior written permission is obtained
// from Nuwaira.
use crate::client::DatabricksClient;
use crate::error::{DatabricksError, Result};
use crate::markdown::format_query_result;

use super::{tool_failure, McpResult};

const CONTEXT: &str = "executing query";

pub async fn run_sql_query(client: Result<&DatabricksClient>, sql: &str) -> McpResult {
    let sql = sql.trim();
    if sql.is_empty() {
        return tool_failure(
            CONTEXT,
            DatabricksError::Validation("`sql` must not be empty".to_string()),
        );
    }

    let client = match client {
        Ok(client) => client,
        Err(e) => return tool_failure(CONTEXT, e),
    };

    tracing::info!(len = sql.len(), "running SQL query");
    match client.execute_query(sql).await {
        Ok(result) => mcp_return!(format_query_result(&result)),
        Err(e) => tool_failure(CONTEXT, e),
    }
}
