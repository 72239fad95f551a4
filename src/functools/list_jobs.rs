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
use crate::error::Result;
use crate::markdown::format_jobs;

use super::{tool_failure, McpResult};

const CONTEXT: &str = "listing jobs";

pub async fn list_jobs(client: Result<&DatabricksClient>) -> McpResult {
    let client = match client {
        Ok(client) => client,
        Err(e) => return tool_failure(CONTEXT, e),
    };

    match client.list_jobs().await {
        Ok(list) => {
            tracing::info!(count = list.jobs.len(), incomplete = list.incomplete, "listed jobs");
            mcp_return!(format_jobs(&list))
        }
        Err(e) => tool_failure(CONTEXT, e),
    }
}
