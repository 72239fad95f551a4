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
use std::sync::Arc;

use crate::client::DatabricksClient;
use crate::config::Config;
use crate::error::{DatabricksError, Result as DatabricksResult};
use crate::functools;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

pub const TABLES_URI: &str = "schema://tables";

// -----------------------------
// Args / DTOs
// -----------------------------

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RunSqlQueryArgs {
    /// SQL statement to execute on the configured SQL warehouse
    pub sql: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct JobIdArgs {
    /// Numeric Databricks job id, as shown by `list_jobs`
    pub job_id: i64,
}

// -----------------------------
// Server impl
// -----------------------------

#[derive(Clone)]
pub struct DatabricksExplorer {
    tool_router: ToolRouter<DatabricksExplorer>,
    client: Result<Arc<DatabricksClient>, String>,
}

#[tool_router(vis = "pub")]
impl DatabricksExplorer {
    /// Build the server. Missing credentials do not stop startup; every
    /// invocation reports them instead.
    pub fn new(config: &Config) -> Self {
        let client = config.credentials.clone().and_then(|credentials| {
            DatabricksClient::new(&credentials, config.settings.clone())
                .map(Arc::new)
                .map_err(|e| e.detail())
        });
        if let Err(msg) = &client {
            tracing::warn!("Databricks client unavailable: {}", msg);
        }
        Self {
            tool_router: Self::tool_router(),
            client,
        }
    }

    fn client(&self) -> DatabricksResult<&DatabricksClient> {
        self.client
            .as_deref()
            .map_err(|msg| DatabricksError::Configuration(msg.clone()))
    }

    fn create_resource_text(&self, uri: &str, name: &str) -> Resource {
        RawResource::new(uri, name.to_string()).no_annotation()
    }

    // -------------------------
    // Tools
    // -------------------------

    #[tool(description = "Execute a SQL query on the Databricks SQL warehouse and return the rows as a markdown table")]
    pub async fn run_sql_query(
        &self,
        Parameters(args): Parameters<RunSqlQueryArgs>,
    ) -> Result<CallToolResult, McpError> {
        functools::run_sql_query(self.client(), &args.sql).await
    }

    #[tool(description = "List all Databricks jobs with their id, name and creator")]
    pub async fn list_jobs(&self) -> Result<CallToolResult, McpError> {
        functools::list_jobs(self.client()).await
    }

    #[tool(
        description = "Get the recent runs of a Databricks job: run id, state, start/end time and duration"
    )]
    pub async fn get_job_status(
        &self,
        Parameters(args): Parameters<JobIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        functools::get_job_status(self.client(), args.job_id).await
    }

    #[tool(description = "Get detailed information about a Databricks job, including its tasks")]
    pub async fn get_job_details(
        &self,
        Parameters(args): Parameters<JobIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        functools::get_job_details(self.client(), args.job_id).await
    }

    /// Contents of the `schema://tables` resource.
    pub async fn read_tables(&self) -> Result<String, McpError> {
        functools::list_tables(self.client())
            .await
            .map_err(|e| {
                tracing::warn!("failed to list tables: {}", e);
                McpError::internal_error(
                    format!("Error retrieving tables: {}", e),
                    Some(json!({ "uri": TABLES_URI })),
                )
            })
    }
}

// -----------------------------
// ServerHandler impl
// -----------------------------

#[tool_handler]
impl ServerHandler for DatabricksExplorer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Databricks API Explorer. Tools: run_sql_query, list_jobs, get_job_status, get_job_details. Resource: schema://tables lists the tables visible to the SQL warehouse."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![self.create_resource_text(TABLES_URI, "Databricks Tables")],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match uri.as_str() {
            TABLES_URI => {
                let text = self.read_tables().await?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(text, uri)],
                })
            }
            _ => Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            )),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: Vec::new(),
        })
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        tracing::info!(
            client = %request.client_info.name,
            version = %request.client_info.version,
            "client initialized"
        );
        Ok(self.get_info())
    }
}

// -----------------------------
// Main: run over stdio
// -----------------------------

/// Log to stderr; stdout carries the MCP stream.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        query_timeout_secs = config.settings.query_timeout_secs,
        row_limit = config.settings.row_limit,
        "Starting Databricks MCP server"
    );

    let service = DatabricksExplorer::new(&config)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;

    service.waiting().await?;

    Ok(())
}

// -----------------------------
// Tests (quick sanity)
// -----------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn unconfigured() -> DatabricksExplorer {
        DatabricksExplorer::new(&Config {
            settings: Settings::default(),
            credentials: Err("missing required environment variable(s): DATABRICKS_TOKEN".to_string()),
        })
    }

    #[test]
    fn routers_have_tools() {
        let r = DatabricksExplorer::tool_router();
        assert!(r.has_route("run_sql_query"));
        assert!(r.has_route("list_jobs"));
        assert!(r.has_route("get_job_status"));
        assert!(r.has_route("get_job_details"));
    }

    #[test]
    fn server_info_advertises_tools_and_resources() {
        let info = unconfigured().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_none());
    }

    #[test]
    fn missing_credentials_surface_as_configuration_error() {
        let err = unconfigured().client().err().unwrap();
        assert_eq!(
            err.to_string(),
            "configuration error: missing required environment variable(s): DATABRICKS_TOKEN"
        );
    }
}
