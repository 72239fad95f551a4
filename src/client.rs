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
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;

use crate::config::{Credentials, Settings};
use crate::error::{DatabricksError, Result};
use crate::models::*;

const STATEMENTS_ENDPOINT: &str = "/api/2.0/sql/statements";
const JOBS_LIST_ENDPOINT: &str = "/api/2.1/jobs/list";
const JOBS_GET_ENDPOINT: &str = "/api/2.1/jobs/get";
const RUNS_LIST_ENDPOINT: &str = "/api/2.1/jobs/runs/list";
const NODE_TYPES_ENDPOINT: &str = "/api/2.0/clusters/list-node-types";

pub const TABLES_QUERY: &str = "SELECT table_catalog, table_schema, table_name \
     FROM system.information_schema.tables ORDER BY 1, 2, 3";

/// Server-side wait accepted by the statements API: `0s` or 5..=50 seconds.
/// Always below the per-request timeout.
fn wait_timeout_param(query_timeout: Duration, request_timeout: Duration) -> String {
    let secs = query_timeout
        .as_secs()
        .min(50)
        .min(request_timeout.as_secs().saturating_sub(1));
    if secs < 5 {
        "0s".to_string()
    } else {
        format!("{}s", secs)
    }
}

/// Thin client over the SQL Statement Execution and Jobs REST APIs.
/// Every call is a single attempt; failures are returned as-is.
pub struct DatabricksClient {
    base_url: String,
    token: String,
    // only the SQL calls need a warehouse; the jobs calls work without one
    warehouse_id: std::result::Result<String, String>,
    settings: Settings,
    http: reqwest::Client,
}

impl DatabricksClient {
    pub fn new(credentials: &Credentials, settings: Settings) -> Result<Self> {
        let warehouse_id = credentials.warehouse_id().map_err(|e| e.detail());
        if let Err(msg) = &warehouse_id {
            tracing::warn!("SQL queries unavailable: {}", msg);
        }
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            base_url: credentials.base_url(),
            token: credentials.token.clone(),
            warehouse_id,
            settings,
            http,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Warehouse the SQL calls run on, or the configuration problem that
    /// prevents them.
    pub fn warehouse_id(&self) -> Result<&str> {
        self.warehouse_id
            .as_deref()
            .map_err(|msg| DatabricksError::Configuration(msg.clone()))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&impl Serialize>,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Databricks request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%status, len = text.len(), "Databricks response");

        if !status.is_success() {
            tracing::info!(%status, %url, "Databricks request failed");
            return Err(DatabricksError::from_response(status.as_u16(), &text));
        }
        Ok(text)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&impl Serialize>,
    ) -> Result<T> {
        let text = self.send(method, path, query, body).await?;
        Ok(serde_json::from_str(&text)?)
    }

    // -------------------------
    // SQL
    // -------------------------

    /// Run `sql` on the configured warehouse and wait (bounded) for its rows.
    pub async fn execute_query(&self, sql: &str) -> Result<TabularResult> {
        let warehouse_id = self.warehouse_id()?;
        let started = Instant::now();
        let timeout = self.settings.query_timeout();

        let request = StatementRequest {
            statement: sql,
            warehouse_id,
            disposition: "INLINE",
            format: "JSON_ARRAY",
            wait_timeout: wait_timeout_param(timeout, self.settings.request_timeout()),
            on_wait_timeout: "CONTINUE",
            row_limit: self.settings.row_limit,
        };
        let mut response: StatementResponse = self
            .call(Method::POST, STATEMENTS_ENDPOINT, &[], Some(&request))
            .await?;

        loop {
            match response.state() {
                StatementState::Succeeded => return self.collect_result(response).await,
                StatementState::Pending | StatementState::Running => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        self.cancel_statement(&response.statement_id).await;
                        return Err(DatabricksError::Timeout {
                            statement_id: response.statement_id,
                            waited: timeout,
                        });
                    }
                    sleep(self.settings.poll_interval().min(timeout - elapsed)).await;

                    let path = format!("{}/{}", STATEMENTS_ENDPOINT, response.statement_id);
                    tracing::debug!(statement_id = %response.statement_id, "polling statement");
                    response = self.call(Method::GET, &path, &[], None::<&()>).await?;
                }
                _ => {
                    let state = response
                        .status
                        .as_ref()
                        .map(|s| s.state.clone())
                        .unwrap_or_default();
                    return Err(DatabricksError::QueryFailed {
                        state,
                        message: response.error_message(),
                    });
                }
            }
        }
    }

    async fn collect_result(&self, response: StatementResponse) -> Result<TabularResult> {
        let limit = self.settings.row_limit;
        let (columns, mut truncated) = match response.manifest {
            Some(manifest) => (
                manifest
                    .schema
                    .map(|s| s.columns.into_iter().map(|c| c.name).collect::<Vec<_>>())
                    .unwrap_or_default(),
                manifest.truncated,
            ),
            None => (Vec::new(), false),
        };

        let mut rows = Vec::new();
        let mut next_link = None;
        if let Some(chunk) = response.result {
            rows.extend(chunk.data_array.unwrap_or_default());
            next_link = chunk.next_chunk_internal_link;
        }

        while let Some(link) = next_link.take() {
            if rows.len() >= limit {
                truncated = true;
                break;
            }
            let chunk: ResultChunk = self.call(Method::GET, &link, &[], None::<&()>).await?;
            rows.extend(chunk.data_array.unwrap_or_default());
            next_link = chunk.next_chunk_internal_link;
        }

        if rows.len() > limit {
            rows.truncate(limit);
            truncated = true;
        }

        tracing::debug!(columns = columns.len(), rows = rows.len(), "statement finished");
        Ok(TabularResult {
            columns,
            rows,
            truncated,
        })
    }

    async fn cancel_statement(&self, statement_id: &str) {
        let path = format!("{}/{}/cancel", STATEMENTS_ENDPOINT, statement_id);
        if let Err(e) = self.send(Method::POST, &path, &[], None::<&()>).await {
            tracing::warn!(%statement_id, "failed to cancel timed out statement: {}", e);
        }
    }

    pub async fn list_tables(&self) -> Result<TableList> {
        let result = self.execute_query(TABLES_QUERY).await?;
        let tables = result
            .rows
            .into_iter()
            .map(|row| {
                let cell = |i: usize| row.get(i).cloned().flatten();
                TableDescriptor {
                    database: cell(0),
                    schema: cell(1),
                    table: cell(2),
                }
            })
            .collect();
        Ok(TableList {
            tables,
            truncated: result.truncated,
        })
    }

    // -------------------------
    // Jobs
    // -------------------------

    /// All jobs, following page tokens up to `max_job_pages`.
    pub async fn list_jobs(&self) -> Result<JobList> {
        let mut jobs = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..self.settings.max_job_pages.max(1) {
            let mut query = vec![("limit", self.settings.job_page_size.to_string())];
            if let Some(token) = &page_token {
                query.push(("page_token", token.clone()));
            }
            let response: JobsListResponse = self
                .call(Method::GET, JOBS_LIST_ENDPOINT, &query, None::<&()>)
                .await?;

            tracing::debug!(page, count = response.jobs.len(), "jobs page");
            jobs.extend(response.jobs.into_iter().map(JobSummary::from));

            page_token = if response.has_more {
                response.next_page_token
            } else {
                None
            };
            if page_token.is_none() {
                break;
            }
        }

        Ok(JobList {
            jobs,
            incomplete: page_token.is_some(),
        })
    }

    /// Most recent runs of `job_id`.
    pub async fn get_job_runs(&self, job_id: i64) -> Result<Vec<JobRun>> {
        ensure_job_id(job_id)?;
        let query = [
            ("job_id", job_id.to_string()),
            ("limit", self.settings.runs_limit.to_string()),
        ];
        let response: RunsListResponse = self
            .call(Method::GET, RUNS_LIST_ENDPOINT, &query, None::<&()>)
            .await?;
        Ok(response.runs.into_iter().map(JobRun::from).collect())
    }

    pub async fn get_job_details(&self, job_id: i64) -> Result<JobDetail> {
        ensure_job_id(job_id)?;
        let query = [("job_id", job_id.to_string())];
        let entry: JobEntry = self
            .call(Method::GET, JOBS_GET_ENDPOINT, &query, None::<&()>)
            .await?;
        Ok(JobDetail::from_entry(job_id, entry))
    }

    /// Cheap authenticated request used by the `check` command.
    pub async fn check_api(&self) -> Result<()> {
        let _: Value = self
            .call(Method::GET, NODE_TYPES_ENDPOINT, &[], None::<&()>)
            .await?;
        Ok(())
    }
}

fn ensure_job_id(job_id: i64) -> Result<()> {
    if job_id <= 0 {
        return Err(DatabricksError::NotFound(format!(
            "Job {} does not exist.",
            job_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_timeout_param() {
        let request = Duration::from_secs(60);
        let cases = vec![(0, "0s"), (4, "0s"), (5, "5s"), (30, "30s"), (120, "50s")];
        for (query_secs, expected) in cases {
            assert_eq!(
                wait_timeout_param(Duration::from_secs(query_secs), request),
                expected
            );
        }
    }

    #[test]
    fn test_wait_timeout_stays_below_request_timeout() {
        let query = Duration::from_secs(120);
        let cases = vec![(30, "29s"), (50, "49s"), (6, "5s"), (5, "0s"), (1, "0s")];
        for (request_secs, expected) in cases {
            assert_eq!(
                wait_timeout_param(query, Duration::from_secs(request_secs)),
                expected
            );
        }
    }

    #[test]
    fn test_non_positive_job_id_is_not_found() {
        assert!(ensure_job_id(-1).unwrap_err().is_not_found());
        assert!(ensure_job_id(0).unwrap_err().is_not_found());
        assert!(ensure_job_id(1).is_ok());
    }

    #[test]
    fn test_non_warehouse_path_only_blocks_sql() {
        let creds = Credentials {
            host: "adb-1.azuredatabricks.net".to_string(),
            http_path: "/not/a/warehouse".to_string(),
            token: "t".to_string(),
        };
        let client = DatabricksClient::new(&creds, Settings::default()).unwrap();
        assert!(matches!(
            client.warehouse_id(),
            Err(DatabricksError::Configuration(_))
        ));
    }

    #[test]
    fn test_warehouse_id_from_path() {
        let creds = Credentials {
            host: "adb-1.azuredatabricks.net".to_string(),
            http_path: "/sql/1.0/warehouses/abc".to_string(),
            token: "t".to_string(),
        };
        let client = DatabricksClient::new(&creds, Settings::default()).unwrap();
        assert_eq!(client.warehouse_id().unwrap(), "abc");
    }
}
