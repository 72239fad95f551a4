//! Wire shapes of the Databricks SQL Statement Execution and Jobs APIs, plus
//! the read-only projections handed to the markdown formatter.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// -----------------------------
// SQL statement execution
// -----------------------------

#[derive(Debug, Serialize)]
pub(crate) struct StatementRequest<'a> {
    pub statement: &'a str,
    pub warehouse_id: &'a str,
    pub disposition: &'static str,
    pub format: &'static str,
    pub wait_timeout: String,
    pub on_wait_timeout: &'static str,
    pub row_limit: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatementResponse {
    pub statement_id: String,
    pub status: Option<StatementStatus>,
    pub manifest: Option<ResultManifest>,
    pub result: Option<ResultChunk>,
}

impl StatementResponse {
    pub fn state(&self) -> StatementState {
        self.status
            .as_ref()
            .map(|s| StatementState::from(s.state.as_str()))
            .unwrap_or(StatementState::Succeeded)
    }

    pub fn error_message(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatementStatus {
    pub state: String,
    pub error: Option<StatementError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatementError {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
    Other,
}

impl From<&str> for StatementState {
    fn from(state: &str) -> Self {
        match state {
            "PENDING" => StatementState::Pending,
            "RUNNING" => StatementState::Running,
            "SUCCEEDED" => StatementState::Succeeded,
            "FAILED" => StatementState::Failed,
            "CANCELED" => StatementState::Canceled,
            "CLOSED" => StatementState::Closed,
            _ => StatementState::Other,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultManifest {
    pub schema: Option<ResultSchema>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ColumnInfo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultChunk {
    pub data_array: Option<Vec<Vec<Option<String>>>>,
    pub next_chunk_internal_link: Option<String>,
}

/// Rows and column names of a finished statement. Cells are `None` for SQL NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub truncated: bool,
}

// -----------------------------
// Jobs API
// -----------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobSettings {
    pub name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobEntry {
    pub job_id: Option<i64>,
    pub creator_user_name: Option<String>,
    pub created_time: Option<i64>,
    #[serde(default)]
    pub settings: JobSettings,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobsListResponse {
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
    #[serde(default)]
    pub has_more: bool,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunState {
    pub life_cycle_state: Option<String>,
    pub result_state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunEntry {
    pub run_id: Option<i64>,
    pub state: Option<RunState>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunsListResponse {
    #[serde(default)]
    pub runs: Vec<RunEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub job_id: Option<i64>,
    pub name: Option<String>,
    pub creator: Option<String>,
}

impl From<JobEntry> for JobSummary {
    fn from(entry: JobEntry) -> Self {
        JobSummary {
            job_id: entry.job_id,
            name: entry.settings.name,
            creator: entry.creator_user_name,
        }
    }
}

/// Job listing plus whether pages were left unread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobList {
    pub jobs: Vec<JobSummary>,
    pub incomplete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRun {
    pub run_id: Option<i64>,
    pub state: Option<String>,
    /// Epoch milliseconds.
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl JobRun {
    /// Seconds between start and end; `None` while either is unknown.
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if start > 0 && end > 0 => {
                Some((end - start) as f64 / 1000.0)
            }
            _ => None,
        }
    }
}

impl From<RunEntry> for JobRun {
    fn from(entry: RunEntry) -> Self {
        let state = entry
            .state
            .and_then(|s| s.result_state.or(s.life_cycle_state));
        JobRun {
            run_id: entry.run_id,
            state,
            start_time: entry.start_time,
            end_time: entry.end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobTask {
    pub task_key: Option<String>,
    pub task_type: Option<String>,
    pub description: Option<String>,
}

impl From<&Map<String, Value>> for JobTask {
    fn from(task: &Map<String, Value>) -> Self {
        let text = |key: &str| task.get(key).and_then(Value::as_str).map(str::to_string);
        JobTask {
            task_key: text("task_key"),
            task_type: task.keys().find(|k| k.ends_with("_task")).cloned(),
            description: text("description"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobDetail {
    pub job_id: i64,
    pub name: Option<String>,
    pub created_time: Option<i64>,
    pub creator: Option<String>,
    pub tasks: Vec<JobTask>,
}

impl JobDetail {
    pub(crate) fn from_entry(requested_id: i64, entry: JobEntry) -> Self {
        JobDetail {
            job_id: entry.job_id.unwrap_or(requested_id),
            name: entry.settings.name,
            created_time: entry.created_time,
            creator: entry.creator_user_name,
            tasks: entry.settings.tasks.iter().map(JobTask::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
}

/// Tables visible to the warehouse; `truncated` when the row limit cut the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableList {
    pub tables: Vec<TableDescriptor>,
    pub truncated: bool,
}
