//! Markdown rendering of query results and job metadata. Everything here is
//! pure: the same input always renders to the same bytes.
use chrono::{DateTime, Utc};

use crate::models::{JobDetail, JobList, JobRun, TableList, TabularResult};

const NA: &str = "N/A";

pub const NO_RESULTS: &str = "Query executed successfully. No results returned.";

/// Make a value safe to place inside a markdown table cell.
pub fn escape_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Render a markdown table. `None` cells render empty.
pub fn format_table<S: AsRef<str>>(columns: &[S], rows: &[Vec<Option<String>>]) -> String {
    let mut table = String::new();

    let header: Vec<String> = columns.iter().map(|c| escape_cell(c.as_ref())).collect();
    table.push_str(&format!("| {} |\n", header.join(" | ")));
    table.push_str(&format!("| {} |\n", vec!["---"; columns.len()].join(" | ")));

    for row in rows {
        let cells: Vec<String> = (0..columns.len())
            .map(|i| {
                row.get(i)
                    .and_then(|c| c.as_deref())
                    .map(escape_cell)
                    .unwrap_or_default()
            })
            .collect();
        table.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    table
}

pub fn format_query_result(result: &TabularResult) -> String {
    if result.columns.is_empty() || result.rows.is_empty() {
        return NO_RESULTS.to_string();
    }
    let mut out = format_table(result.columns.as_slice(), &result.rows);
    if result.truncated {
        out.push_str(&format!(
            "\n_Result truncated to the first {} rows._\n",
            result.rows.len()
        ));
    }
    out
}

/// UTC `YYYY-MM-DD HH:MM:SS` from epoch milliseconds; `N/A` for absent or zero.
pub fn format_timestamp(millis: Option<i64>) -> String {
    millis
        .filter(|ms| *ms > 0)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| NA.to_string())
}

fn or_na<T: ToString>(value: Option<T>) -> Option<String> {
    Some(value.map(|v| v.to_string()).unwrap_or_else(|| NA.to_string()))
}

pub fn format_jobs(list: &JobList) -> String {
    if list.jobs.is_empty() {
        return "No jobs found.".to_string();
    }

    let rows: Vec<Vec<Option<String>>> = list
        .jobs
        .iter()
        .map(|job| {
            vec![
                or_na(job.job_id),
                or_na(job.name.as_deref()),
                or_na(job.creator.as_deref()),
            ]
        })
        .collect();

    let mut out = format_table(&["Job ID", "Job Name", "Created By"], &rows);
    if list.incomplete {
        out.push_str(&format!(
            "\n_Showing the first {} jobs; more exist in the workspace._\n",
            list.jobs.len()
        ));
    }
    out
}

pub fn format_job_runs(job_id: i64, runs: &[JobRun]) -> String {
    if runs.is_empty() {
        return format!("No runs found for job ID {}.", job_id);
    }

    let rows: Vec<Vec<Option<String>>> = runs
        .iter()
        .map(|run| {
            vec![
                or_na(run.run_id),
                or_na(run.state.as_deref()),
                Some(format_timestamp(run.start_time)),
                Some(format_timestamp(run.end_time)),
                or_na(run.duration_secs().map(|secs| format!("{:.2}s", secs))),
            ]
        })
        .collect();

    format_table(
        &["Run ID", "State", "Start Time", "End Time", "Duration"],
        &rows,
    )
}

pub fn format_job_detail(job: &JobDetail) -> String {
    let name = job.name.as_deref().unwrap_or(NA);

    let mut out = format!("## Job Details: {}\n\n", name);
    out.push_str(&format!("- **Job Name:** {}\n", name));
    out.push_str(&format!("- **Job ID:** {}\n", job.job_id));
    out.push_str(&format!(
        "- **Created Time:** {}\n",
        format_timestamp(job.created_time)
    ));
    out.push_str(&format!(
        "- **Creator:** {}\n\n",
        job.creator.as_deref().unwrap_or(NA)
    ));

    // the section stays even when the job has no tasks
    out.push_str("### Tasks\n\n");
    if !job.tasks.is_empty() {
        let rows: Vec<Vec<Option<String>>> = job
            .tasks
            .iter()
            .map(|task| {
                vec![
                    or_na(task.task_key.as_deref()),
                    or_na(task.task_type.as_deref()),
                    or_na(task.description.as_deref()),
                ]
            })
            .collect();
        out.push_str(&format_table(
            &["Task Key", "Task Type", "Description"],
            &rows,
        ));
    }

    out
}

pub fn format_tables(list: &TableList) -> String {
    if list.tables.is_empty() {
        return "No tables found.".to_string();
    }
    let mut out = list
        .tables
        .iter()
        .map(|t| {
            format!(
                "- Database: {}, Schema: {}, Table: {}",
                t.database.as_deref().unwrap_or(""),
                t.schema.as_deref().unwrap_or(""),
                t.table.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    if list.truncated {
        out.push_str(&format!(
            "\n\n_Result truncated to the first {} tables._\n",
            list.tables.len()
        ));
    }
    out
}
