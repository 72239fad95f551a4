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
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabricksError>;

/// Everything a tool invocation can fail with.
#[derive(Debug, Error)]
pub enum DatabricksError {
    /// Tool arguments were present but unusable (e.g. blank SQL).
    #[error("invalid argument: {0}")]
    Validation(String),

    /// Credentials or settings needed for the call are missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Databricks API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Upstream failure reported by the warehouse for an accepted statement
    /// (`FAILED`, `CANCELED` or `CLOSED`) rather than by the HTTP layer.
    #[error("query failed ({state}): {message}")]
    QueryFailed { state: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("statement {statement_id} did not finish within {}s", .waited.as_secs())]
    Timeout {
        statement_id: String,
        waited: Duration,
    },

    #[error("request to Databricks failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from Databricks: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DatabricksError {
    /// Message without the variant prefix, for re-raising configuration failures.
    pub fn detail(&self) -> String {
        match self {
            DatabricksError::Configuration(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabricksError::NotFound(_))
    }

    /// Failures reported by Databricks itself or by the transport to it.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DatabricksError::Upstream { .. }
                | DatabricksError::QueryFailed { .. }
                | DatabricksError::Http(_)
                | DatabricksError::Decode(_)
        )
    }

    /// Classify a non-success response. `body` is the raw response text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
        let (error_code, message) = match parsed {
            Some(ApiErrorBody {
                error_code,
                message: Some(message),
            }) => (error_code, message),
            Some(ApiErrorBody { error_code, .. }) => (error_code, body.trim().to_string()),
            None => (None, body.trim().to_string()),
        };

        let does_not_exist = error_code.as_deref() == Some("RESOURCE_DOES_NOT_EXIST")
            || message.to_lowercase().contains("does not exist");
        if status == 404 || does_not_exist {
            return DatabricksError::NotFound(message);
        }

        let message = match error_code {
            Some(code) => format!("{} ({})", message, code),
            None => message,
        };
        DatabricksError::Upstream { status, message }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: Option<String>,
    message: Option<String>,
}
