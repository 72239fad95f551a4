use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::DatabricksError;

pub const HOST_VAR: &str = "DATABRICKS_HOST";
pub const HTTP_PATH_VAR: &str = "DATABRICKS_HTTP_PATH";
pub const TOKEN_VAR: &str = "DATABRICKS_TOKEN";

pub const DEFAULT_CONFIG_FILE: &str = "databricks-mcp.conf";

/// Tuning knobs read from the optional toml config file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub query_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub row_limit: usize,
    pub job_page_size: usize,
    pub max_job_pages: usize,
    pub runs_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query_timeout_secs: 120,
            poll_interval_ms: 1000,
            request_timeout_secs: 60,
            row_limit: 1000,
            job_page_size: 100,
            max_job_pages: 20,
            runs_limit: 25,
        }
    }
}

impl Settings {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Workspace credentials. Read once at startup and never refreshed.
#[derive(Clone)]
pub struct Credentials {
    pub host: String,
    pub http_path: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("http_path", &self.http_path)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Credentials, DatabricksError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from any variable source; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Credentials, DatabricksError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = read(HOST_VAR);
        let http_path = read(HTTP_PATH_VAR);
        let token = read(TOKEN_VAR);

        match (host, http_path, token) {
            (Some(host), Some(http_path), Some(token)) => Ok(Credentials {
                host,
                http_path,
                token,
            }),
            (host, http_path, token) => {
                let missing: Vec<&str> = [
                    (HOST_VAR, host.is_none()),
                    (HTTP_PATH_VAR, http_path.is_none()),
                    (TOKEN_VAR, token.is_none()),
                ]
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| *name)
                .collect();
                Err(DatabricksError::Configuration(format!(
                    "missing required environment variable(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Base URL of the workspace; `https://` is assumed when no scheme is given.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }

    /// Warehouse id taken from an HTTP path like `/sql/1.0/warehouses/<id>`.
    pub fn warehouse_id(&self) -> Result<String, DatabricksError> {
        let segments: Vec<&str> = self
            .http_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [.., kind, id] if *kind == "warehouses" || *kind == "endpoints" => Ok(id.to_string()),
            _ => Err(DatabricksError::Configuration(format!(
                "{} '{}' does not point at a SQL warehouse (expected /sql/1.0/warehouses/<id>)",
                HTTP_PATH_VAR, self.http_path
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub credentials: Result<Credentials, String>,
}

impl Config {
    pub fn from_toml_str(toml_str: &str) -> Result<Settings, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `file_path` and credentials from the environment.
    /// A missing file is only an error when `required` is set.
    pub fn load(file_path: &str, required: bool) -> Result<Config, Box<dyn std::error::Error>> {
        let settings = if Path::new(file_path).exists() {
            let content = std::fs::read_to_string(file_path)?;
            Self::from_toml_str(&content)?
        } else if required {
            return Err(format!("config file '{}' not found", file_path).into());
        } else {
            Settings::default()
        };

        Ok(Config {
            settings,
            credentials: Credentials::from_env().map_err(|e| e.detail()),
        })
    }

    /// Load from the `--config` argument. A file named on the command line
    /// must exist, even when it is the default name.
    pub fn from_arg(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
        match path {
            Some(path) => Self::load(path, true),
            None => Self::load(DEFAULT_CONFIG_FILE, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_credentials_all_present() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (HOST_VAR, "adb-123.azuredatabricks.net"),
            (HTTP_PATH_VAR, "/sql/1.0/warehouses/abc123"),
            (TOKEN_VAR, "dapi-secret"),
        ]))
        .unwrap();
        assert_eq!(creds.base_url(), "https://adb-123.azuredatabricks.net");
        assert_eq!(creds.warehouse_id().unwrap(), "abc123");
        assert!(!format!("{:?}", creds).contains("dapi-secret"));
    }

    #[test]
    fn test_credentials_missing_are_named() {
        let err = Credentials::from_lookup(lookup_from(&[
            (HOST_VAR, "adb-123.azuredatabricks.net"),
            (TOKEN_VAR, "  "),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: missing required environment variable(s): DATABRICKS_HTTP_PATH, DATABRICKS_TOKEN"
        );
    }

    #[test]
    fn test_base_url_keeps_scheme() {
        let creds = Credentials {
            host: "http://127.0.0.1:8080/".to_string(),
            http_path: "/sql/1.0/endpoints/xyz".to_string(),
            token: "t".to_string(),
        };
        assert_eq!(creds.base_url(), "http://127.0.0.1:8080");
        assert_eq!(creds.warehouse_id().unwrap(), "xyz");
    }

    #[test]
    fn test_warehouse_id_rejects_cluster_path() {
        let creds = Credentials {
            host: "h".to_string(),
            http_path: "sql/protocolv1/o/123/0123-456789-abcd".to_string(),
            token: "t".to_string(),
        };
        assert!(matches!(
            creds.warehouse_id(),
            Err(DatabricksError::Configuration(_))
        ));
    }

    #[test]
    fn test_settings_partial_toml() {
        let settings = Config::from_toml_str("query_timeout_secs = 30\nrow_limit = 50\n").unwrap();
        assert_eq!(settings.query_timeout_secs, 30);
        assert_eq!(settings.row_limit, 50);
        assert_eq!(settings.poll_interval_ms, Settings::default().poll_interval_ms);
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let config = Config::load("/nonexistent/databricks-mcp.conf", false).unwrap();
        assert_eq!(config.settings, Settings::default());
        assert!(Config::load("/nonexistent/databricks-mcp.conf", true).is_err());
    }

    #[test]
    fn test_explicit_default_name_must_exist() {
        assert!(!Path::new(DEFAULT_CONFIG_FILE).exists());
        assert!(Config::from_arg(Some(DEFAULT_CONFIG_FILE)).is_err());
        assert!(Config::from_arg(None).is_ok());
    }
}
