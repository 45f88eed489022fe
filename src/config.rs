//! Configuration manager for the account service.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_NAME: &str = "Account REST API Service";
const DEFAULT_CSP: &str = "default-src 'self'; object-src 'none'";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the PostgreSQL connection string.
pub const DATABASE_URI: &str = "DATABASE_URI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Service name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Public base URL, used for `Location` headers.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Response headers and HTTPS enforcement.
    #[serde(default, skip_serializing)]
    pub security: Security,
    #[serde(default, skip_serializing)]
    pub telemetry: Telemetry,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: default_name(),
            url: String::default(),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: None,
            security: Security::default(),
            telemetry: Telemetry::default(),
        }
    }
}

fn default_name() -> String {
    DEFAULT_NAME.to_owned()
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Full connection string, takes precedence over other fields.
    pub uri: Option<String>,
    /// Hostname:(?port) for PostgreSQL instance.
    #[serde(default)]
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Security headers configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    /// Redirect plain HTTP requests to HTTPS.
    pub force_https: bool,
    pub content_security_policy: String,
    /// `Access-Control-Allow-Origin` value, `*` for any.
    pub cors_allow_origin: String,
}

impl Default for Security {
    fn default() -> Self {
        Self {
            force_https: false,
            content_security_policy: DEFAULT_CSP.to_owned(),
            cors_allow_origin: "*".to_owned(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// Install a Prometheus recorder and expose `GET /metrics`.
    pub prometheus: bool,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string().trim_end_matches('/').to_owned())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let mut config = match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        config.version = VERSION.to_owned();
        if !config.url.is_empty() {
            config.url = self.normalize_url(&config.url)?;
        }

        // environment takes precedence over file.
        if let Ok(uri) = std::env::var(DATABASE_URI) {
            config.postgres = Some(Postgres {
                uri: Some(uri),
                ..config.postgres.unwrap_or_default()
            });
        }

        Ok(Arc::new(config))
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found or invalid");
        Self::default()
    }
}

impl Postgres {
    /// Connection string for this instance.
    pub fn connection_string(&self) -> String {
        if let Some(uri) = &self.uri {
            return uri.clone();
        }

        let username = self
            .username
            .as_deref()
            .unwrap_or(crate::database::DEFAULT_CREDENTIALS);
        let password = self
            .password
            .as_deref()
            .unwrap_or(crate::database::DEFAULT_CREDENTIALS);
        let database = self
            .database
            .as_deref()
            .unwrap_or(crate::database::DEFAULT_DATABASE_NAME);

        format!(
            "postgres://{username}:{password}@{}/{database}",
            self.address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() {
        let config: Configuration =
            serde_yaml::from_str("url: accounts.example.com").unwrap();

        assert_eq!(config.name, DEFAULT_NAME);
        assert_eq!(config.postgres, None);
        assert!(!config.security.force_https);
        assert_eq!(config.security.content_security_policy, DEFAULT_CSP);
        assert_eq!(config.security.cors_allow_origin, "*");
        assert!(!config.telemetry.prometheus);
    }

    #[test]
    fn test_normalize_url() {
        let config = Configuration::default();

        assert_eq!(
            config.normalize_url("accounts.example.com").unwrap(),
            "https://accounts.example.com"
        );
        assert_eq!(
            config.normalize_url("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_connection_string() {
        let postgres = Postgres {
            address: "db:5432".into(),
            password: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(
            postgres.connection_string(),
            "postgres://postgres:secret@db:5432/postgres"
        );

        let postgres = Postgres {
            uri: Some("postgresql://u:p@h/d".into()),
            ..postgres
        };
        assert_eq!(postgres.connection_string(), "postgresql://u:p@h/d");
    }
}
