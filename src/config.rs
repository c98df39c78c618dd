use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::models::{SearchTerm, Source};
use crate::secrets::SecretStore;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub search_terms: Vec<SearchTerm>,
    pub api_sources: Vec<Source>,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between runs. Ignored when `cron` is set.
    pub interval_secs: u64,
    /// Cron expression with a leading seconds field, e.g. `0 0 * * * *`.
    pub cron: Option<String>,
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            cron: None,
            run_on_start: true,
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: format!("dealbot/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_name: "dealbot.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9001,
        }
    }
}

/// SMTP delivery settings. These are secrets, so they come from the secret
/// store rather than the config file.
#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub receiver_email: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"***")
            .field("receiver_email", &self.receiver_email)
            .finish()
    }
}

impl SmtpConfig {
    pub fn from_secrets(secrets: &dyn SecretStore) -> Result<Self> {
        let require = |name: &str| {
            secrets.get(name).ok_or_else(|| AppError::MissingSecret {
                name: name.to_string(),
            })
        };

        let port = require("SMTP_PORT")?;
        let port = port.trim().parse::<u16>().map_err(|_| {
            AppError::Validation(format!("SMTP_PORT must be a port number, got '{}'", port))
        })?;

        Ok(Self {
            server: require("SMTP_SERVER")?,
            port,
            sender_email: require("SENDER_EMAIL")?,
            sender_password: require("SENDER_PASSWORD")?,
            receiver_email: require("RECEIVER_EMAIL")?,
        })
    }
}

impl AppConfig {
    /// Load from `path` (extension optional), an optional `<path>-local`
    /// overlay, then `DEALBOT__*` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let local = format!("{}-local", Path::new(path).with_extension("").display());

        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(File::with_name(&local).required(false))
            .add_source(Environment::with_prefix("DEALBOT").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut names = HashSet::new();
        for source in &self.api_sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::Message("Source name must not be empty".into()));
            }

            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::Message(format!(
                    "Duplicate source name: {}",
                    source.name
                )));
            }

            if Url::parse(&source.endpoint).is_err() {
                return Err(ConfigError::Message(format!(
                    "Invalid endpoint URL for source {}: {}",
                    source.name, source.endpoint
                )));
            }
        }

        if self.api_sources.is_empty() {
            tracing::warn!("No api_sources configured, runs will find nothing");
        }

        if self.search_terms.is_empty() {
            tracing::warn!("No search_terms configured, runs will find nothing");
        }

        match &self.scheduler.cron {
            Some(expr) if !is_valid_cron(expr) => {
                return Err(ConfigError::Message(
                    "Invalid cron expression in scheduler.cron".into(),
                ));
            }
            Some(_) => {}
            None if self.scheduler.interval_secs == 0 => {
                return Err(ConfigError::Message(
                    "Scheduler interval_secs must be greater than 0".into(),
                ));
            }
            None => {}
        }

        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "HTTP request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message("Metrics port must be greater than 0".into()));
        }

        Ok(())
    }
}

/// Cron with seconds: 6 or 7 fields (sec min hour day month weekday [year]).
pub fn is_valid_cron(cron_expr: &str) -> bool {
    let parts: Vec<&str> = cron_expr.split_whitespace().collect();
    if parts.len() != 6 && parts.len() != 7 {
        return false;
    }

    // Allow numbers, names, ranges, lists, wildcards and steps
    parts.iter().all(|part| {
        part.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '*' | '-' | ',' | '/' | '?'))
    })
}
