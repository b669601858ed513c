use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RecordConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub telemetry: TelemetryConfig,
}

/// Connection parameters for the document store.
///
/// `uri`, when present, replaces host/port/credentials entirely.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: Option<Secret<String>>,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub auth_source: String,
    pub database: String,
    pub collection: String,
    pub server_selection_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl RecordConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service configuration from any key lookup, so the rules
    /// can be exercised without touching the process environment.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader {
            lookup: &lookup,
            is_prod: lookup("ENVIRONMENT").as_deref() == Some("prod"),
        };

        let uri = env.optional("MONGODB_URI");
        // With a full URI the individual parts are never consulted.
        let parts = EnvReader {
            lookup: &lookup,
            is_prod: env.is_prod && uri.is_none(),
        };

        let (username, password) = if parts.is_prod {
            (
                Some(parts.get("MONGODB_USERNAME", None)?),
                Some(parts.get("MONGODB_PASSWORD", None)?),
            )
        } else {
            (
                parts.optional("MONGODB_USERNAME"),
                parts.optional("MONGODB_PASSWORD"),
            )
        };

        Ok(RecordConfig {
            common,
            mongodb: MongoConfig {
                uri: uri.map(Secret::new),
                host: parts.get("MONGODB_HOST", Some("mongodb"))?,
                port: parts.parse("MONGODB_PORT", "27017")?,
                username,
                password: password.map(Secret::new),
                auth_source: parts.get("MONGODB_AUTH_SOURCE", Some("admin"))?,
                database: env.get("MONGODB_DATABASE", Some("record_db"))?,
                collection: env.get("MONGODB_COLLECTION", Some("records"))?,
                server_selection_timeout: Duration::from_secs(
                    env.parse("MONGODB_SERVER_SELECTION_TIMEOUT_SECS", "10")?,
                ),
            },
            telemetry: TelemetryConfig {
                log_level: env
                    .optional("LOG_LEVEL")
                    .unwrap_or_else(|| "info".to_string()),
                otlp_endpoint: env.optional("OTLP_ENDPOINT"),
            },
        })
    }
}

struct EnvReader<'a, F> {
    lookup: &'a F,
    is_prod: bool,
}

impl<F> EnvReader<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }

    fn get(&self, key: &str, default: Option<&str>) -> Result<String, AppError> {
        match self.optional(key) {
            Some(val) => Ok(val),
            None => {
                if self.is_prod {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required in production but not set",
                        key
                    )))
                } else if let Some(def) = default {
                    Ok(def.to_string())
                } else {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required but not set",
                        key
                    )))
                }
            }
        }
    }

    fn parse<T>(&self, key: &str, default: &str) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(key, Some(default))?;
        raw.parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("Invalid {} value '{}': {}", key, raw, e))
        })
    }
}
