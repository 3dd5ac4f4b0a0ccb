use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Secret used when development runs without `JWT_SECRET`.
const DEV_JWT_SECRET: &str = "diary-api-development-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub reminder: ReminderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string. `None` selects the in-memory store (development only).
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

#[derive(Clone)]
pub struct ReminderConfig {
    pub push_relay_url: Option<String>,
    pub push_relay_token: Option<String>,
    pub interval_secs: u64,
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// `APP_ENV` picks the preset, individual variables then override it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let preset = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        preset.with_overrides(&lookup).validated()
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        override_parsed(lookup, "PORT", &mut self.server.port);
        override_parsed(lookup, "DIARY_API_PORT", &mut self.server.port);

        // Database
        if let Some(v) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database.url = Some(v);
        }
        override_parsed(lookup, "DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_parsed(lookup, "DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);

        // API
        override_parsed(lookup, "API_ENABLE_REQUEST_LOGGING", &mut self.api.enable_request_logging);
        override_parsed(lookup, "API_MAX_REQUEST_SIZE_BYTES", &mut self.api.max_request_size_bytes);

        // Security
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        override_parsed(lookup, "SECURITY_JWT_EXPIRY_HOURS", &mut self.security.jwt_expiry_hours);
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        override_parsed(lookup, "SECURITY_HASH_MEMORY_KIB", &mut self.security.hash_memory_kib);
        override_parsed(lookup, "SECURITY_HASH_ITERATIONS", &mut self.security.hash_iterations);

        // Reminder
        if let Some(v) = lookup("REMINDER_PUSH_RELAY_URL").filter(|v| !v.trim().is_empty()) {
            self.reminder.push_relay_url = Some(v);
        }
        if let Some(v) = lookup("REMINDER_PUSH_RELAY_TOKEN").filter(|v| !v.is_empty()) {
            self.reminder.push_relay_token = Some(v);
        }
        override_parsed(lookup, "REMINDER_INTERVAL_SECS", &mut self.reminder.interval_secs);

        self
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.security.jwt_secret.is_empty() {
            if !self.is_development() {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            tracing::warn!("JWT_SECRET not set, using the development secret");
            self.security.jwt_secret = DEV_JWT_SECRET.to_string();
        }

        if self.security.jwt_expiry_hours == 0 {
            return Err(ConfigError::Invalid {
                name: "SECURITY_JWT_EXPIRY_HOURS",
                reason: "must be at least 1".to_string(),
            });
        }

        match &self.database.url {
            Some(raw) => {
                url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
                    name: "DATABASE_URL",
                    reason: e.to_string(),
                })?;
            }
            None if !self.is_development() => return Err(ConfigError::Missing("DATABASE_URL")),
            None => {}
        }

        if let Some(raw) = &self.reminder.push_relay_url {
            url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
                name: "REMINDER_PUSH_RELAY_URL",
                reason: e.to_string(),
            })?;
        }

        if self.reminder.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "REMINDER_INTERVAL_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["*".to_string()],
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
            reminder: ReminderConfig {
                push_relay_url: None,
                push_relay_token: None,
                interval_secs: 24 * 60 * 60,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://staging.example.com".to_string()],
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
            reminder: ReminderConfig {
                push_relay_url: None,
                push_relay_token: None,
                interval_secs: 24 * 60 * 60,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://app.example.com".to_string()],
                hash_memory_kib: 64 * 1024,
                hash_iterations: 3,
            },
            reminder: ReminderConfig {
                push_relay_url: None,
                push_relay_token: None,
                interval_secs: 24 * 60 * 60,
            },
        }
    }
}

fn override_parsed<F, T>(lookup: &F, name: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(name) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring unparseable value for {}", name),
        }
    }
}

/// Strip credentials from a connection string before it reaches a log line.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_deref().map(redact_url))
            .field("max_connections", &self.max_connections)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("cors_origins", &self.cors_origins)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .finish()
    }
}

impl fmt::Debug for ReminderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderConfig")
            .field("push_relay_url", &self.push_relay_url)
            .field("push_relay_token", &self.push_relay_token.as_ref().map(|_| "<redacted>"))
            .field("interval_secs", &self.interval_secs)
            .finish()
    }
}
