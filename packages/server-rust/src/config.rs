//! Configuration types for the catalog server.
//!
//! All configuration is read exactly once at process start; the resulting
//! structs are immutable thereafter and passed by reference into the
//! components that need them.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default grace period granted to in-flight sessions during shutdown.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Errors produced while interpreting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The driver selector names no supported storage engine. Failing
    /// fast here is required: a silently unusable backend bundle is a
    /// defect, not a fallback.
    #[error("unknown database driver: {0}")]
    UnknownDriver(String),
}

/// Supported storage engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Embedded engine backed by a local file (or `:memory:`).
    Sqlite,
    /// Networked engine reached via host/port/credentials.
    Postgres,
}

impl Driver {
    /// Canonical selector string for this driver.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::UnknownDriver(other.to_string())),
        }
    }
}

/// Connection parameters for the selected storage engine.
///
/// Networked engines use host/port/credentials/database; the embedded
/// engine uses only `path`.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub driver: Driver,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Local file path for the embedded engine. `:memory:` selects an
    /// in-process database (used by tests).
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: Driver::Sqlite,
            host: "localhost".to_string(),
            port: 5432,
            user: "catalog".to_string(),
            password: String::new(),
            database: "catalog".to_string(),
            path: PathBuf::from("catalog.db"),
        }
    }
}

impl DatabaseConfig {
    /// Builds the connection URL for the configured driver.
    #[must_use]
    pub fn url(&self) -> String {
        match self.driver {
            Driver::Sqlite => {
                if self.path.as_os_str() == ":memory:" {
                    "sqlite::memory:".to_string()
                } else {
                    format!("sqlite://{}?mode=rwc", self.path.display())
                }
            }
            Driver::Postgres => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            ),
        }
    }

    /// Whether this configuration points at an in-process database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.driver == Driver::Sqlite && self.path.as_os_str() == ":memory:"
    }
}

/// Token-issuance parameters. Read once at process start; the signing
/// key and TTL are immutable thereafter.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC signing key material for bearer tokens.
    pub token_secret: String,
    /// Token time-to-live in seconds; expiry is issuance time plus this.
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: 300,
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    /// How long in-flight sessions may run after shutdown is triggered.
    pub drain_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }
}
