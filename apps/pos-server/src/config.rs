//! # Server Configuration
//!
//! ## Loading Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Sources                                │
//! │                                                                         │
//! │  1. Defaults (this file)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. TOML file, first of:                                                │
//! │       --config <path> / SGVENTAS_CONFIG                                 │
//! │       <platform config dir>/sgventas.toml                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. SGVENTAS_* environment overrides                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [store]
//! name = "Abarrotes Don Pepe"
//! currency_symbol = "$"
//!
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [storage]
//! db_path = "/var/lib/sgventas/sgventas.db"
//! ledger_dir = "/var/lib/sgventas"
//!
//! [sales]
//! oversell_policy = "clamp"
//!
//! [sessions]
//! max_open = 16
//! idle_minutes = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sgventas_core::{Money, OversellPolicy};
use sgventas_db::DbConfig;
use thiserror::Error;
use tracing::{debug, info};

use crate::state::SessionLimits;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SGVENTAS_CONFIG";

const CONFIG_FILE_NAME: &str = "sgventas.toml";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidEnv { key: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Config Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub server: HttpConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sales: SalesConfig,

    #[serde(default)]
    pub sessions: SessionConfig,
}

/// Shop identity shown on screens and receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding products and sales.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory for `suppliers.json` and `expenses.json`.
    /// Defaults to the database's directory.
    #[serde(default)]
    pub ledger_dir: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesConfig {
    /// What checkout does when a line asks for more than is on hand.
    #[serde(default)]
    pub oversell_policy: OversellPolicy,
}

/// Checkout session bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Most sessions open at once.
    #[serde(default = "default_max_sessions")]
    pub max_open: usize,

    /// Minutes without a request before a session expires.
    #[serde(default = "default_idle_minutes")]
    pub idle_minutes: u64,
}

fn default_store_name() -> String {
    "SGVentas".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_db_path() -> PathBuf {
    default_data_dir().join("sgventas.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_max_sessions() -> usize {
    SessionLimits::default().max_open
}

fn default_idle_minutes() -> u64 {
    SessionLimits::default().idle_timeout.as_secs() / 60
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sgventas", "sgventas")
}

/// Platform data directory, or `./data` when none can be determined.
fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// `<platform config dir>/sgventas.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind: default_bind(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            db_path: default_db_path(),
            ledger_dir: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_open: default_max_sessions(),
            idle_minutes: default_idle_minutes(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            store: StoreConfig::default(),
            server: HttpConfig::default(),
            storage: StorageConfig::default(),
            sales: SalesConfig::default(),
            sessions: SessionConfig::default(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl ServerConfig {
    /// Loads configuration from file and process environment.
    ///
    /// `path` comes from the `--config` flag. Without it, `SGVENTAS_CONFIG`
    /// and then the platform config dir are tried. A missing default file is
    /// not an error; a missing explicit file is.
    pub fn load(path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    ServerConfig::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `SGVENTAS_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SGVENTAS_DB_PATH") {
            self.storage.db_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("SGVENTAS_LEDGER_DIR") {
            self.storage.ledger_dir = Some(PathBuf::from(dir));
        }
        if let Some(bind) = lookup("SGVENTAS_BIND") {
            self.server.bind = bind;
        }
        if let Some(name) = lookup("SGVENTAS_STORE_NAME") {
            self.store.name = name;
        }
        if let Some(policy) = lookup("SGVENTAS_OVERSELL_POLICY") {
            self.sales.oversell_policy =
                policy.parse().map_err(|e: sgventas_core::ValidationError| {
                    ConfigError::InvalidEnv {
                        key: "SGVENTAS_OVERSELL_POLICY".to_string(),
                        reason: e.to_string(),
                    }
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.bind '{}' is not a socket address",
                self.server.bind
            )));
        }
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.db_path must be set".into()));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_connections must be at least 1".into(),
            ));
        }
        if self.sessions.max_open == 0 {
            return Err(ConfigError::Invalid(
                "sessions.max_open must be at least 1".into(),
            ));
        }
        if self.sessions.idle_minutes == 0 {
            return Err(ConfigError::Invalid(
                "sessions.idle_minutes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Pool and ledger settings for [`sgventas_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        let config = DbConfig::new(&self.storage.db_path)
            .max_connections(self.storage.max_connections);
        match &self.storage.ledger_dir {
            Some(dir) => config.ledger_dir(dir),
            None => config,
        }
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_open: self.sessions.max_open,
            idle_timeout: Duration::from_secs(self.sessions.idle_minutes.saturating_mul(60)),
        }
    }

    /// Formats an amount with the store's currency symbol.
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.store.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sales.oversell_policy, OversellPolicy::Reject);
        assert!(config.storage.db_path.ends_with("sgventas.db"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            [store]
            name = "Abarrotes Don Pepe"

            [sales]
            oversell_policy = "clamp"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Abarrotes Don Pepe");
        assert_eq!(config.store.currency_symbol, "$");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.sales.oversell_policy, OversellPolicy::Clamp);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SGVENTAS_DB_PATH", "/tmp/pos.db"),
            ("SGVENTAS_LEDGER_DIR", "/tmp/ledger"),
            ("SGVENTAS_BIND", "0.0.0.0:9000"),
            ("SGVENTAS_OVERSELL_POLICY", "clamp"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/pos.db"));
        assert_eq!(config.storage.ledger_dir, Some(PathBuf::from("/tmp/ledger")));
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.sales.oversell_policy, OversellPolicy::Clamp);
    }

    #[test]
    fn test_bad_policy_env_is_rejected() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_env_overrides(|k| (k == "SGVENTAS_OVERSELL_POLICY").then(|| "maybe".into()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_bind() {
        let mut config = ServerConfig::default();
        config.server.bind = "localhost".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_session_limits_from_toml() {
        let config = ServerConfig::from_toml(
            r#"
            [sessions]
            max_open = 3
            idle_minutes = 15
            "#,
        )
        .unwrap();
        let limits = config.session_limits();
        assert_eq!(limits.max_open, 3);
        assert_eq!(limits.idle_timeout, Duration::from_secs(15 * 60));

        assert_eq!(ServerConfig::default().session_limits(), SessionLimits::default());

        let mut config = ServerConfig::default();
        config.sessions.max_open = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_format_currency() {
        let mut config = ServerConfig::default();
        config.store.currency_symbol = "S/".into();
        assert_eq!(config.format_currency(Money::from_cents(123_450)), "S/1,234.50");
    }
}
