//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset keeps orders in memory
/// - `LEDGER_PATH`: CSV audit ledger file (default: `"bestellungen.csv"`)
/// - `STORE_TIMEOUT_SECS`: bound on connecting and on each order insert (default: `5`)
/// - `DB_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `SESSION_IDLE_SECS`: sessions unused this long are discarded (default: `43200`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub ledger_path: PathBuf,
    pub store_timeout: Duration,
    pub db_max_connections: u32,
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match std::env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            ledger_path: std::env::var("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
            store_timeout: parse_var("STORE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.store_timeout),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")
                .unwrap_or(defaults.db_max_connections),
            session_idle_timeout: parse_var::<u64>("SESSION_IDLE_SECS")
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_idle_timeout),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            ledger_path: PathBuf::from("bestellungen.csv"),
            store_timeout: Duration::from_secs(5),
            db_max_connections: 5,
            session_idle_timeout: Duration::from_secs(12 * 60 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const VARS: [&str; 9] = [
        "HOST",
        "PORT",
        "RUST_LOG",
        "LOG_FORMAT",
        "DATABASE_URL",
        "LEDGER_PATH",
        "STORE_TIMEOUT_SECS",
        "DB_MAX_CONNECTIONS",
        "SESSION_IDLE_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized.
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.database_url.is_none());
        assert_eq!(config.ledger_path, PathBuf::from("bestellungen.csv"));
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(43_200));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        // SAFETY: serialized with the other environment tests.
        unsafe {
            std::env::set_var("PORT", "8081");
            std::env::set_var("LOG_FORMAT", "json");
            std::env::set_var("DATABASE_URL", "postgres://pos@localhost/pos");
            std::env::set_var("LEDGER_PATH", "/var/lib/pos/bestellungen.csv");
            std::env::set_var("STORE_TIMEOUT_SECS", "2");
            std::env::set_var("SESSION_IDLE_SECS", "900");
        }

        let config = Config::from_env();
        assert_eq!(config.port, 8081);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://pos@localhost/pos")
        );
        assert_eq!(
            config.ledger_path,
            PathBuf::from("/var/lib/pos/bestellungen.csv")
        );
        assert_eq!(config.store_timeout, Duration::from_secs(2));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(900));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        clear_env();
        // SAFETY: serialized with the other environment tests.
        unsafe {
            std::env::set_var("PORT", "not-a-port");
            std::env::set_var("DATABASE_URL", "  ");
            std::env::set_var("SESSION_IDLE_SECS", "0");
        }

        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert_eq!(config.session_idle_timeout, Duration::from_secs(43_200));

        clear_env();
    }
}
