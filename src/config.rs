//! Server configuration.
//!
//! Connection parameters live under a `[mysql]` section in a TOML file:
//!
//! ```toml
//! [mysql]
//! host = "127.0.0.1"
//! port = 3306
//! user = "root"
//! password = "secret"
//! database = "mcp"
//! ```
//!
//! The file path comes from `--config` or the `MYSQL_MCP_CONFIG` environment
//! variable. The configuration is loaded once at startup and never mutated.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{McpError, Result};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "MYSQL_MCP_CONFIG";

/// Top-level configuration file contents.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// MySQL connection settings.
    pub mysql: MysqlConfig,
}

/// MySQL connection parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MysqlConfig {
    /// Database server host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Database server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for authentication.
    pub user: String,

    /// Password for authentication.
    pub password: String,

    /// Database (schema) to select on connect.
    pub database: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3306
}

impl Config {
    /// Load configuration from an explicit path, or from the path named by
    /// `MYSQL_MCP_CONFIG` when none is given.
    ///
    /// Any failure (no path, unreadable file, malformed TOML, missing
    /// required field) is a [`McpError::Config`]; the caller is expected to
    /// treat it as fatal.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .map_err(|_| {
                    McpError::Config(format!(
                        "no config file: pass --config or set {}",
                        CONFIG_PATH_ENV
                    ))
                })?,
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            McpError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
            .map_err(|e| McpError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_full_config() {
        let config = Config::parse(
            r#"
            [mysql]
            host = "db.internal"
            port = 3307
            user = "agent"
            password = "hunter2"
            database = "inventory"
            "#,
        )
        .unwrap();

        assert_eq!(config.mysql.host, "db.internal");
        assert_eq!(config.mysql.port, 3307);
        assert_eq!(config.mysql.user, "agent");
        assert_eq!(config.mysql.password, "hunter2");
        assert_eq!(config.mysql.database, "inventory");
    }

    #[test]
    fn host_and_port_default() {
        let config = Config::parse(
            r#"
            [mysql]
            user = "root"
            password = "123456"
            database = "mcp"
            "#,
        )
        .unwrap();

        assert_eq!(config.mysql.host, "127.0.0.1");
        assert_eq!(config.mysql.port, 3306);
    }

    #[test]
    fn missing_required_field_fails() {
        let result = Config::parse(
            r#"
            [mysql]
            user = "root"
            password = "123456"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_section_fails() {
        assert!(Config::parse("").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[mysql]\nuser = \"root\"\npassword = \"pw\"\ndatabase = \"mcp\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.mysql.database, "mcp");
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = Config::load(Some(Path::new("/nonexistent/mysql-mcp.toml"))).unwrap_err();
        assert!(matches!(err, McpError::Config(_)));
    }
}
