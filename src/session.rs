//! MCP session state.
//!
//! Holds the immutable connection configuration and opens one MySQL
//! connection per tool invocation. There is no pool: every call pays full
//! connection-setup cost and closes its connection before returning.

use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection};

use crate::config::MysqlConfig;
use crate::error::{McpError, Result};

/// MCP session state.
///
/// The only process-wide shared state is the read-only [`MysqlConfig`];
/// connections are never shared across calls and never outlive the call
/// that opened them.
pub struct McpSession {
    config: MysqlConfig,
}

impl McpSession {
    /// Create a session from connection configuration.
    pub fn new(config: MysqlConfig) -> Self {
        Self { config }
    }

    /// The connection configuration.
    pub fn config(&self) -> &MysqlConfig {
        &self.config
    }

    /// Open a fresh connection to the configured database.
    ///
    /// Any network, authentication, or database-unavailable condition is
    /// surfaced as [`McpError::Connection`]. No retry. The caller owns the
    /// connection and must close it on every exit path.
    pub async fn connect(&self) -> Result<MySqlConnection> {
        let options = MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.database);

        MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| McpError::Connection(e.to_string()))
    }
}

/// Close a connection, ignoring shutdown errors.
///
/// Used at the end of every tool invocation so the statement result (or
/// error) survives a failed close handshake.
pub async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!("connection close failed: {}", e);
    }
}
