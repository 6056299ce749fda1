//! Database-level tools.
//!
//! Tools: test_connection

use serde_json::{Map, Value as JsonValue};
use sqlx::{MySqlConnection, Row};

use crate::error::{McpError, Result};
use crate::schema;
use crate::session::{self, McpSession};
use crate::tools::ToolDef;

/// Get all database tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "test_connection",
        "Test the database connection. Reports the server version and selected \
         database on success, or a structured failure with the error text.",
        schema!(object {}),
    )]
}

/// Dispatch a database tool call.
///
/// Unlike the other tools, test_connection folds every failure into its
/// own result shape; it never returns an error past this boundary.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    _args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "test_connection" => Ok(test_connection(session).await),
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Connect, read server version and selected database, close.
async fn test_connection(session: &McpSession) -> JsonValue {
    let mut conn = match session.connect().await {
        Ok(conn) => conn,
        Err(e) => return failed(&e.to_string()),
    };

    let result = server_info(&mut conn).await;
    session::close(conn).await;

    match result {
        Ok((server_version, database)) => serde_json::json!({
            "status": "Connected",
            "server_version": server_version,
            "database": database,
        }),
        Err(e) => failed(&e.to_string()),
    }
}

/// `SELECT VERSION()` and `SELECT DATABASE()`.
async fn server_info(conn: &mut MySqlConnection) -> Result<(String, JsonValue)> {
    let row = sqlx::query("SELECT VERSION()")
        .fetch_one(&mut *conn)
        .await
        .map_err(McpError::from)?;
    let server_version: String = row.try_get(0).map_err(McpError::from)?;

    let row = sqlx::query("SELECT DATABASE()")
        .fetch_one(conn)
        .await
        .map_err(McpError::from)?;
    let database: Option<String> = row.try_get(0).map_err(McpError::from)?;

    Ok((
        server_version,
        database.map_or(JsonValue::Null, JsonValue::String),
    ))
}

fn failed(error: &str) -> JsonValue {
    serde_json::json!({
        "status": "Failed",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MysqlConfig;

    #[tokio::test]
    async fn unreachable_host_reports_failed_status() {
        let session = McpSession::new(MysqlConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "root".to_string(),
            password: "123456".to_string(),
            database: "mcp".to_string(),
        });

        let result = dispatch(&session, "test_connection", Map::new())
            .await
            .expect("test_connection must not error");

        assert_eq!(result.get("status").and_then(|v| v.as_str()), Some("Failed"));
        let error = result.get("error").and_then(|v| v.as_str()).unwrap();
        assert!(!error.is_empty());
    }
}
