//! Schema introspection tools.
//!
//! Tools: get_table_schema, list_tables

use serde_json::{Map, Value as JsonValue};
use sqlx::{MySqlConnection, Row};

use crate::convert::{get_string_arg, row_values};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::{self, McpSession};
use crate::tools::ToolDef;

/// Number of columns DESCRIBE reports per field.
const DESCRIBE_COLUMNS: usize = 6;

/// Get all schema tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "get_table_schema",
            "Get a table's column definitions. Returns one entry per column with \
             Field, Type, Null, Key, Default, and Extra attributes.",
            schema!(object {
                required: { "table_name": string }
            }),
        ),
        ToolDef::new(
            "list_tables",
            "List all tables in the configured database.",
            schema!(object {}),
        ),
    ]
}

/// Dispatch a schema tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "get_table_schema" => {
            let table_name = get_string_arg(&args, "table_name")?;

            let mut conn = session.connect().await?;
            let result = describe_table(&mut conn, &table_name).await;
            session::close(conn).await;

            Ok(serde_json::json!({ "schema": result? }))
        }

        "list_tables" => {
            let mut conn = session.connect().await?;
            let result = show_tables(&mut conn).await;
            session::close(conn).await;

            Ok(serde_json::json!({ "tables": result? }))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// `DESCRIBE <table>`, mapping the six positional result columns to named
/// attributes.
///
/// The six-column shape is validated per row before indexing; a server
/// returning a different shape yields an error instead of a panic. All six
/// DESCRIBE columns are textual, so each is decoded as an optional string
/// (Default is NULL for columns without one).
async fn describe_table(conn: &mut MySqlConnection, table_name: &str) -> Result<Vec<JsonValue>> {
    let statement = format!("DESCRIBE {}", table_name);
    let rows = sqlx::query(&statement)
        .fetch_all(conn)
        .await
        .map_err(McpError::from)?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        if row.columns().len() != DESCRIBE_COLUMNS {
            return Err(McpError::Internal(format!(
                "DESCRIBE returned {} columns, expected {}",
                row.columns().len(),
                DESCRIBE_COLUMNS
            )));
        }

        let mut entry = serde_json::Map::new();
        for (i, field) in ["Field", "Type", "Null", "Key", "Default", "Extra"]
            .iter()
            .enumerate()
        {
            let value: Option<String> = row.try_get(i).map_err(McpError::from)?;
            entry.insert(
                field.to_string(),
                value.map_or(JsonValue::Null, JsonValue::String),
            );
        }
        entries.push(JsonValue::Object(entry));
    }

    Ok(entries)
}

/// `SHOW TABLES`, first column of each row.
async fn show_tables(conn: &mut MySqlConnection) -> Result<Vec<JsonValue>> {
    let rows = sqlx::query("SHOW TABLES")
        .fetch_all(conn)
        .await
        .map_err(McpError::from)?;

    rows.iter()
        .map(|row| {
            row_values(row)?
                .into_iter()
                .next()
                .ok_or_else(|| McpError::Internal("SHOW TABLES returned an empty row".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MysqlConfig;
    use serde_json::json;

    fn unreachable_session() -> McpSession {
        McpSession::new(MysqlConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "root".to_string(),
            password: "123456".to_string(),
            database: "mcp".to_string(),
        })
    }

    fn to_args(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn get_table_schema_requires_table_name() {
        let session = unreachable_session();
        let err = dispatch(&session, "get_table_schema", to_args(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::MissingArg(_)));
    }

    #[tokio::test]
    async fn list_tables_unreachable_is_connection_error() {
        let session = unreachable_session();
        let err = dispatch(&session, "list_tables", to_args(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::Connection(_)));
    }
}
