//! Row-level table tools.
//!
//! Tools: read_table, write_table

use serde_json::{Map, Value as JsonValue};
use sqlx::MySqlConnection;

use crate::convert::{bind_value, get_object_arg, get_string_arg, row_to_json};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::{self, McpSession};
use crate::tools::ToolDef;

/// Get all table tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "read_table",
            "Read all rows from a table. Returns every row as a column-name to value \
             object. The full result set is fetched; there is no pagination.",
            schema!(object {
                required: { "table_name": string }
            }),
        ),
        ToolDef::new(
            "write_table",
            "Insert one row into a table. 'data' maps column names to scalar values; \
             values are bound as statement parameters.",
            schema!(object {
                required: { "table_name": string, "data": object }
            }),
        ),
    ]
}

/// Dispatch a table tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "read_table" => {
            let table_name = get_string_arg(&args, "table_name")?;

            let mut conn = session.connect().await?;
            let result = read_rows(&mut conn, &table_name).await;
            session::close(conn).await;

            Ok(serde_json::json!({ "data": result? }))
        }

        "write_table" => {
            let table_name = get_string_arg(&args, "table_name")?;
            let data = get_object_arg(&args, "data")?;

            // A zero-column INSERT is malformed; reject before reaching the
            // server.
            if data.is_empty() {
                return Err(McpError::InvalidArg {
                    name: "data".to_string(),
                    reason: "must contain at least one column".to_string(),
                });
            }

            let mut conn = session.connect().await?;
            let result = insert_row(&mut conn, &table_name, &data).await;
            session::close(conn).await;

            result?;
            Ok(JsonValue::String("Data inserted successfully.".to_string()))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// `SELECT * FROM <table>`, all rows marshalled to JSON objects.
///
/// The table name is interpolated verbatim (trusted caller); only row
/// values ever go through parameter binding.
async fn read_rows(conn: &mut MySqlConnection, table_name: &str) -> Result<Vec<JsonValue>> {
    let statement = format!("SELECT * FROM {}", table_name);
    let rows = sqlx::query(&statement)
        .fetch_all(conn)
        .await
        .map_err(McpError::from)?;

    rows.iter().map(row_to_json).collect()
}

/// `INSERT INTO <table> (<cols>) VALUES (?, ...)` with bound values.
async fn insert_row(
    conn: &mut MySqlConnection,
    table_name: &str,
    data: &Map<String, JsonValue>,
) -> Result<()> {
    let columns: Vec<&str> = data.keys().map(|k| k.as_str()).collect();
    let placeholders: Vec<&str> = std::iter::repeat("?").take(data.len()).collect();
    let statement = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table_name,
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut query = sqlx::query(&statement);
    for value in data.values() {
        query = bind_value(query, "data", value)?;
    }

    query.execute(conn).await.map_err(McpError::from)?;
    Ok(())
}
