//! Arbitrary SQL execution.
//!
//! Tools: execute_sql

use serde_json::{Map, Value as JsonValue};
use sqlx::MySqlConnection;

use crate::convert::{get_string_arg, row_to_json};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::{self, McpSession};
use crate::tools::ToolDef;

/// Get all query tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "execute_sql",
        "Execute an arbitrary SQL statement. SELECT statements return all rows; \
         anything else returns an execution status. The statement runs verbatim \
         with no authorization check: trusted callers only.",
        schema!(object {
            required: { "query": string }
        }),
    )]
}

/// Dispatch a query tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "execute_sql" => {
            let query = get_string_arg(&args, "query")?;

            let mut conn = session.connect().await?;
            let result = run_query(&mut conn, &query).await;
            session::close(conn).await;

            result
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Whether the statement is classified as a read.
///
/// Only a leading `select` (after trimming, case-insensitive) counts; CTEs
/// and other row-returning statements go down the write path.
fn is_select(query: &str) -> bool {
    query.trim().to_lowercase().starts_with("select")
}

/// Run the statement: fetch rows for reads, execute-and-report for writes.
async fn run_query(conn: &mut MySqlConnection, query: &str) -> Result<JsonValue> {
    if is_select(query) {
        let rows = sqlx::query(query)
            .fetch_all(conn)
            .await
            .map_err(McpError::from)?;
        let data: Result<Vec<JsonValue>> = rows.iter().map(row_to_json).collect();
        Ok(serde_json::json!({ "data": data? }))
    } else {
        sqlx::query(query)
            .execute(conn)
            .await
            .map_err(McpError::from)?;
        Ok(serde_json::json!({ "status": "Query executed successfully." }))
    }
}
