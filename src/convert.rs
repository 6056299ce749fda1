//! Conversion between MySQL rows and JSON.
//!
//! Provides row-to-JSON marshalling for tool results, JSON-to-bind-parameter
//! conversion for the write path, and argument extraction helpers.

use serde_json::{Map, Value as JsonValue};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row, TypeInfo};

use crate::error::{McpError, Result};

/// Convert a row to an ordered column-name → value JSON object.
pub fn row_to_json(row: &MySqlRow) -> Result<JsonValue> {
    let mut object = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_to_json(row, i)?);
    }
    Ok(JsonValue::Object(object))
}

/// Convert a row to its values in column order.
///
/// Used where the statement defines the column positions (DESCRIBE, SHOW
/// TABLES) rather than the caller caring about names.
pub fn row_values(row: &MySqlRow) -> Result<Vec<JsonValue>> {
    (0..row.columns().len())
        .map(|i| column_to_json(row, i))
        .collect()
}

/// Decode a single column to a tagged JSON scalar.
///
/// Decoding is directed by the column's MySQL type name. Temporal and
/// decimal values come back as strings; binary payloads are summarized
/// rather than inlined.
fn column_to_json(row: &MySqlRow, index: usize) -> Result<JsonValue> {
    let column = &row.columns()[index];
    let type_name = column.type_info().name();

    let value = match type_name {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)?
            .map_or(JsonValue::Null, JsonValue::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)?
            .map_or(JsonValue::Null, |v| serde_json::json!(v)),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row
            .try_get::<Option<u64>, _>(index)?
            .map_or(JsonValue::Null, |v| serde_json::json!(v)),
        "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)?
            .map_or(JsonValue::Null, |v| serde_json::json!(v)),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .map_or(JsonValue::Null, |b| {
                JsonValue::String(format!("<blob {} bytes>", b.len()))
            }),
        "JSON" => row
            .try_get::<Option<JsonValue>, _>(index)?
            .unwrap_or(JsonValue::Null),
        // VARCHAR/CHAR/TEXT plus everything that reads cleanly as text:
        // DECIMAL, DATE, TIME, DATETIME, TIMESTAMP, YEAR, ENUM, SET.
        _ => row
            .try_get::<Option<String>, _>(index)?
            .map_or(JsonValue::Null, JsonValue::String),
    };

    Ok(value)
}

/// Bind a JSON scalar as the next positional query parameter.
///
/// Only scalars are bindable row values; arrays and objects are rejected.
pub fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    name: &str,
    value: &JsonValue,
) -> Result<Query<'q, MySql, MySqlArguments>> {
    match value {
        JsonValue::Null => Ok(query.bind(None::<String>)),
        JsonValue::Bool(b) => Ok(query.bind(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(query.bind(i))
            } else if let Some(f) = n.as_f64() {
                Ok(query.bind(f))
            } else {
                Err(McpError::InvalidArg {
                    name: name.to_string(),
                    reason: "number out of range".to_string(),
                })
            }
        }
        JsonValue::String(s) => Ok(query.bind(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "row values must be scalars, not arrays or objects".to_string(),
        }),
    }
}

/// Helper to get a required string argument from JSON arguments.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| McpError::MissingArg(name.to_string()))
}

/// Helper to get a required object argument from JSON arguments.
pub fn get_object_arg(
    args: &Map<String, JsonValue>,
    name: &str,
) -> Result<Map<String, JsonValue>> {
    match args.get(name) {
        Some(JsonValue::Object(map)) => Ok(map.clone()),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "expected an object".to_string(),
        }),
        None => Err(McpError::MissingArg(name.to_string())),
    }
}
