//! # mysql-mcp
//!
//! MCP (Model Context Protocol) server for MySQL databases.
//!
//! This crate provides an MCP server that exposes MySQL operations as tools
//! for AI agents. It implements the MCP protocol over stdin/stdout using
//! JSON-RPC 2.0.
//!
//! ## Tools
//!
//! - `read_table` — all rows of a table
//! - `write_table` — insert one row with bound values
//! - `get_table_schema` — DESCRIBE output as named attributes
//! - `execute_sql` — arbitrary SQL (trusted callers only)
//! - `list_tables` — SHOW TABLES
//! - `test_connection` — connectivity and server version check
//!
//! Every tool opens its own connection and closes it before returning;
//! there is no pool and no state between calls.
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools
//! like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "mysql": {
//!       "command": "/path/to/mysql-mcp",
//!       "args": ["--config", "/path/to/config.toml"]
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, you can use the library API:
//!
//! ```no_run
//! use mysql_mcp::{Config, McpServer, McpSession};
//!
//! # async fn run() -> mysql_mcp::Result<()> {
//! let config = Config::load(Some(std::path::Path::new("config.toml")))?;
//! let session = McpSession::new(config.mysql);
//! let mut server = McpServer::new(session);
//!
//! // Run the server (reads from stdin, writes to stdout)
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod convert;
mod error;
mod server;
mod session;
mod tools;

pub use config::{Config, MysqlConfig, CONFIG_PATH_ENV};
pub use convert::{bind_value, row_to_json, row_values};
pub use error::{McpError, Result};
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::McpSession;
pub use tools::{ToolDef, ToolRegistry};
