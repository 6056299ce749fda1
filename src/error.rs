//! Error types for the MCP server.
//!
//! Classifies sqlx errors into connection vs statement faults and maps
//! everything to JSON-RPC error codes.

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum McpError {
    /// Configuration missing or invalid at startup. Fatal.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database unreachable or authentication failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// SQL statement rejected or failed by the database.
    #[error("statement error: {0}")]
    Statement(String),

    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for McpError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Faults reported by the server about the statement itself.
            sqlx::Error::Database(db) => McpError::Statement(db.to_string()),
            sqlx::Error::RowNotFound => McpError::Statement("no rows returned".to_string()),
            sqlx::Error::TypeNotFound { type_name } => {
                McpError::Statement(format!("unknown type: {}", type_name))
            }
            sqlx::Error::ColumnNotFound(col) => {
                McpError::Statement(format!("column not found: {}", col))
            }

            // Transport-level failures: socket, TLS, handshake, bad options.
            sqlx::Error::Io(e) => McpError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => McpError::Connection(e.to_string()),
            sqlx::Error::Protocol(msg) => McpError::Connection(msg),
            sqlx::Error::Configuration(e) => McpError::Connection(e.to_string()),
            sqlx::Error::PoolTimedOut => McpError::Connection("connection timed out".to_string()),
            sqlx::Error::PoolClosed => McpError::Connection("connection closed".to_string()),

            other => McpError::Internal(other.to_string()),
        }
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Whether this is a database-side fault (connection or statement).
    ///
    /// Database faults are reported to the caller as an in-band
    /// `{"error": ...}` tool result rather than a JSON-RPC error; every
    /// other variant is caller or server misuse and maps to a protocol
    /// error via [`McpError::rpc_code`].
    pub fn is_database(&self) -> bool {
        matches!(self, McpError::Connection(_) | McpError::Statement(_))
    }

    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;
