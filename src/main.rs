//! MCP server for MySQL databases.
//!
//! Run with `mysql-mcp --config /path/to/config.toml`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod convert;
mod error;
mod server;
mod session;
mod tools;

use config::Config;
use server::McpServer;
use session::McpSession;

/// MCP server for MySQL databases.
///
/// Exposes MySQL operations as MCP tools for AI agents.
/// Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "mysql-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    /// Falls back to the MYSQL_MCP_CONFIG environment variable.
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("mysql_mcp=debug".parse().unwrap()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration; partial or missing configuration is fatal.
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        host = config.mysql.host.as_str(),
        port = config.mysql.port,
        database = config.mysql.database.as_str(),
        "configuration loaded"
    );

    // Create session and server
    let session = McpSession::new(config.mysql);
    let mut server = McpServer::new(session);

    // Run the server
    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
