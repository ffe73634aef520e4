//! sheetbind API Server binary
//!
//! HTTP REST API exposing spreadsheet export and import.

use clap::Parser;
use sheetbind::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "sheetbind-server")]
#[command(version)]
#[command(about = "sheetbind API Server - JSON records to .xlsx and back over HTTP")]
#[command(long_about = r#"
sheetbind API Server

Endpoints:
  - POST /api/v1/export    - JSON array of objects to an .xlsx attachment
  - POST /api/v1/import    - .xlsx body to JSON rows keyed by header

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON error responses with request IDs

Example usage:
  sheetbind-server                           # Start on localhost:8080
  sheetbind-server --host 0.0.0.0 --port 3000

  curl -X POST "http://localhost:8080/api/v1/export?name=people" \
    -H "Content-Type: application/json" \
    -d '[{"Name":"Ann","Age":30},{"Name":"Bo","Age":41}]' -o people.xlsx
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBIND_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETBIND_PORT")]
    port: u16,

    /// Sheet used when a request does not name one
    #[arg(short, long, default_value = "Sheet1", env = "SHEETBIND_SHEET")]
    sheet: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        default_sheet: args.sheet,
        ..ApiConfig::default()
    };

    run_api_server(config).await
}
