// server/src/main.rs

// Entry point for the Yideshare server. Parses the command line and
// dispatches to the CLI handlers.

use anyhow::Result;
use yideshare_server::cli::cli::start_cli;

#[tokio::main]
async fn main() -> Result<()> {
    start_cli().await
}
