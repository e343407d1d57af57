// server/src/cli/commands.rs

use std::path::PathBuf;

use clap::{Args, Subcommand};
use lib::{AppConfig, StorageEngineType};

/// Subcommands for the Yideshare CLI
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Close every open ride that has already ended, then exit
    CloseExpired,
}

/// Overrides applied on top of the loaded configuration.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ServeArgs {
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    #[arg(long, value_name = "ENGINE", value_parser = parse_engine)]
    pub engine: Option<StorageEngineType>,
}

fn parse_engine(value: &str) -> Result<StorageEngineType, String> {
    value.parse().map_err(|e: lib::StorageError| e.to_string())
}

impl ServeArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_directory = dir.clone();
        }
        if let Some(engine) = self.engine {
            config.storage.engine_type = engine;
        }
    }
}
