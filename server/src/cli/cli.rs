// server/src/cli/cli.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lib::AppConfig;
use tracing::debug;

use super::commands::{Commands, ServeArgs};
use super::handlers::{handle_close_expired, handle_serve};
use super::logging::init_tracing;

// CLI entry point for Yideshare
#[derive(Parser, Debug)]
#[command(name = "yideshare")]
#[command(version)]
#[command(about = "Campus ride-sharing server")]
pub struct CliArgs {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long, global = true, value_name = "FILE", env = "YIDESHARE_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing();

    let config = AppConfig::load(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;
    debug!("Effective configuration: {:?}", config);

    match args.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(serve) => handle_serve(config, &serve).await,
        Commands::CloseExpired => handle_close_expired(config).await.map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::StorageEngineType;

    #[test]
    fn parses_serve_overrides() {
        let args = CliArgs::try_parse_from([
            "yideshare", "serve", "--port", "8080", "--engine", "inmemory", "--data-dir", "/tmp/rides",
        ])
        .unwrap();
        let Some(Commands::Serve(serve)) = args.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.port, Some(8080));
        assert_eq!(serve.engine, Some(StorageEngineType::InMemory));

        let mut config = AppConfig::default();
        serve.apply(&mut config);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.engine_type, StorageEngineType::InMemory);
        assert_eq!(config.storage.data_directory, PathBuf::from("/tmp/rides"));
        assert_eq!(config.server.host, AppConfig::default().server.host);
    }

    #[test]
    fn parses_global_config_and_close_expired() {
        let args =
            CliArgs::try_parse_from(["yideshare", "close-expired", "--config", "prod.toml"]).unwrap();
        assert_eq!(args.command, Some(Commands::CloseExpired));
        assert_eq!(args.config, Some(PathBuf::from("prod.toml")));
    }

    #[test]
    fn rejects_unknown_engine() {
        assert!(CliArgs::try_parse_from(["yideshare", "serve", "--engine", "rocks"]).is_err());
    }
}
