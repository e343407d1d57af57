// rest_api/src/state.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use lib::{AppConfig, StorageEngine, create_storage};
use security::{CasClient, DirectoryClient, DirectoryLookup, TicketValidator, TokenIssuer};

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageEngine>,
    pub tokens: TokenIssuer,
    pub cas: Arc<dyn TicketValidator>,
    pub directory: Arc<dyn DirectoryLookup>,
    pub config: Arc<AppConfig>,
    pub tz: Tz,
}

impl AppState {
    /// Wires the configured storage engine and the live CAS and directory clients.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let storage = create_storage(&config.storage).with_context(|| {
            format!(
                "Failed to open {} storage at {}",
                config.storage.engine_type,
                config.storage.data_directory.display()
            )
        })?;
        let cas = CasClient::new(&config.auth.cas_url).context("Failed to build CAS client")?;
        let directory = DirectoryClient::new(
            &config.auth.directory_url,
            config.auth.directory_api_key.clone(),
        );
        Self::new(config, storage, Arc::new(cas), Arc::new(directory))
    }

    pub fn new(
        config: AppConfig,
        storage: Arc<dyn StorageEngine>,
        cas: Arc<dyn TicketValidator>,
        directory: Arc<dyn DirectoryLookup>,
    ) -> Result<Self> {
        let ttl = config.jwt_ttl().context("Invalid JWT lifetime")?;
        let tokens = TokenIssuer::new(&config.auth.jwt_secret, ttl).context("Invalid JWT settings")?;
        let tz = config.tz().context("Invalid timezone")?;
        Ok(AppState {
            storage,
            tokens,
            cas,
            directory,
            config: Arc::new(config),
            tz,
        })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }
}
