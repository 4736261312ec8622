use std::{sync::Arc, time::Duration};

use crate::{
    common::{AnyResult, HttpClient, now_ms},
    configs::Config,
    sources::{MediaResolver, SourceManager},
};

/// Top-level application state. Read-only once the server starts.
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<dyn MediaResolver>,
    /// Provider ids in try order, reported by `/info`.
    pub source_names: Vec<String>,
    /// Client used for proxied upstream requests.
    pub proxy_client: reqwest::Client,
    pub started_at: u64,
}

impl AppState {
    pub fn new(
        config: Config,
        resolver: Arc<dyn MediaResolver>,
        source_names: Vec<String>,
    ) -> AnyResult<Self> {
        let proxy_client =
            HttpClient::new_streaming(Duration::from_secs(config.proxy.connect_timeout_secs))?;

        Ok(Self {
            config,
            resolver,
            source_names,
            proxy_client,
            started_at: now_ms(),
        })
    }

    /// Builds the resolution engine from config. Called once at startup.
    pub fn from_config(config: Config) -> AnyResult<Self> {
        let manager = SourceManager::new(&config)?;
        let source_names = manager.provider_ids();
        Self::new(config, Arc::new(manager), source_names)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.config.resolver.timeout_secs)
    }
}
